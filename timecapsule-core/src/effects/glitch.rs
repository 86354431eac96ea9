use crate::{
    effects::shift::{ShiftVector, sample_shifted},
    foundation::grid::{Channel, ChangeMask, PixelGrid},
};

/// Shift applied to one channel of the earlier and the later snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ChannelShift {
    /// Shift applied to the earlier snapshot.
    pub earlier: ShiftVector,
    /// Shift applied to the later snapshot.
    pub later: ShiftVector,
}

/// Per-channel shift vectors used to build the glitch composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GlitchRecipe {
    /// Red channel shifts.
    pub red: ChannelShift,
    /// Green channel shifts.
    pub green: ChannelShift,
    /// Blue channel shifts.
    pub blue: ChannelShift,
}

impl Default for GlitchRecipe {
    fn default() -> Self {
        Self {
            red: ChannelShift {
                earlier: ShiftVector::new(-10, 0),
                later: ShiftVector::new(10, 0),
            },
            green: ChannelShift {
                earlier: ShiftVector::new(0, 10),
                later: ShiftVector::new(0, 10),
            },
            blue: ChannelShift {
                earlier: ShiftVector::new(10, 0),
                later: ShiftVector::new(10, 0),
            },
        }
    }
}

impl GlitchRecipe {
    /// Shifts for `channel`.
    pub fn for_channel(&self, channel: Channel) -> ChannelShift {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
        }
    }
}

/// Build the glitch composite of two aligned snapshots.
///
/// The output starts as a copy of `later`. For every pixel set in `mask`, each
/// channel becomes the floored mean of the earlier and later snapshots sampled
/// through that channel's edge-clamped shift. Unmasked pixels keep `later`
/// byte for byte.
///
/// All three inputs must share the same dimensions; anything else panics.
pub fn synthesize_glitch(
    earlier: &PixelGrid,
    later: &PixelGrid,
    mask: &ChangeMask,
    recipe: &GlitchRecipe,
) -> PixelGrid {
    assert!(
        earlier.dimensions() == later.dimensions() && later.dimensions() == mask.dimensions(),
        "synthesize_glitch expects grids and mask of equal dimensions"
    );

    let mut out = later.clone();
    let width = mask.width();
    for (i, _) in mask.as_slice().iter().enumerate().filter(|(_, m)| **m) {
        let x = (i % width as usize) as u32;
        let y = (i / width as usize) as u32;
        for channel in Channel::ALL {
            let shift = recipe.for_channel(channel);
            let a = sample_shifted(earlier, channel, x, y, shift.earlier);
            let b = sample_shifted(later, channel, x, y, shift.later);
            out.set_channel_at(x, y, channel, mean_floor(a, b));
        }
    }
    out
}

fn mean_floor(a: u8, b: u8) -> u8 {
    ((u16::from(a) + u16::from(b)) / 2) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/glitch.rs"]
mod tests;
