use crate::foundation::error::{CapsuleError, CapsuleResult};

/// One of the three color channels stored in a [`PixelGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red, byte offset 0.
    Red,
    /// Green, byte offset 1.
    Green,
    /// Blue, byte offset 2.
    Blue,
}

impl Channel {
    /// All channels in storage order.
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Byte offset of this channel inside an RGB triple.
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// Row-major RGB8 pixel grid.
///
/// Pixel `(x, y)` lives at byte offset `(y * width + x) * 3`. A grid with zero
/// width or height is "empty"; decoded snapshots are never empty, but an
/// alignment of incompatible inputs can produce one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Bytes per pixel.
    pub const CHANNELS: usize = 3;

    /// Wrap raw RGB8 bytes, checking the buffer length against the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> CapsuleResult<Self> {
        let expected = byte_len(width, height)
            .ok_or_else(|| CapsuleError::validation("pixel grid size overflow"))?;
        if data.len() != expected {
            return Err(CapsuleError::validation(format!(
                "pixel grid {width}x{height} expects {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A grid where every pixel has the same color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let n = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: rgb.repeat(n),
        }
    }

    /// The zero-area grid.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True when the grid has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw row-major RGB8 bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consume the grid and return its bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// RGB triple at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Overwrite the RGB triple at `(x, y)`.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Single channel value at `(x, y)`.
    pub fn channel_at(&self, x: u32, y: u32, channel: Channel) -> u8 {
        self.data[self.offset(x, y) + channel.index()]
    }

    pub(crate) fn set_channel_at(&mut self, x: u32, y: u32, channel: Channel, v: u8) {
        let i = self.offset(x, y) + channel.index();
        self.data[i] = v;
    }

    /// Copy one channel out as a row-major plane of `width * height` bytes.
    pub fn channel_plane(&self, channel: Channel) -> Vec<u8> {
        self.data
            .chunks_exact(Self::CHANNELS)
            .map(|px| px[channel.index()])
            .collect()
    }

    /// Copy the `w x h` window whose top-left corner is `(left, top)`.
    ///
    /// Panics if the window does not fit inside the grid.
    pub fn crop(&self, left: u32, top: u32, w: u32, h: u32) -> PixelGrid {
        assert!(
            left as u64 + w as u64 <= self.width as u64
                && top as u64 + h as u64 <= self.height as u64,
            "crop window {w}x{h}+{left}+{top} exceeds grid {}x{}",
            self.width,
            self.height
        );
        if w == 0 || h == 0 {
            return PixelGrid {
                width: w,
                height: h,
                data: Vec::new(),
            };
        }

        let row_bytes = w as usize * Self::CHANNELS;
        let mut data = Vec::with_capacity(row_bytes * h as usize);
        for y in top..top + h {
            let start = self.offset(left, y);
            data.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        PixelGrid {
            width: w,
            height: h,
            data,
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        ((y as usize) * (self.width as usize) + x as usize) * Self::CHANNELS
    }
}

fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(PixelGrid::CHANNELS))
}

/// Per-pixel boolean map of where two aligned grids differ.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl ChangeMask {
    pub(crate) fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Self {
        debug_assert_eq!(bits.len(), (width as usize) * (height as usize));
        Self {
            width,
            height,
            bits,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether `(x, y)` was marked as changed.
    pub fn is_changed(&self, x: u32, y: u32) -> bool {
        self.bits[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Row-major flags.
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Number of changed pixels.
    pub fn changed_count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Fraction of pixels marked as changed, `0.0` for an empty mask.
    pub fn changed_ratio(&self) -> f64 {
        if self.bits.is_empty() {
            return 0.0;
        }
        self.changed_count() as f64 / self.bits.len() as f64
    }

    /// Grayscale rendition: 255 where changed, 0 elsewhere.
    pub fn to_luma8(&self) -> Vec<u8> {
        self.bits
            .iter()
            .map(|&b| if b { 255 } else { 0 })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/grid.rs"]
mod tests;
