use crate::foundation::grid::{ChangeMask, PixelGrid};

/// Default per-channel difference threshold.
pub const DEFAULT_THRESHOLD: u8 = 15;

/// Largest absolute per-channel difference between two RGB triples.
pub fn max_channel_delta(a: [u8; 3], b: [u8; 3]) -> u8 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (i16::from(x) - i16::from(y)).unsigned_abs() as u8)
        .max()
        .unwrap_or(0)
}

/// Mark every pixel whose max channel delta is strictly greater than `threshold`.
///
/// Both grids must already be aligned to the same dimensions; anything else is
/// a caller bug and panics.
pub fn change_mask(a: &PixelGrid, b: &PixelGrid, threshold: u8) -> ChangeMask {
    assert_eq!(
        a.dimensions(),
        b.dimensions(),
        "change_mask expects aligned grids of equal dimensions"
    );
    let bits = a
        .as_raw()
        .chunks_exact(PixelGrid::CHANNELS)
        .zip(b.as_raw().chunks_exact(PixelGrid::CHANNELS))
        .map(|(pa, pb)| {
            max_channel_delta([pa[0], pa[1], pa[2]], [pb[0], pb[1], pb[2]]) > threshold
        })
        .collect();
    ChangeMask::from_bits(a.width(), a.height(), bits)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/diff.rs"]
mod tests;
