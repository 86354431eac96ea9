use crate::foundation::grid::{Channel, PixelGrid};

/// Integer translation in pixels. Positive `dx` moves content right, positive
/// `dy` moves it down.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ShiftVector {
    /// Horizontal offset.
    pub dx: i32,
    /// Vertical offset.
    pub dy: i32,
}

impl ShiftVector {
    /// Build a shift vector.
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Source coordinate that lands on `dst` after shifting by `delta`, clamped to
/// `0..len`. `len` must be non-zero.
#[inline]
pub(crate) fn clamped_source(dst: u32, delta: i32, len: u32) -> u32 {
    let src = i64::from(dst) - i64::from(delta);
    src.clamp(0, i64::from(len) - 1) as u32
}

/// Translate a row-major `width x height` plane without wraparound.
///
/// Pixels pushed past the border are dropped and vacated rows/columns repeat
/// the nearest edge row/column.
pub fn shift_plane(plane: &[u8], width: u32, height: u32, shift: ShiftVector) -> Vec<u8> {
    assert_eq!(
        plane.len(),
        (width as usize) * (height as usize),
        "shift_plane expects a width*height plane"
    );
    if plane.is_empty() {
        return Vec::new();
    }

    let w = width as usize;
    let mut out = Vec::with_capacity(plane.len());
    for y in 0..height {
        let sy = clamped_source(y, shift.dy, height) as usize;
        let row = &plane[sy * w..(sy + 1) * w];
        for x in 0..width {
            out.push(row[clamped_source(x, shift.dx, width) as usize]);
        }
    }
    out
}

/// Sample `channel` of `grid` at `(x, y)` as if the grid had been shifted by `shift`.
#[inline]
pub(crate) fn sample_shifted(
    grid: &PixelGrid,
    channel: Channel,
    x: u32,
    y: u32,
    shift: ShiftVector,
) -> u8 {
    let sx = clamped_source(x, shift.dx, grid.width());
    let sy = clamped_source(y, shift.dy, grid.height());
    grid.channel_at(sx, sy, channel)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/shift.rs"]
mod tests;
