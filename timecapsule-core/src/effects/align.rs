use crate::foundation::grid::PixelGrid;

/// Offset and size of a centered crop window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropWindow {
    /// Left edge in source pixels.
    pub left: u32,
    /// Top edge in source pixels.
    pub top: u32,
    /// Window width.
    pub width: u32,
    /// Window height.
    pub height: u32,
}

/// Centered `w x h` window inside a `src_w x src_h` grid.
///
/// `w` and `h` must not exceed the source dimensions.
pub fn centered_window(src_w: u32, src_h: u32, w: u32, h: u32) -> CropWindow {
    debug_assert!(w <= src_w && h <= src_h);
    CropWindow {
        left: (src_w - w) / 2,
        top: (src_h - h) / 2,
        width: w,
        height: h,
    }
}

/// Crop both grids to the centered region of their common size.
///
/// The common size is `min(widths) x min(heights)`. No resampling happens;
/// aspect-ratio mismatches are left as they are. When either input has zero
/// area the result is a pair of empty grids, which callers treat as a no-op.
pub fn align(a: &PixelGrid, b: &PixelGrid) -> (PixelGrid, PixelGrid) {
    let w = a.width().min(b.width());
    let h = a.height().min(b.height());
    if w == 0 || h == 0 {
        return (PixelGrid::empty(), PixelGrid::empty());
    }
    (crop_centered(a, w, h), crop_centered(b, w, h))
}

fn crop_centered(g: &PixelGrid, w: u32, h: u32) -> PixelGrid {
    if g.dimensions() == (w, h) {
        return g.clone();
    }
    let win = centered_window(g.width(), g.height(), w, h);
    g.crop(win.left, win.top, win.width, win.height)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/align.rs"]
mod tests;
