use std::path::Path;

use anyhow::Context as _;

use crate::foundation::{
    error::{CapsuleError, CapsuleResult},
    grid::{ChangeMask, PixelGrid},
};

/// Write a change mask as an 8-bit grayscale PNG (255 = changed, 0 = unchanged).
pub fn write_mask_png(mask: &ChangeMask, path: impl AsRef<Path>) -> CapsuleResult<()> {
    let path = path.as_ref();
    image::save_buffer_with_format(
        path,
        &mask.to_luma8(),
        mask.width(),
        mask.height(),
        image::ColorType::L8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write mask png '{}'", path.display()))?;
    Ok(())
}

/// Write a pixel grid as an RGB8 PNG.
pub fn write_grid_png(grid: &PixelGrid, path: impl AsRef<Path>) -> CapsuleResult<()> {
    let path = path.as_ref();
    if grid.is_empty() {
        return Err(CapsuleError::validation(format!(
            "refusing to write empty grid to '{}'",
            path.display()
        )));
    }
    image::save_buffer_with_format(
        path,
        grid.as_raw(),
        grid.width(),
        grid.height(),
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/encode.rs"]
mod tests;
