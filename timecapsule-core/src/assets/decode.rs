use std::path::Path;

use crate::foundation::{
    error::{CapsuleError, CapsuleResult},
    grid::PixelGrid,
};

/// Read an image file and normalize it to an RGB8 [`PixelGrid`].
///
/// Alpha and color-profile metadata are discarded. Missing files, unreadable
/// files and unsupported formats all surface as [`CapsuleError::Decode`].
pub fn load_grid(path: impl AsRef<Path>) -> CapsuleResult<PixelGrid> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| CapsuleError::decode(path, e))?;
    decode_rgb8(&bytes).map_err(|reason| CapsuleError::decode(path, reason))
}

/// Decode encoded image bytes into an RGB8 [`PixelGrid`].
pub fn decode_grid(bytes: &[u8]) -> CapsuleResult<PixelGrid> {
    decode_rgb8(bytes).map_err(|reason| CapsuleError::decode("<memory>", reason))
}

fn decode_rgb8(bytes: &[u8]) -> Result<PixelGrid, String> {
    let dyn_img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let rgb = dyn_img.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(format!("image has zero area ({width}x{height})"));
    }
    PixelGrid::from_raw(width, height, rgb.into_raw()).map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
