//! Level image decoding.
//!
//! Levels are authored as small PNGs where each pixel is one tile. Decoding
//! happens once, before the frame loop starts; a failure here aborts startup.

use std::path::Path;

use image::RgbaImage;

use crate::LevelError;

/// Decode an in-memory level image into RGBA8 pixels.
pub fn decode_level(bytes: &[u8]) -> Result<RgbaImage, LevelError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        "level image decoded"
    );
    Ok(image)
}

/// Read and decode a level image from disk.
pub fn load_level(path: impl AsRef<Path>) -> Result<RgbaImage, LevelError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LevelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode_level(&bytes)
}
