//! The player sprite sheet.
//!
//! The sheet is a row of 32x32 frames; the frame facing right starts at
//! x = 0 and the one facing left at x = 64. Instead of a textured pipeline
//! the extractor turns the current frame into one quad per run of
//! same-colored pixels, which the flat-color renderer draws like any other
//! quad.

use std::path::Path;

use pixelhop_level::tile::Rgba;
use pixelhop_level::LevelError;

use super::extract::{SPRITE_FRAME_LEFT, SPRITE_SIZE};

/// Errors produced while loading a sprite sheet.
#[derive(Debug, thiserror::Error)]
pub enum SpriteSheetError {
    #[error(transparent)]
    Image(#[from] LevelError),

    #[error("pixel buffer for a {width}x{height} sheet must hold {expected} bytes, got {actual}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("sprite sheet is {width}x{height} but must be at least {min_width}x{min_height}")]
    TooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },
}

/// A horizontal run of identical opaque pixels within one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRun {
    /// Offset from the frame's top-left corner, px.
    pub x: u32,
    pub y: u32,
    pub len: u32,
    pub color: Rgba,
}

/// Decoded RGBA8 sprite sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl SpriteSheet {
    /// Smallest sheet that holds both facing frames.
    pub const MIN_WIDTH: u32 = SPRITE_FRAME_LEFT + SPRITE_SIZE as u32;
    pub const MIN_HEIGHT: u32 = SPRITE_SIZE as u32;

    /// Build a sheet from raw row-major RGBA8 pixels.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SpriteSheetError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(SpriteSheetError::BufferSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        if width < Self::MIN_WIDTH || height < Self::MIN_HEIGHT {
            return Err(SpriteSheetError::TooSmall {
                width,
                height,
                min_width: Self::MIN_WIDTH,
                min_height: Self::MIN_HEIGHT,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Read and decode a sprite sheet image from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SpriteSheetError> {
        let image = pixelhop_level::level::load_level(path)?;
        let (width, height) = image.dimensions();
        let sheet = Self::from_rgba(width, height, image.into_raw())?;
        tracing::debug!(width, height, "sprite sheet loaded");
        Ok(sheet)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Rgba([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Opaque pixel runs of the frame whose top-left is `(frame_x, 0)`, row
    /// by row. Fully transparent pixels are skipped.
    pub fn frame_runs(&self, frame_x: u32) -> Vec<PixelRun> {
        let size = SPRITE_SIZE as u32;
        let mut runs = Vec::new();
        for y in 0..size {
            let mut current: Option<PixelRun> = None;
            for x in 0..size {
                let color = self.pixel(frame_x + x, y);
                match current.as_mut() {
                    Some(run) if run.color == color => run.len += 1,
                    _ => {
                        runs.extend(current.take());
                        if color.0[3] > 0 {
                            current = Some(PixelRun { x, y, len: 1, color });
                        }
                    }
                }
            }
            runs.extend(current);
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::extract::SPRITE_FRAME_RIGHT;

    fn blank() -> Vec<u8> {
        vec![0u8; (SpriteSheet::MIN_WIDTH * SpriteSheet::MIN_HEIGHT * 4) as usize]
    }

    fn paint(px: &mut [u8], x: u32, y: u32, color: [u8; 4]) {
        let i = ((y * SpriteSheet::MIN_WIDTH + x) * 4) as usize;
        px[i..i + 4].copy_from_slice(&color);
    }

    #[test]
    fn runs_merge_same_colored_neighbours() {
        let mut px = blank();
        for x in 3..7 {
            paint(&mut px, x, 0, [255, 0, 0, 255]);
        }
        paint(&mut px, 7, 0, [0, 255, 0, 255]);
        paint(&mut px, 31, 5, [0, 0, 255, 128]);
        let sheet = SpriteSheet::from_rgba(SpriteSheet::MIN_WIDTH, SpriteSheet::MIN_HEIGHT, px).unwrap();

        let runs = sheet.frame_runs(SPRITE_FRAME_RIGHT);
        assert_eq!(
            runs,
            vec![
                PixelRun { x: 3, y: 0, len: 4, color: Rgba([255, 0, 0, 255]) },
                PixelRun { x: 7, y: 0, len: 1, color: Rgba([0, 255, 0, 255]) },
                PixelRun { x: 31, y: 5, len: 1, color: Rgba([0, 0, 255, 128]) },
            ]
        );
    }

    #[test]
    fn frames_read_their_own_columns() {
        let mut px = blank();
        paint(&mut px, SPRITE_FRAME_LEFT + 2, 9, [9, 9, 9, 255]);
        let sheet = SpriteSheet::from_rgba(SpriteSheet::MIN_WIDTH, SpriteSheet::MIN_HEIGHT, px).unwrap();
        assert!(sheet.frame_runs(SPRITE_FRAME_RIGHT).is_empty());
        assert_eq!(
            sheet.frame_runs(SPRITE_FRAME_LEFT),
            vec![PixelRun { x: 2, y: 9, len: 1, color: Rgba([9, 9, 9, 255]) }]
        );
    }

    #[test]
    fn undersized_sheet_is_rejected() {
        let err = SpriteSheet::from_rgba(64, 32, vec![0; 64 * 32 * 4]).unwrap_err();
        assert!(matches!(err, SpriteSheetError::TooSmall { min_width: 96, .. }));
        let err = SpriteSheet::from_rgba(96, 32, vec![0; 7]).unwrap_err();
        assert!(matches!(err, SpriteSheetError::BufferSize { expected: 12288, .. }));
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let err = SpriteSheet::load("/definitely/not/here/megaman.png").unwrap_err();
        assert!(matches!(err, SpriteSheetError::Image(LevelError::Io { .. })));
    }
}
