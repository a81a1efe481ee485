//! pixelhop level -- geometry primitives and the static tile grid.
//!
//! This crate holds everything the simulation reads but never mutates: the
//! axis-aligned [`Rect`](geometry::Rect), the strict-inequality intersection
//! test, and the [`TileGrid`](grid::TileGrid) built once from a level image.
//!
//! # Quick Start
//!
//! ```
//! use pixelhop_level::prelude::*;
//!
//! // 2x1 level: one opaque pixel, one transparent pixel.
//! let pixels = [0, 200, 0, 255, 0, 0, 0, 0];
//! let grid = TileGrid::from_rgba(2, 1, &pixels, TileSize::default()).unwrap();
//!
//! let tile = grid.get(0, 0).unwrap();
//! assert_eq!(tile.collider, Rect::new(0.0, 0.0, 16.0, 16.0));
//! assert!(grid.get(1, 0).is_none());
//!
//! // Edge contact is not an intersection.
//! let probe = Rect::new(16.0, 0.0, 4.0, 4.0);
//! assert!(!intersects(&probe, &tile.collider));
//! ```

#![deny(unsafe_code)]

pub mod geometry;
pub mod grid;
pub mod level;
pub mod tile;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while building a tile grid from level data.
///
/// All of these are load-time failures. A grid is either built completely or
/// not at all; the physics step never sees a partial grid.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// The level file could not be read.
    #[error("failed to read level image '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The level bytes are not a decodable image.
    #[error("failed to decode level image: {0}")]
    Decode(#[from] image::ImageError),

    /// The raw pixel buffer does not match the declared dimensions.
    #[error("pixel buffer for a {width}x{height} level must hold {expected} bytes, got {actual}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// One of the tile dimensions is zero.
    #[error("tile size must be non-zero, got {width}x{height}")]
    ZeroTileSize { width: u32, height: u32 },

    /// The level image has no pixels.
    #[error("level image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::geometry::{intersects, Rect, RectError};
    pub use crate::grid::{CellIndex, TileGrid};
    pub use crate::level::{decode_level, load_level};
    pub use crate::tile::{Rgba, Tile, TileSize};
    pub use crate::LevelError;
}
