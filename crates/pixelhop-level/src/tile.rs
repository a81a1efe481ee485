//! Static tiles and their source-pixel colors.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

// ---------------------------------------------------------------------------
// TileSize
// ---------------------------------------------------------------------------

/// World-pixel size of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are non-zero.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl Default for TileSize {
    /// 16x16, one NES-style metatile.
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
        }
    }
}

// ---------------------------------------------------------------------------
// Rgba
// ---------------------------------------------------------------------------

/// A level pixel color, straight from the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }

    /// Alpha normalized to `[0, 1]`.
    pub fn alpha(&self) -> f64 {
        f64::from(self.0[3]) / 255.0
    }

    /// Fully transparent pixels carry no tile.
    pub fn is_transparent(&self) -> bool {
        self.alpha() == 0.0
    }

    /// Channels as `0.0..=1.0` floats, the layout the debug renderer uploads.
    pub fn to_linear_f32(&self) -> [f32; 4] {
        self.0.map(|c| f32::from(c) / 255.0)
    }

    /// CSS color string, e.g. `rgba(0, 128, 0, 1)`.
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r(), self.g(), self.b(), self.alpha())
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// One solid cell of the level.
///
/// Position and collider share the same world coordinates. `color` and
/// `visible` are for drawing only; physics reads nothing but `collider`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// World x of the left edge (`column * tile width`).
    pub x: f64,
    /// World y of the top edge (`row * tile height`).
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub collider: Rect,
    pub color: Rgba,
    pub visible: bool,
}

impl Tile {
    /// Build the tile for grid cell `(column, row)`.
    pub fn at_cell(column: u32, row: u32, size: TileSize, color: Rgba) -> Self {
        let width = f64::from(size.width);
        let height = f64::from(size.height);
        let x = f64::from(column) * width;
        let y = f64::from(row) * height;
        Self {
            x,
            y,
            width,
            height,
            collider: Rect::new(x, y, width, height),
            color,
            visible: true,
        }
    }

    pub fn left(&self) -> f64 {
        self.collider.left()
    }

    pub fn right(&self) -> f64 {
        self.collider.right()
    }

    pub fn top(&self) -> f64 {
        self.collider.top()
    }

    pub fn bottom(&self) -> f64 {
        self.collider.bottom()
    }
}
