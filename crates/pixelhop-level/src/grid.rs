//! The static collision grid built from a level image.
//!
//! Every source pixel maps to one tile-sized world cell: fully transparent
//! pixels are empty, anything else is a solid [`Tile`] carrying the pixel's
//! color. The grid is built once at load time and exposes no mutation, so
//! the physics step and the renderer can both hold `&TileGrid` for the whole
//! session.
//!
//! # Scan order
//!
//! Collision queries walk cells row by row, top to bottom, and left to right
//! within a row. The resolver stops at the *first* overlapping tile in that
//! order, so the order is part of the observable behavior.
//! [`TileGrid::candidates`] narrows the walk to the cells a query rectangle
//! can touch without changing which tile comes first.

use std::ops::Range;
use std::path::Path;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::geometry::{intersects, Rect};
use crate::tile::{Rgba, Tile, TileSize};
use crate::LevelError;

/// Grid coordinates of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex {
    pub column: u32,
    pub row: u32,
}

// ---------------------------------------------------------------------------
// TileGrid
// ---------------------------------------------------------------------------

/// Row-major grid of optional solid tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tile_size: TileSize,
    /// `rows * columns` cells, row-major.
    cells: Vec<Option<Tile>>,
}

impl TileGrid {
    /// Build a grid from raw RGBA8 pixels (`width * height * 4` bytes,
    /// row-major, no padding).
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::ZeroTileSize`], [`LevelError::EmptyImage`] or
    /// [`LevelError::BufferSize`] if the inputs are inconsistent.
    pub fn from_rgba(
        width: u32,
        height: u32,
        pixels: &[u8],
        tile_size: TileSize,
    ) -> Result<Self, LevelError> {
        if !tile_size.is_valid() {
            return Err(LevelError::ZeroTileSize {
                width: tile_size.width,
                height: tile_size.height,
            });
        }
        if width == 0 || height == 0 {
            return Err(LevelError::EmptyImage { width, height });
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if pixels.len() != expected {
            return Err(LevelError::BufferSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        let cells: Vec<Option<Tile>> = pixels
            .chunks_exact(4)
            .enumerate()
            .map(|(i, px)| {
                let color = Rgba([px[0], px[1], px[2], px[3]]);
                if color.is_transparent() {
                    return None;
                }
                let column = (i % width as usize) as u32;
                let row = (i / width as usize) as u32;
                Some(Tile::at_cell(column, row, tile_size, color))
            })
            .collect();

        let grid = Self {
            columns: width,
            rows: height,
            tile_size,
            cells,
        };
        tracing::debug!(
            columns = grid.columns,
            rows = grid.rows,
            tile_width = tile_size.width,
            tile_height = tile_size.height,
            solid = grid.solid_count(),
            "tile grid built"
        );
        Ok(grid)
    }

    /// Build a grid from a decoded image, one cell per pixel.
    pub fn from_image(image: &RgbaImage, tile_size: TileSize) -> Result<Self, LevelError> {
        Self::from_rgba(image.width(), image.height(), image.as_raw(), tile_size)
    }

    /// Read and decode a level image from disk, then build its grid.
    pub fn load(path: impl AsRef<Path>, tile_size: TileSize) -> Result<Self, LevelError> {
        let image = crate::level::load_level(path)?;
        Self::from_image(&image, tile_size)
    }

    // -- dimensions ---------------------------------------------------------

    /// Number of cells per row (source image width).
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows (source image height).
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    /// Width of the level in world pixels.
    pub fn world_width(&self) -> f64 {
        f64::from(self.columns) * f64::from(self.tile_size.width)
    }

    /// Height of the level in world pixels.
    pub fn world_height(&self) -> f64 {
        f64::from(self.rows) * f64::from(self.tile_size.height)
    }

    // -- lookup -------------------------------------------------------------

    /// The tile at `(column, row)`, or `None` for empty or out-of-range cells.
    pub fn get(&self, column: u32, row: u32) -> Option<&Tile> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells[row as usize * self.columns as usize + column as usize].as_ref()
    }

    pub fn is_solid(&self, column: u32, row: u32) -> bool {
        self.get(column, row).is_some()
    }

    /// Rows top to bottom, each a slice of `columns` cells.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Option<Tile>]> {
        self.cells.chunks_exact(self.columns as usize)
    }

    /// All solid tiles in scan order.
    pub fn tiles(&self) -> impl Iterator<Item = (CellIndex, &Tile)> {
        let columns = self.columns as usize;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.as_ref().map(|tile| {
                let index = CellIndex {
                    column: (i % columns) as u32,
                    row: (i / columns) as u32,
                };
                (index, tile)
            })
        })
    }

    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    // -- collision queries --------------------------------------------------

    /// Solid tiles in the cells `rect` can overlap, in scan order.
    ///
    /// A tile outside this window can never intersect `rect`, so the first
    /// intersecting tile found here is the same one a full-grid scan finds.
    pub fn candidates<'a>(&'a self, rect: &Rect) -> impl Iterator<Item = (CellIndex, &'a Tile)> + 'a {
        let columns = cell_span(rect.left(), rect.right(), self.tile_size.width, self.columns);
        let rows = cell_span(rect.top(), rect.bottom(), self.tile_size.height, self.rows);
        rows.flat_map(move |row| {
            columns.clone().filter_map(move |column| {
                self.get(column, row)
                    .map(|tile| (CellIndex { column, row }, tile))
            })
        })
    }

    /// The first tile, in scan order, whose collider intersects `rect`.
    pub fn first_overlap(&self, rect: &Rect) -> Option<(CellIndex, &Tile)> {
        self.candidates(rect)
            .find(|(_, tile)| intersects(rect, &tile.collider))
    }

    /// [`first_overlap`](Self::first_overlap) by walking every cell.
    ///
    /// Kept as the reference the windowed query is checked against.
    pub fn first_overlap_exhaustive(&self, rect: &Rect) -> Option<(CellIndex, &Tile)> {
        self.tiles()
            .find(|(_, tile)| intersects(rect, &tile.collider))
    }

    /// Whether any tile overlaps `rect`.
    pub fn overlaps_any(&self, rect: &Rect) -> bool {
        self.first_overlap(rect).is_some()
    }

    // -- hashing ------------------------------------------------------------

    /// BLAKE3 hex digest (64 lowercase hex chars) of the grid layout:
    /// dimensions, tile size, and per-cell solidity, placement and color.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.columns.to_le_bytes());
        hasher.update(&self.rows.to_le_bytes());
        hasher.update(&self.tile_size.width.to_le_bytes());
        hasher.update(&self.tile_size.height.to_le_bytes());
        for cell in &self.cells {
            match cell {
                None => {
                    hasher.update(&[0]);
                }
                Some(tile) => {
                    hasher.update(&[1]);
                    hasher.update(&tile.x.to_le_bytes());
                    hasher.update(&tile.y.to_le_bytes());
                    hasher.update(&tile.color.0);
                }
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Cell indices along one axis whose span can strictly overlap `[lo, hi]`,
/// clamped to `0..count`. Padded by one cell on each side so rounding in the
/// division never drops a cell whose edge sits within an ulp of the range.
fn cell_span(lo: f64, hi: f64, size: u32, count: u32) -> Range<u32> {
    let size = f64::from(size);
    let clamp = |v: f64| v.max(0.0).min(f64::from(count)) as u32;
    clamp((lo / size).floor() - 1.0)..clamp((hi / size).ceil() + 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
