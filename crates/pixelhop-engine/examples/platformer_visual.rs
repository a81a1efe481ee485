//! Interactive platformer demo -- run and jump around a tile level.
//!
//! Run with:
//!   cargo run --example platformer_visual --features renderer -p pixelhop-engine
//!   cargo run --example platformer_visual --features renderer -p pixelhop-engine -- level.png demo.json megaman.png
//!
//! The optional first argument is a level image (one pixel per tile, fully
//! transparent pixels are empty); the optional second one is a `DemoConfig`
//! JSON file and the optional third a player sprite sheet. Without a level
//! image a built-in screen is used; without a sheet the player is a flat
//! quad.
//!
//! Controls:
//!   Left/Right arrows -- run
//!   Space -- jump
//!   Escape -- quit

use pixelhop_engine::prelude::*;
use pixelhop_engine::render::{run_windowed, SpriteSheet, WindowOptions};

// ---------------------------------------------------------------------------
// Built-in level
// ---------------------------------------------------------------------------

/// 16x15 tiles, exactly one 256x240 screen.
const BUILTIN_LEVEL: [&str; 15] = [
    "................",
    "................",
    "................",
    "................",
    "................",
    "...........###..",
    "................",
    "......###.......",
    "................",
    "##............##",
    "##...####.....##",
    "##............##",
    "##..........####",
    "################",
    "################",
];

fn builtin_level(tile_size: TileSize) -> Result<TileGrid, LevelError> {
    let width = BUILTIN_LEVEL[0].len() as u32;
    let height = BUILTIN_LEVEL.len() as u32;
    let mut px = Vec::with_capacity((width * height * 4) as usize);
    for (row, line) in BUILTIN_LEVEL.iter().enumerate() {
        for c in line.chars() {
            let pixel = match (c, row) {
                ('#', row) if row >= 13 => [92, 64, 51, 255],
                ('#', _) => [34, 139, 34, 255],
                _ => [0, 0, 0, 0],
            };
            px.extend_from_slice(&pixel);
        }
    }
    TileGrid::from_rgba(width, height, &px, tile_size)
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let level_path = args.next();
    let demo = match args.next() {
        Some(path) => DemoConfig::from_json_str(&std::fs::read_to_string(&path)?)?,
        None => DemoConfig::default(),
    };
    let sprite_sheet = args.next().map(SpriteSheet::load).transpose()?;

    let grid = match &level_path {
        Some(path) => TileGrid::load(path, demo.tile_size)?,
        None => builtin_level(demo.tile_size)?,
    };
    tracing::info!(
        level = level_path.as_deref().unwrap_or("<built-in>"),
        columns = grid.columns(),
        rows = grid.rows(),
        solid = grid.solid_count(),
        "level loaded"
    );

    let (x, y) = demo.spawn;
    let session = Session::new(grid, demo.physics.clone(), Vec2::new(x, y));
    let options = WindowOptions {
        title: "pixelhop -- arrows to run, space to jump, ESC to quit".to_owned(),
        sprite_sheet,
        ..WindowOptions::from_demo(&demo)
    };
    run_windowed(session, options)
}
