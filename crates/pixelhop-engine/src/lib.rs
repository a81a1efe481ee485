//! pixelhop engine -- a tile-based platformer simulation with a fixed-step
//! frame driver.
//!
//! This crate builds on [`pixelhop_level`] to provide the simulation: a
//! single player [`Body`](body::Body) moved by gravity and input against a
//! static [`TileGrid`](pixelhop_level::grid::TileGrid), resolved one axis at
//! a time. A [`FrameDriver`](frame::FrameDriver) turns wall-clock time into
//! whole physics steps, and [`Session`](session::Session) ties the pieces
//! together with snapshots and replay logs for determinism checks.
//!
//! The wgpu debug renderer and the windowed runner are behind the
//! `renderer` feature.
//!
//! # Quick Start
//!
//! ```
//! use pixelhop_engine::prelude::*;
//!
//! // 16x3 level with a solid floor on the bottom row.
//! let mut pixels = vec![0u8; 16 * 3 * 4];
//! for column in 0..16 {
//!     let i = (2 * 16 + column) * 4;
//!     pixels[i..i + 4].copy_from_slice(&[90, 60, 30, 255]);
//! }
//! let grid = TileGrid::from_rgba(16, 3, &pixels, TileSize::default()).unwrap();
//! let mut session = Session::spawn_default(grid);
//!
//! let mut driver = FrameDriver::new(FrameConfig::default());
//! for _ in 0..30 {
//!     driver.advance(1.0 / 60.0, |dt| {
//!         session.step(&InputFrame::holding(&[Action::Right]), dt);
//!     });
//! }
//!
//! // Resting on the floor, flush with its top edge.
//! assert!(session.body().flags.below);
//! assert_eq!(session.body().collider().bottom(), 32.0);
//! ```

#![deny(unsafe_code)]

pub mod body;
pub mod config;
pub mod frame;
pub mod input;
pub mod physics;
pub mod render;
pub mod replay;
pub mod session;
pub mod snapshot;
pub mod viewport;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the level crate for convenience.
pub use pixelhop_level;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use pixelhop_level::prelude::*;

    pub use crate::body::{Body, BodyError, CollisionFlags, Vec2};
    pub use crate::config::{
        ConfigError, DemoConfig, FrameConfig, Hitbox, PhysicsConfig, TimestepMode,
    };
    pub use crate::frame::{FrameDriver, FrameReport};
    pub use crate::input::{
        Action, ActionQuery, Binding, Bindings, InputFrame, InputState,
    };
    pub use crate::physics::{step, StepReport};
    pub use crate::render::{
        extract_draw_commands, extract_draw_commands_with_sheet, DrawCommand, DrawKind, SpriteSheet,
        SpriteSheetError,
    };
    pub use crate::replay::{
        replay, ReplayDivergence, ReplayEntry, ReplayError, ReplayLog, ReplayRecorder,
        ReplayResult,
    };
    pub use crate::session::{Session, DEFAULT_SPAWN};
    pub use crate::snapshot::{SessionSnapshot, SnapshotError};
    pub use crate::viewport::{integer_scale, IntegerScale, Viewport};
}
