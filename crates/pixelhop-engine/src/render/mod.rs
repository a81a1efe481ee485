//! Debug view of a running session.
//!
//! [`extract`] and [`sprite`] are always compiled: they turn a session into
//! draw commands without touching the GPU. The wgpu renderer and the windowed runner live
//! behind the `renderer` feature.

pub mod extract;
pub mod sprite;

#[cfg(feature = "renderer")]
pub mod app;
#[cfg(feature = "renderer")]
pub mod renderer;

pub use extract::{extract_draw_commands, extract_draw_commands_with_sheet, DrawCommand, DrawKind};
pub use sprite::{SpriteSheet, SpriteSheetError};

#[cfg(feature = "renderer")]
pub use app::{run_windowed, WindowOptions};
#[cfg(feature = "renderer")]
pub use renderer::{Camera2D, DebugRenderer};
