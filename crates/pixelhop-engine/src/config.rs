//! Tuning parameters for the player body and the frame loop.
//!
//! Jump physics is specified by *design* parameters -- how high the jump
//! peaks and how long it takes to get there -- and the integration constants
//! are derived from them with the projectile-motion equations:
//!
//! ```text
//! gravity       = 2 * max_jump_height / time_to_jump_apex^2
//! jump_velocity = -gravity * time_to_jump_apex      (y grows downward)
//! ```
//!
//! All distances are virtual-resolution pixels, all times seconds.

use pixelhop_level::tile::TileSize;
use serde::{Deserialize, Serialize};

/// Pixels per world unit in the default tuning (one 16px tile).
pub const PIXELS_PER_UNIT: f64 = 16.0;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON text could not be parsed into a config.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the simulation cannot run with.
    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be positive and finite, got {value}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Hitbox
// ---------------------------------------------------------------------------

/// The body's collider relative to its position (the sprite's top-left).
///
/// The default fits the 32x32 player sprite: the collider is narrower than
/// the art and starts below the top of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hitbox {
    pub offset_x: f64,
    pub offset_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Hitbox {
    fn default() -> Self {
        Self {
            offset_x: 12.0,
            offset_y: 10.0,
            width: 11.0,
            height: 22.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PhysicsConfig
// ---------------------------------------------------------------------------

/// Movement and jump tuning for the player body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Horizontal speed while Left or Right is held, px/s.
    pub move_speed: f64,
    /// Peak height of a jump, px.
    pub max_jump_height: f64,
    /// Time from take-off to the peak, s.
    pub time_to_jump_apex: f64,
    /// Minimum time between two jumps, s.
    pub jump_cooldown: f64,
    /// Terminal downward velocity, px/s.
    pub max_fall_speed: f64,
    /// Upper bound on the `dt` a single physics step integrates, s.
    pub max_step_dt: f64,
    pub hitbox: Hitbox,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            move_speed: 150.0,
            max_jump_height: 3.0 * PIXELS_PER_UNIT,
            time_to_jump_apex: 0.4,
            jump_cooldown: 0.15,
            max_fall_speed: 30.0 * PIXELS_PER_UNIT,
            max_step_dt: 1.0 / 30.0,
            hitbox: Hitbox::default(),
        }
    }
}

impl PhysicsConfig {
    /// Downward acceleration, px/s^2.
    pub fn gravity(&self) -> f64 {
        2.0 * self.max_jump_height / self.time_to_jump_apex.powi(2)
    }

    /// Initial vertical velocity of a jump, px/s. Negative (upward).
    pub fn jump_velocity(&self) -> f64 {
        -self.gravity() * self.time_to_jump_apex
    }

    /// Parse a config from JSON and validate it. Missing fields take their
    /// defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every parameter is usable by the physics step.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("move_speed", self.move_speed)?;
        require_positive("max_jump_height", self.max_jump_height)?;
        require_positive("time_to_jump_apex", self.time_to_jump_apex)?;
        require_positive("max_fall_speed", self.max_fall_speed)?;
        require_positive("max_step_dt", self.max_step_dt)?;
        require_positive("hitbox.width", self.hitbox.width)?;
        require_positive("hitbox.height", self.hitbox.height)?;
        if !(self.jump_cooldown >= 0.0 && self.jump_cooldown.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "jump_cooldown",
                reason: format!("must be non-negative and finite, got {}", self.jump_cooldown),
            });
        }
        if !(self.hitbox.offset_x.is_finite() && self.hitbox.offset_y.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "hitbox.offset",
                reason: "must be finite".to_owned(),
            });
        }
        Ok(())
    }

    /// Largest distance one step can move along each axis, px.
    ///
    /// While both stay within the tile size, the first overlapping tile in
    /// scan order is also the nearest one, so snapping to it never leaves the
    /// body inside another tile.
    pub fn max_step_travel(&self) -> (f64, f64) {
        let vertical = self.max_fall_speed.max(self.jump_velocity().abs());
        (self.move_speed * self.max_step_dt, vertical * self.max_step_dt)
    }

    /// Whether [`max_step_travel`](Self::max_step_travel) fits inside one
    /// tile.
    pub fn fits_tile(&self, tile: TileSize) -> bool {
        let (x, y) = self.max_step_travel();
        x <= f64::from(tile.width) && y <= f64::from(tile.height)
    }
}

// ---------------------------------------------------------------------------
// FrameConfig
// ---------------------------------------------------------------------------

/// How the frame driver turns wall-clock time into physics steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestepMode {
    /// Run zero or more steps of exactly `timestep` per frame and carry the
    /// remainder; rendering interpolates between the last two states.
    Fixed,
    /// Run exactly one step per frame with the measured (clamped) delta.
    Variable,
}

/// Configuration for the frame driver.
///
/// The defaults match a 60 Hz browser animation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Simulation step in seconds. Must be positive and finite.
    pub timestep: f64,
    /// Steps allowed in one frame before the backlog is discarded.
    pub max_updates_per_frame: u32,
    pub mode: TimestepMode,
    /// Longest delta a [`TimestepMode::Variable`] update receives, s.
    pub max_dt: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            max_updates_per_frame: 240,
            mode: TimestepMode::Fixed,
            max_dt: 1.0 / 30.0,
        }
    }
}

// ---------------------------------------------------------------------------
// DemoConfig
// ---------------------------------------------------------------------------

/// Everything the demo binary needs to start a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Virtual resolution the simulation and camera use, px.
    pub virtual_width: u32,
    pub virtual_height: u32,
    pub tile_size: TileSize,
    /// Initial body position, px.
    pub spawn: (f64, f64),
    pub physics: PhysicsConfig,
    pub frame: FrameConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            virtual_width: 256,
            virtual_height: 240,
            tile_size: TileSize::default(),
            spawn: (150.0, 0.0),
            physics: PhysicsConfig::default(),
            frame: FrameConfig::default(),
        }
    }
}

impl DemoConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.physics.validate()?;
        if !(config.frame.timestep > 0.0 && config.frame.timestep.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "frame.timestep",
                reason: format!("must be positive and finite, got {}", config.frame.timestep),
            });
        }
        if !config.tile_size.is_valid() {
            return Err(ConfigError::Invalid {
                field: "tile_size",
                reason: "both dimensions must be non-zero".to_owned(),
            });
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
