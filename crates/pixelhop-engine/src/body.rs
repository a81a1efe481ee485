//! The player's kinematic body.
//!
//! A [`Body`] owns its collider. Every position change goes through
//! [`Body::translate`] or one of the edge snaps, which move the position and
//! the collider by the same delta, so the two can never drift apart.

use pixelhop_level::geometry::Rect;
use serde::{Deserialize, Serialize};

use crate::config::Hitbox;

/// Plain 2D vector in virtual pixels (or px/s).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation from `self` to `to`.
    pub fn lerp(self, to: Vec2, alpha: f64) -> Vec2 {
        Vec2::new(
            self.x + (to.x - self.x) * alpha,
            self.y + (to.y - self.y) * alpha,
        )
    }
}

/// Which sides of the collider touched a tile during the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollisionFlags {
    pub above: bool,
    pub below: bool,
    pub left: bool,
    pub right: bool,
}

impl CollisionFlags {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn any(&self) -> bool {
        self.above || self.below || self.left || self.right
    }
}

/// A deserialized [`Body`] whose collider is not attached the way
/// [`Body::new`] attaches it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BodyError {
    #[error("body hitbox {found:?} differs from the configured {expected:?}")]
    HitboxMismatch { expected: Hitbox, found: Hitbox },

    #[error("collider is {found:?} but the hitbox is {expected:?}")]
    ColliderSize {
        expected: (f64, f64),
        found: (f64, f64),
    },

    #[error("collider sits at offset ({dx}, {dy}) from the position, hitbox offset is ({offset_x}, {offset_y})")]
    Detached {
        dx: f64,
        dy: f64,
        offset_x: f64,
        offset_y: f64,
    },

    #[error("body position or collider is not finite")]
    NonFinite,
}

/// Slack allowed between the collider and `position + offset`, scaled by
/// the coordinate's magnitude.
const ATTACH_TOLERANCE: f64 = 1e-6;

/// The player: position, motion state and an attached collider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    position: Vec2,
    last_position: Vec2,
    pub velocity: Vec2,
    /// Facing per axis, each `1.0` or `-1.0`.
    pub direction: Vec2,
    collider: Rect,
    hitbox: Hitbox,
    pub flags: CollisionFlags,
    /// Set on take-off, cleared once a landing contact is seen.
    pub airborne: bool,
    /// Seconds since the last jump.
    pub jump_timer: f64,
}

impl Body {
    /// A body at rest at `spawn`, facing right and down.
    pub fn new(spawn: Vec2, hitbox: Hitbox) -> Self {
        Self {
            position: spawn,
            last_position: spawn,
            velocity: Vec2::default(),
            direction: Vec2::new(1.0, 1.0),
            collider: Rect::new(
                spawn.x + hitbox.offset_x,
                spawn.y + hitbox.offset_y,
                hitbox.width,
                hitbox.height,
            ),
            hitbox,
            flags: CollisionFlags::default(),
            airborne: false,
            jump_timer: 0.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Position at the start of the most recent step.
    pub fn last_position(&self) -> Vec2 {
        self.last_position
    }

    pub fn collider(&self) -> &Rect {
        &self.collider
    }

    pub fn hitbox(&self) -> Hitbox {
        self.hitbox
    }

    pub fn facing_left(&self) -> bool {
        self.direction.x < 0.0
    }

    pub(crate) fn remember_position(&mut self) {
        self.last_position = self.position;
    }

    /// Move position and collider together.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.position.x += dx;
        self.position.y += dy;
        self.collider.translate(dx, dy);
    }

    /// Place the collider's left edge exactly at `x`.
    pub fn snap_left(&mut self, x: f64) {
        let dx = x - self.collider.left();
        self.position.x += dx;
        self.collider.x = x;
    }

    /// Place the collider's right edge exactly at `x`.
    pub fn snap_right(&mut self, x: f64) {
        let target = x - self.collider.width();
        let dx = target - self.collider.left();
        self.position.x += dx;
        self.collider.x = target;
    }

    /// Place the collider's top edge exactly at `y`.
    pub fn snap_top(&mut self, y: f64) {
        let dy = y - self.collider.top();
        self.position.y += dy;
        self.collider.y = y;
    }

    /// Place the collider's bottom edge exactly at `y`.
    pub fn snap_bottom(&mut self, y: f64) {
        let target = y - self.collider.height();
        let dy = target - self.collider.top();
        self.position.y += dy;
        self.collider.y = target;
    }

    /// Check that the collider is the hitbox placed at the position, and
    /// that the hitbox is `expected`.
    ///
    /// Always holds for bodies built with [`Body::new`]; bodies read back
    /// from JSON are checked before use.
    pub fn validate(&self, expected: &Hitbox) -> Result<(), BodyError> {
        if self.hitbox != *expected {
            return Err(BodyError::HitboxMismatch {
                expected: *expected,
                found: self.hitbox,
            });
        }
        let finite = [
            self.position.x,
            self.position.y,
            self.last_position.x,
            self.last_position.y,
            self.collider.x,
            self.collider.y,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(BodyError::NonFinite);
        }
        if self.collider.width() != self.hitbox.width || self.collider.height() != self.hitbox.height {
            return Err(BodyError::ColliderSize {
                expected: (self.hitbox.width, self.hitbox.height),
                found: (self.collider.width(), self.collider.height()),
            });
        }
        let dx = self.collider.left() - self.position.x;
        let dy = self.collider.top() - self.position.y;
        let attached = |d: f64, offset: f64, at: f64| {
            (d - offset).abs() <= ATTACH_TOLERANCE * (1.0 + at.abs())
        };
        if !attached(dx, self.hitbox.offset_x, self.position.x)
            || !attached(dy, self.hitbox.offset_y, self.position.y)
        {
            return Err(BodyError::Detached {
                dx,
                dy,
                offset_x: self.hitbox.offset_x,
                offset_y: self.hitbox.offset_y,
            });
        }
        Ok(())
    }

    /// Position blended between the last two steps; `alpha` is the frame
    /// driver's interpolation factor.
    pub fn render_position(&self, alpha: f64) -> Vec2 {
        self.last_position.lerp(self.position, alpha.clamp(0.0, 1.0))
    }
}
