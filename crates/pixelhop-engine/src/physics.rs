//! One fixed step of platformer physics.
//!
//! The step reads input, integrates gravity and resolves collisions against
//! the tile grid one axis at a time: first X, then Y against the corrected
//! X. Contact flags written at the end of a step are the ones the *next*
//! step reads to decide whether the body is grounded, so a landing is
//! noticed one step after it happens.
//!
//! Resolution only looks at the first overlapping tile in scan order and
//! snaps the collider flush against it. That is exact as long as one step
//! never travels further than one tile along either axis; see
//! [`PhysicsConfig::fits_tile`].

use pixelhop_level::grid::{CellIndex, TileGrid};

use crate::body::Body;
use crate::config::PhysicsConfig;
use crate::input::{Action, ActionQuery};

/// What happened during a step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepReport {
    /// The `dt` actually integrated, after clamping.
    pub dt: f64,
    /// A jump started this step.
    pub jumped: bool,
    /// Tile the X sweep stopped against.
    pub x_contact: Option<CellIndex>,
    /// Tile the Y sweep stopped against.
    pub y_contact: Option<CellIndex>,
}

/// Clamp a measured delta to `[0, max]`. NaN becomes zero.
pub fn clamp_dt(dt: f64, max: f64) -> f64 {
    if dt.is_nan() || dt <= 0.0 {
        0.0
    } else {
        dt.min(max)
    }
}

/// Advance `body` by `dt` seconds.
pub fn step(
    body: &mut Body,
    grid: &TileGrid,
    input: &impl ActionQuery,
    config: &PhysicsConfig,
    dt: f64,
) -> StepReport {
    let dt = clamp_dt(dt, config.max_step_dt);
    let mut report = StepReport {
        dt,
        ..Default::default()
    };

    body.remember_position();
    body.jump_timer += dt;

    body.velocity.x = 0.0;
    if input.is_active(Action::Left) {
        body.direction.x = -1.0;
        body.velocity.x = config.move_speed;
    } else if input.is_active(Action::Right) {
        body.direction.x = 1.0;
        body.velocity.x = config.move_speed;
    }

    if body.flags.above || body.flags.below {
        body.velocity.y = 0.0;
    }

    if body.jump_timer >= config.jump_cooldown
        && input.just_pressed(Action::Jump)
        && body.flags.below
        && !body.flags.above
        && !body.airborne
    {
        body.jump_timer = 0.0;
        body.airborne = true;
        body.velocity.y = config.jump_velocity();
        report.jumped = true;
    }

    if body.airborne && body.flags.below {
        body.airborne = false;
    }

    body.velocity.y = (body.velocity.y + config.gravity() * dt).min(config.max_fall_speed);

    body.flags.reset();
    let dx = body.direction.x * body.velocity.x * dt;
    report.x_contact = resolve_x(body, grid, dx);
    let dy = body.velocity.y * dt;
    report.y_contact = resolve_y(body, grid, dy);

    if report.x_contact.is_some() || report.y_contact.is_some() {
        tracing::trace!(
            x_contact = ?report.x_contact,
            y_contact = ?report.y_contact,
            flags = ?body.flags,
            "contact"
        );
    }
    report
}

fn resolve_x(body: &mut Body, grid: &TileGrid, dx: f64) -> Option<CellIndex> {
    let probe = body.collider().translated(dx, 0.0);
    match grid.first_overlap(&probe) {
        Some((index, tile)) => {
            if body.direction.x > 0.0 {
                body.flags.right = true;
                body.snap_right(tile.left());
            } else {
                body.flags.left = true;
                body.snap_left(tile.right());
            }
            Some(index)
        }
        None => {
            body.translate(dx, 0.0);
            None
        }
    }
}

fn resolve_y(body: &mut Body, grid: &TileGrid, dy: f64) -> Option<CellIndex> {
    let probe = body.collider().translated(0.0, dy);
    match grid.first_overlap(&probe) {
        Some((index, tile)) => {
            body.velocity.y = 0.0;
            let collider = *body.collider();
            if tile.top() < collider.top() {
                body.flags.above = true;
                body.snap_top(tile.bottom());
            } else if tile.bottom() > collider.bottom() {
                body.flags.below = true;
                body.snap_bottom(tile.top());
            }
            Some(index)
        }
        None => {
            body.translate(0.0, dy);
            None
        }
    }
}
