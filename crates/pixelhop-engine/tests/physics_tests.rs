//! Physics step scenarios against small hand-built levels.
//!
//! Every level here uses 16x16 tiles. Unless noted, the body's collider is
//! the default hitbox (offset 12,10, size 11x22), so a body whose position
//! is `y` has its collider bottom at `y + 32`.

use pixelhop_engine::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SOLID: [u8; 4] = [90, 60, 30, 255];
const DT: f64 = 1.0 / 60.0;

/// Build a level from an ASCII map: `#` is a solid tile, anything else empty.
fn level(rows: &[&str]) -> TileGrid {
    let height = rows.len() as u32;
    let width = rows[0].len() as u32;
    let mut px = Vec::with_capacity((width * height * 4) as usize);
    for row in rows {
        assert_eq!(row.len() as u32, width, "ragged level row");
        for c in row.chars() {
            px.extend_from_slice(if c == '#' { &SOLID } else { &[0, 0, 0, 0] });
        }
    }
    TileGrid::from_rgba(width, height, &px, TileSize::default()).unwrap()
}

/// 12x8 room with a floor on row 7 (top edge at y = 112).
fn room() -> TileGrid {
    level(&[
        "............",
        "............",
        "............",
        "............",
        "............",
        "............",
        "............",
        "############",
    ])
}

/// Position that puts the collider bottom flush with y = 112.
const ON_ROOM_FLOOR: f64 = 112.0 - 32.0;

/// Step `body` until it reports standing on something, at most `limit` steps.
fn settle(body: &mut Body, grid: &TileGrid, config: &PhysicsConfig, dt: f64, limit: usize) {
    for _ in 0..limit {
        step(body, grid, &InputFrame::idle(), config, dt);
        if body.flags.below {
            return;
        }
    }
    panic!("body never landed within {limit} steps");
}

// ---- Test 1: edge contact is not a collision ----

#[test]
fn touching_edges_do_not_collide() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(!intersects(&a, &Rect::new(10.0, 0.0, 10.0, 10.0)));
    assert!(!intersects(&a, &Rect::new(0.0, 10.0, 10.0, 10.0)));
    assert!(intersects(&a, &Rect::new(9.0, 0.0, 10.0, 10.0)));

    // A body resting flush on the floor is not overlapping it.
    let grid = room();
    let body = Body::new(Vec2::new(40.0, ON_ROOM_FLOOR), Hitbox::default());
    assert_eq!(body.collider().bottom(), 112.0);
    assert!(!grid.overlaps_any(body.collider()));
}

// ---- Test 2: end-to-end landing from the default spawn ----

#[test]
fn default_spawn_lands_on_the_tile_below() {
    // One tile at cell (10, 2): x 160..176, y 32..48, under the collider
    // span 162..173.
    let grid = level(&["............", "............", "..........#."]);
    let mut session = Session::spawn_default(grid);
    assert_eq!(session.body().position(), DEFAULT_SPAWN);

    for _ in 0..10 {
        session.step(&InputFrame::idle(), DT);
        if session.body().flags.below {
            break;
        }
    }

    let body = session.body();
    assert!(body.flags.below);
    assert_eq!(body.velocity.y, 0.0);
    assert_eq!(body.collider().bottom(), 32.0);
    assert_eq!(session.tick_count(), 1, "grounded on the first step");
}

// ---- Test 3: landing sets the flag in the same frame ----

#[test]
fn landing_sets_below_and_zeroes_velocity_in_the_same_step() {
    let grid = room();
    let config = PhysicsConfig::default();
    let mut body = Body::new(Vec2::new(40.0, 0.0), Hitbox::default());

    let mut landed = None;
    for i in 0..120 {
        let report = step(&mut body, &grid, &InputFrame::idle(), &config, DT);
        if report.y_contact.is_some() {
            landed = Some((i, report));
            break;
        }
        assert!(!body.flags.below, "below set without a Y contact at step {i}");
        assert!(body.velocity.y > 0.0);
    }

    let (_, report) = landed.expect("body never reached the floor");
    assert_eq!(report.y_contact.map(|c| c.row), Some(7));
    assert!(body.flags.below);
    assert!(!body.flags.above);
    assert_eq!(body.velocity.y, 0.0);
    assert_eq!(body.collider().bottom(), 112.0);
}

// ---- Test 4: contacts gate the following step ----

#[test]
fn contact_flags_take_effect_one_step_later() {
    let grid = room();
    let config = PhysicsConfig::default();
    let mut body = Body::new(Vec2::new(40.0, ON_ROOM_FLOOR), Hitbox::default());
    body.jump_timer = 1.0;

    // Geometrically on the floor, but no step has seen the contact yet.
    let jump = InputFrame::idle().with_press(Action::Jump);
    let report = step(&mut body, &grid, &jump, &config, DT);
    assert!(!report.jumped);
    assert!(body.flags.below, "the step itself records the contact");

    // The next step reads it.
    let report = step(&mut body, &grid, &jump, &config, DT);
    assert!(report.jumped);
    assert!(body.velocity.y < 0.0);
}

#[test]
fn resting_body_keeps_zero_vertical_velocity() {
    let grid = room();
    let config = PhysicsConfig::default();
    let mut body = Body::new(Vec2::new(40.0, ON_ROOM_FLOOR), Hitbox::default());
    for _ in 0..30 {
        let report = step(&mut body, &grid, &InputFrame::idle(), &config, DT);
        assert!(report.y_contact.is_some());
        assert_eq!(body.velocity.y, 0.0);
        assert_eq!(body.collider().bottom(), 112.0);
    }
}

// ---- Test 5: jump apex ----

#[test]
fn jump_peaks_at_max_height_after_time_to_apex() {
    let grid = room();
    let config = PhysicsConfig::default();
    let dt = 1e-4;
    let mut body = Body::new(Vec2::new(40.0, ON_ROOM_FLOOR), Hitbox::default());
    settle(&mut body, &grid, &config, dt, 10);
    body.jump_timer = config.jump_cooldown;

    let start_y = body.position().y;
    let report = step(
        &mut body,
        &grid,
        &InputFrame::idle().with_press(Action::Jump),
        &config,
        dt,
    );
    assert!(report.jumped);

    let mut min_y = body.position().y;
    let mut steps_to_apex = 1u32;
    let mut n = 1u32;
    while body.velocity.y < 0.0 {
        step(&mut body, &grid, &InputFrame::idle(), &config, dt);
        n += 1;
        if body.position().y < min_y {
            min_y = body.position().y;
            steps_to_apex = n;
        }
        assert!(n < 100_000, "jump never peaked");
    }

    let height = start_y - min_y;
    let apex_time = f64::from(steps_to_apex) * dt;
    assert!(
        (height - config.max_jump_height).abs() < 0.1,
        "peak height {height}, expected {}",
        config.max_jump_height
    );
    assert!(
        (apex_time - config.time_to_jump_apex).abs() < 1e-3,
        "apex after {apex_time}s, expected {}",
        config.time_to_jump_apex
    );
    assert_eq!(body.position().x, 40.0, "no horizontal drift");
}

#[test]
fn derived_jump_parameters() {
    let config = PhysicsConfig::default();
    assert!((config.gravity() - 600.0).abs() < 1e-9);
    assert!((config.jump_velocity() + 240.0).abs() < 1e-9);
}

// ---- Test 6: jump cooldown ----

#[test]
fn jump_before_cooldown_has_no_effect() {
    let grid = room();
    let config = PhysicsConfig::default();
    let mut body = Body::new(Vec2::new(40.0, ON_ROOM_FLOOR), Hitbox::default());
    settle(&mut body, &grid, &config, DT, 10);
    assert!(body.jump_timer < config.jump_cooldown);

    let jump = InputFrame::idle().with_press(Action::Jump);
    let report = step(&mut body, &grid, &jump, &config, DT);
    assert!(!report.jumped);
    assert_eq!(body.velocity.y, 0.0);
    assert!(!body.airborne);

    // Wait out the cooldown on the ground, then it works.
    while body.jump_timer < config.jump_cooldown {
        step(&mut body, &grid, &InputFrame::idle(), &config, DT);
    }
    let report = step(&mut body, &grid, &jump, &config, DT);
    assert!(report.jumped);
}

#[test]
fn long_cooldown_blocks_a_second_jump_after_landing() {
    let grid = room();
    let config = PhysicsConfig {
        jump_cooldown: 10.0,
        ..PhysicsConfig::default()
    };
    let mut body = Body::new(Vec2::new(40.0, ON_ROOM_FLOOR), Hitbox::default());
    settle(&mut body, &grid, &config, DT, 10);
    body.jump_timer = 10.0;

    let jump = InputFrame::idle().with_press(Action::Jump);
    assert!(step(&mut body, &grid, &jump, &config, DT).jumped);

    // Fly, land, and settle.
    for _ in 0..120 {
        step(&mut body, &grid, &InputFrame::idle(), &config, DT);
    }
    assert!(body.flags.below);
    assert!(!body.airborne);

    let report = step(&mut body, &grid, &jump, &config, DT);
    assert!(!report.jumped);
    assert_eq!(body.velocity.y, 0.0);
}

#[test]
fn held_jump_does_not_retrigger() {
    let grid = room();
    let config = PhysicsConfig::default();
    let mut body = Body::new(Vec2::new(40.0, ON_ROOM_FLOOR), Hitbox::default());
    settle(&mut body, &grid, &config, DT, 10);
    body.jump_timer = 1.0;

    let held = InputFrame::holding(&[Action::Jump]);
    for _ in 0..60 {
        let report = step(&mut body, &grid, &held, &config, DT);
        assert!(!report.jumped);
    }
}

// ---- Test 7: walls and ceilings ----

#[test]
fn walking_into_a_wall_stops_flush() {
    let grid = level(&[
        "........#...",
        "........#...",
        "........#...",
        "........#...",
        "........#...",
        "........#...",
        "........#...",
        "############",
    ]);
    let config = PhysicsConfig::default();
    let mut body = Body::new(Vec2::new(40.0, ON_ROOM_FLOOR), Hitbox::default());
    let right = InputFrame::holding(&[Action::Right]);

    let mut hit = false;
    for _ in 0..120 {
        let report = step(&mut body, &grid, &right, &config, DT);
        if report.x_contact.is_some() {
            hit = true;
            assert!(body.flags.right);
            assert!(!body.flags.left);
        }
        assert!(body.collider().right() <= 128.0);
        assert!(!grid.overlaps_any(body.collider()));
    }
    assert!(hit);
    assert_eq!(body.collider().right(), 128.0);
    assert!(body.flags.below, "still standing while pushing the wall");
}

#[test]
fn walking_left_into_a_wall_stops_flush() {
    let grid = level(&[
        "#...........",
        "#...........",
        "#...........",
        "#...........",
        "#...........",
        "#...........",
        "#...........",
        "############",
    ]);
    let config = PhysicsConfig::default();
    let mut body = Body::new(Vec2::new(60.0, ON_ROOM_FLOOR), Hitbox::default());
    let left = InputFrame::holding(&[Action::Left]);
    for _ in 0..120 {
        step(&mut body, &grid, &left, &config, DT);
    }
    assert!(body.flags.left);
    assert!(body.facing_left());
    assert_eq!(body.collider().left(), 16.0);
}

#[test]
fn ceiling_stops_a_jump() {
    // Ceiling block on row 4 (bottom edge at y = 80) over columns 4..8; the
    // grounded collider top sits at 90.
    let grid = level(&[
        "............",
        "............",
        "............",
        "............",
        "....####....",
        "............",
        "............",
        "############",
    ]);
    let config = PhysicsConfig::default();
    let mut body = Body::new(Vec2::new(40.0, ON_ROOM_FLOOR), Hitbox::default());
    settle(&mut body, &grid, &config, DT, 10);
    body.jump_timer = 1.0;

    // Walk under the block (x 64..128).
    let right = InputFrame::holding(&[Action::Right]);
    while body.collider().left() < 80.0 {
        let report = step(&mut body, &grid, &right, &config, DT);
        assert!(report.x_contact.is_none());
    }
    assert!(body.collider().right() < 128.0);

    let report = step(
        &mut body,
        &grid,
        &InputFrame::idle().with_press(Action::Jump),
        &config,
        DT,
    );
    assert!(report.jumped);
    let mut bumped = false;
    for _ in 0..60 {
        step(&mut body, &grid, &InputFrame::idle(), &config, DT);
        if body.flags.above {
            bumped = true;
            assert_eq!(body.collider().top(), 80.0);
            assert_eq!(body.velocity.y, 0.0);
            break;
        }
    }
    assert!(bumped, "jump never reached the ceiling");
}

// ---- Test 8: dt handling ----

#[test]
fn hitches_are_clamped_to_the_max_step() {
    let grid = room();
    let config = PhysicsConfig::default();
    let mut body = Body::new(Vec2::new(40.0, 0.0), Hitbox::default());
    let report = step(&mut body, &grid, &InputFrame::holding(&[Action::Right]), &config, 5.0);
    assert_eq!(report.dt, config.max_step_dt);
    assert!((body.position().x - (40.0 + 150.0 / 30.0)).abs() < 1e-9);
}

#[test]
fn nan_dt_is_a_no_op() {
    let grid = room();
    let config = PhysicsConfig::default();
    let mut body = Body::new(Vec2::new(40.0, 0.0), Hitbox::default());
    let report = step(&mut body, &grid, &InputFrame::holding(&[Action::Right]), &config, f64::NAN);
    assert_eq!(report.dt, 0.0);
    assert_eq!(body.position(), Vec2::new(40.0, 0.0));
}
