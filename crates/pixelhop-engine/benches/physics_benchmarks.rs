//! Physics step benchmarks.
//!
//! The step must stay far below a 60 Hz frame (16.67ms) even with the frame
//! driver's worst case of 240 updates in one frame.
//!
//! Run with: `cargo bench --bench physics_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pixelhop_engine::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const DT: f64 = 1.0 / 60.0;

/// A `columns` x 15 level with a floor, a ceiling and a scatter of blocks.
fn build_level(columns: u32) -> TileGrid {
    let rows = 15u32;
    let mut px = vec![0u8; (columns * rows * 4) as usize];
    for row in 0..rows {
        for column in 0..columns {
            let solid = row == 0
                || row == rows - 1
                || (row == 10 && column % 7 == 3)
                || (row == 6 && column % 11 < 3);
            if solid {
                let i = ((row * columns + column) * 4) as usize;
                px[i..i + 4].copy_from_slice(&[110, 80, 50, 255]);
            }
        }
    }
    TileGrid::from_rgba(columns, rows, &px, TileSize::default()).unwrap()
}

/// Run back and forth, jumping every half second.
fn input_for(tick: u64) -> InputFrame {
    let direction = if (tick / 180) % 2 == 0 {
        Action::Right
    } else {
        Action::Left
    };
    let frame = InputFrame::holding(&[direction]);
    if tick % 30 == 0 {
        frame.with_press(Action::Jump)
    } else {
        frame
    }
}

// ---------------------------------------------------------------------------
// Benchmark 1: single physics step
// ---------------------------------------------------------------------------

fn bench_single_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("physics_step");
    for columns in [16u32, 256, 4096] {
        let grid = build_level(columns);
        let config = PhysicsConfig::default();
        group.bench_with_input(BenchmarkId::from_parameter(columns), &grid, |b, grid| {
            let mut body = Body::new(Vec2::new(150.0, 100.0), Hitbox::default());
            let mut tick = 0u64;
            b.iter(|| {
                tick += 1;
                let report = step(&mut body, grid, &input_for(tick), &config, DT);
                black_box(report);
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 2: worst-case frame (240 updates)
// ---------------------------------------------------------------------------

fn bench_catch_up_frame(c: &mut Criterion) {
    let grid = build_level(256);
    let mut session = Session::new(grid, PhysicsConfig::default(), Vec2::new(150.0, 100.0));
    let mut driver = FrameDriver::new(FrameConfig::default());

    c.bench_function("frame_240_updates", |b| {
        b.iter(|| {
            let report = driver.advance(10.0, |dt| {
                let input = input_for(session.tick_count());
                session.step(&input, dt);
            });
            black_box(report);
        });
    });
}

// ---------------------------------------------------------------------------
// Benchmark 3: candidate window vs. full scan
// ---------------------------------------------------------------------------

fn bench_overlap_query(c: &mut Criterion) {
    let grid = build_level(4096);
    let probe = Rect::new(2050.5, 140.0, 11.0, 22.0);

    let mut group = c.benchmark_group("first_overlap");
    group.bench_function("candidate_window", |b| {
        b.iter(|| black_box(grid.first_overlap(black_box(&probe))));
    });
    group.bench_function("full_scan", |b| {
        b.iter(|| black_box(grid.first_overlap_exhaustive(black_box(&probe))));
    });
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 4: state hashing
// ---------------------------------------------------------------------------

fn bench_state_hash(c: &mut Criterion) {
    let mut session = Session::new(build_level(256), PhysicsConfig::default(), Vec2::new(150.0, 100.0));
    for tick in 0..120 {
        session.step(&input_for(tick), DT);
    }
    c.bench_function("session_state_hash", |b| {
        b.iter(|| black_box(session.state_hash().unwrap()));
    });
}

criterion_group!(
    benches,
    bench_single_step,
    bench_catch_up_frame,
    bench_overlap_query,
    bench_state_hash
);
criterion_main!(benches);
