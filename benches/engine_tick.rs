//! Engine Frame Benchmarks
//!
//! The engine runs inside `requestAnimationFrame`, so a tick must fit in a
//! small slice of the frame budget alongside the page's own rendering:
//!
//! ```text
//! frame_budget = 1000 / refresh_rate
//! ```
//!
//! | Refresh | Budget   |
//! |---------|----------|
//! | 60 Hz   | 16.67 ms |
//! | 120 Hz  | 8.33 ms  |
//! | 144 Hz  | 6.94 ms  |
//!
//! These benchmarks measure one tick and one strum under growing token
//! loads.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ukeflow::prelude::*;

// ============================================================================
// Constants
// ============================================================================

const REFRESH_RATES: [f64; 3] = [60.0, 120.0, 144.0];
const TEMPOS: [f64; 4] = [60.0, 90.0, 140.0, 200.0];
const LOOK_AHEAD_BEATS: [f64; 3] = [1.0, 3.0, 8.0];

// ============================================================================
// Helper Functions
// ============================================================================

fn dense_chart() -> Chart {
    CourseLibrary::standard()
        .resolve("Bb:0.5,Fmaj7:0.5,D7:0.5,Dm:0.5,G7:0.5,E7:0.5")
        .unwrap()
}

/// Create a running engine and warm it up for `warm_ms`
fn running_engine(
    bpm: f64,
    ahead: f64,
    frame_ms: f64,
    warm_ms: f64,
) -> (Engine<HeadlessRenderer>, f64) {
    let mut engine = Engine::new(HeadlessRenderer::default());
    engine.reset(
        &EngineConfig::new()
            .with_bpm(bpm)
            .with_spawn_ahead_beats(ahead)
            .with_chart(dense_chart()),
    );
    engine.start();

    let mut ts = 0.0;
    while ts < warm_ms {
        engine.tick(ts);
        ts += frame_ms;
    }
    (engine, ts)
}

// ============================================================================
// Tick Benchmarks
// ============================================================================

fn bench_tick_refresh_rate(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_refresh_rate");

    for &hz in &REFRESH_RATES {
        let frame_ms = 1000.0 / hz;
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("tick", hz as u32),
            &frame_ms,
            |b, &frame_ms| {
                let (mut engine, mut ts) = running_engine(120.0, 3.0, frame_ms, 5_000.0);
                b.iter(|| {
                    ts += frame_ms;
                    black_box(engine.tick(black_box(ts)))
                });
            },
        );
    }

    group.finish();
}

fn bench_tick_tempo(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_tempo");

    for &bpm in &TEMPOS {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("tick", bpm as u32), &bpm, |b, &bpm| {
            let (mut engine, mut ts) = running_engine(bpm, 3.0, 1000.0 / 60.0, 5_000.0);
            b.iter(|| {
                ts += 1000.0 / 60.0;
                black_box(engine.tick(black_box(ts)))
            });
        });
    }

    group.finish();
}

/// More look-ahead means more tokens on screen per tick
fn bench_tick_token_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_token_load");

    for &ahead in &LOOK_AHEAD_BEATS {
        let (engine, _) = running_engine(200.0, ahead, 1000.0 / 60.0, 10_000.0);
        let live = engine.token_count();
        group.throughput(Throughput::Elements(live.max(1) as u64));
        group.bench_with_input(BenchmarkId::new("tick", live), &ahead, |b, &ahead| {
            let (mut engine, mut ts) = running_engine(200.0, ahead, 1000.0 / 60.0, 10_000.0);
            b.iter(|| {
                ts += 1000.0 / 60.0;
                black_box(engine.tick(black_box(ts)))
            });
        });
    }

    group.finish();
}

// ============================================================================
// Input Benchmarks
// ============================================================================

fn bench_strum(c: &mut Criterion) {
    let mut group = c.benchmark_group("strum");
    group.throughput(Throughput::Elements(1));

    group.bench_function("nearest_pending", |b| {
        let (mut engine, mut ts) = running_engine(200.0, 8.0, 1000.0 / 60.0, 10_000.0);
        b.iter(|| {
            ts += 1000.0 / 60.0;
            engine.tick(ts);
            black_box(engine.handle_input(Action::Strum))
        });
    });

    group.bench_function("judge", |b| {
        b.iter(|| black_box(judge(black_box(70.0), black_box(140.0))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_tick_refresh_rate,
    bench_tick_tempo,
    bench_tick_token_load,
    bench_strum,
);
criterion_main!(benches);
