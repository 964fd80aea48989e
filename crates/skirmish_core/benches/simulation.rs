//! Simulation benchmarks for skirmish_core.
//!
//! Run with: `cargo bench -p skirmish_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use skirmish_core::prelude::*;

fn opening_skirmish() -> Simulation {
    let mut sim = Simulation::default().with_enemy_ai();
    sim.place_opening_structures();
    sim
}

/// A crowded mid-game: both factions with forty ships each near the midline.
fn crowded_skirmish() -> Simulation {
    let mut sim = opening_skirmish();
    for i in 0..40 {
        let class = UnitClass::ALL[i % UnitClass::ALL.len()];
        let y = (i as f32 - 20.0) * 0.5;
        sim.spawn_unit(class, Faction::Player, Vec2::new(-3.0, y));
        sim.spawn_unit(class, Faction::Enemy, Vec2::new(3.0, y));
    }
    sim
}

/// Runs simulation benchmarks for the skirmish_core crate.
pub fn simulation_benchmark(c: &mut Criterion) {
    c.bench_function("opening_600_ticks", |b| {
        b.iter_batched(
            opening_skirmish,
            |mut sim| {
                for _ in 0..600 {
                    black_box(sim.tick(1.0 / 60.0));
                }
                sim
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("crowded_single_tick", |b| {
        b.iter_batched(
            crowded_skirmish,
            |mut sim| black_box(sim.tick(1.0 / 60.0)),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("telemetry_snapshot", |b| {
        let sim = crowded_skirmish();
        b.iter(|| black_box(sim.telemetry()));
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
