//! Benchmarks for the per-frame CPU work: sort and republish.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use rand::{rngs::StdRng, SeedableRng};

use pyre::ParticleSystem;

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    let camera = Vec3::new(25.0, 10.0, 0.0);

    for count in [10usize, 1_000, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut system = ParticleSystem::new(count, StdRng::seed_from_u64(7));
            b.iter(|| system.step(black_box(0.016), black_box(camera)))
        });
    }

    group.finish();
}

fn bench_orbiting_camera(c: &mut Criterion) {
    // A moving camera reshuffles the order every frame.
    c.bench_function("step_orbiting_10k", |b| {
        let mut system = ParticleSystem::new(10_000, StdRng::seed_from_u64(7));
        let mut angle = 0.0f32;
        b.iter(|| {
            angle += 0.1;
            let camera = Vec3::new(25.0 * angle.cos(), 10.0, 25.0 * angle.sin());
            system.step(0.016, black_box(camera));
        })
    });
}

fn bench_publish(c: &mut Criterion) {
    c.bench_function("publish_buffers_10k", |b| {
        let mut system = ParticleSystem::new(10_000, StdRng::seed_from_u64(7));
        b.iter(|| system.publish_buffers())
    });
}

criterion_group!(benches, bench_step, bench_orbiting_camera, bench_publish);
criterion_main!(benches);
