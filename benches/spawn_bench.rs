#![allow(dead_code)]

use archetype_ecs::World;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

#[derive(Debug, Clone)]
struct Position(f32, f32, f32);

#[derive(Debug, Clone)]
struct Velocity(f32, f32, f32);

#[derive(Debug, Clone)]
struct Health(u32);

fn spawn_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn_bench");

    group.bench_function("create_2_components", |b| {
        let mut world = World::default();
        b.iter(|| {
            for _ in 0..1000 {
                black_box(world.create((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0))));
            }
        });
    });

    group.bench_function("create_3_components", |b| {
        let mut world = World::default();
        b.iter(|| {
            for _ in 0..1000 {
                black_box(world.create((
                    Position(1.0, 2.0, 3.0),
                    Velocity(1.0, 0.0, 0.0),
                    Health(100),
                )));
            }
        });
    });

    group.bench_function("create_mixed", |b| {
        let mut world = World::default();
        b.iter(|| {
            for i in 0..1000 {
                if i % 2 == 0 {
                    black_box(world.create((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0))));
                } else {
                    black_box(world.create((
                        Position(1.0, 2.0, 3.0),
                        Velocity(1.0, 0.0, 0.0),
                        Health(100),
                    )));
                }
            }
        });
    });

    group.bench_function("destroy_all", |b| {
        b.iter_batched(
            || {
                let mut world = World::default();
                let entities: Vec<_> = (0..1000)
                    .map(|_| world.create((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0))))
                    .collect();
                (world, entities)
            },
            |(mut world, entities)| {
                for e in entities {
                    world.destroy(e).unwrap();
                }
                black_box(world);
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, spawn_benchmark);
criterion_main!(benches);
