// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Benchmarks for system ordering and frame dispatch

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use ecs_core::ecs::components::{Position, Velocity};
use ecs_core::ecs::systems::MovementSystem;
use ecs_core::ecs::{system_fn, SystemId, SystemOptions, SystemRegistry, World};

/// Registry where every system depends on the two registered before it
fn layered_registry(count: usize) -> SystemRegistry {
    let mut registry = SystemRegistry::with_capacity(count);
    let mut ids: Vec<SystemId> = Vec::with_capacity(count);
    for i in 0..count {
        let options = SystemOptions::new().after_all(ids.iter().rev().take(2).copied());
        let id = registry
            .register(system_fn(format!("system_{i}"), |_, _| Ok(())), options)
            .unwrap();
        ids.push(id);
    }
    registry
}

/// Benchmark: Full topological sort after the graph is dirtied
fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("system_sort");

    for system_count in [10usize, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*system_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(system_count),
            system_count,
            |b, &count| {
                b.iter_batched(
                    || layered_registry(count),
                    |mut registry| {
                        black_box(registry.sorted_order().unwrap().len());
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark: One frame of movement over N entities
fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_update");

    for entity_count in [1000u32, 10000, 100000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(entity_count),
            entity_count,
            |b, &count| {
                let mut world = World::new();
                for i in 0..count {
                    let e = world.create_entity();
                    world.add_component(e, Position::new(i as f32, 0.0)).unwrap();
                    if i % 2 == 0 {
                        world.add_component(e, Velocity::new(1.0, 0.5)).unwrap();
                    }
                }
                world
                    .register_system(MovementSystem::new(), SystemOptions::new())
                    .unwrap();

                b.iter(|| world.update(black_box(0.016)).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_sort, bench_frame);
criterion_main!(benches);
