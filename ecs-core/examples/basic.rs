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
//! Basic example demonstrating the ECS structure
//!
//! Creates a world, attaches components, orders two systems by dependency and
//! runs a few frames. Set `RUST_LOG=ecs_core=debug` to see lifecycle events.

use ecs_core::ecs::components::{Position, Velocity};
use ecs_core::ecs::systems::MovementSystem;
use ecs_core::ecs::{system_fn, SystemOptions, World};
use ecs_core::{EcsError, WorldConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ecs_core=info".parse()?))
        .init();

    println!("ECS Core - Basic Example");
    println!("========================\n");

    let mut world = World::with_config(WorldConfig::from_env());

    let entity1 = world.create_entity();
    let entity2 = world.create_entity();
    let entity3 = world.create_entity();

    world.add_component(entity1, Position::new(0.0, 0.0))?;
    world.add_component(entity1, Velocity::new(1.0, 0.0))?;
    world.add_component(entity2, Position::new(5.0, 5.0))?;
    world.add_component(entity2, Velocity::new(-1.0, 1.0))?;
    world.add_component(entity3, Position::new(-3.0, 2.0))?;

    println!("Created {} entities:", world.entity_count());
    println!("  {} Position + Velocity", entity1);
    println!("  {} Position + Velocity", entity2);
    println!("  {} Position only", entity3);

    // Registered first, but declared to run after movement.
    let report = world.register_system(
        system_fn("report", |world: &mut World, _dt| {
            for (entity, pos) in world.components::<Position>()?.iter() {
                println!("    {} -> Position({:.1}, {:.1})", entity, pos.x, pos.y);
            }
            Ok(())
        }),
        SystemOptions::new(),
    )?;
    let movement = world.register_system(MovementSystem::new(), SystemOptions::new())?;
    world.add_system_dependency(report, movement)?;

    let order: Vec<&str> = world
        .system_order()?
        .into_iter()
        .map(|id| world.systems().name_of(id))
        .collect::<Result<_, EcsError>>()?;
    println!("\nSystem order: {}", order.join(" -> "));

    for frame in 1..=3 {
        println!("\n  Frame {}:", frame);
        world.update(1.0)?;
    }

    world.destroy_entity(entity2)?;
    println!("\nDestroyed {}", entity2);
    println!("Remaining entities: {}", world.entity_count());

    match world.get_component::<Position>(entity2) {
        Err(err) if err.is_not_found() => println!("Stale handle rejected: {}", err),
        other => println!("Unexpected lookup result: {:?}", other),
    }

    #[cfg(feature = "parallel")]
    println!("\n[Parallel iteration support enabled via Rayon]");

    #[cfg(not(feature = "parallel"))]
    println!("\n[Running in sequential mode]");

    Ok(())
}
