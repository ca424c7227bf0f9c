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
//! Whole-frame tests driving a world through `update`

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use ecs_core::ecs::components::{Position, Velocity};
use ecs_core::ecs::systems::MovementSystem;
use ecs_core::ecs::{system_fn, Component, Entity, SystemOptions, World};
use ecs_core::plugins::{Plugin, PluginRegistry};
use ecs_core::{EcsError, WorldConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Lifetime(f32);

impl Component for Lifetime {}

#[test]
fn test_system_moves_every_position() {
    let mut world = World::new();
    let entities: Vec<Entity> = (0..3)
        .map(|i| {
            let e = world.create_entity();
            world.add_component(e, Position::new(i as f32, 10.0)).unwrap();
            e
        })
        .collect();

    world
        .register_system(
            system_fn("shift_x", |world, _dt| {
                for (_, pos) in world.components_mut::<Position>()?.iter_mut() {
                    pos.x += 1.0;
                }
                Ok(())
            }),
            SystemOptions::new(),
        )
        .unwrap();

    world.update(1.0).unwrap();

    for (i, &e) in entities.iter().enumerate() {
        let pos = world.get_component::<Position>(e).unwrap();
        assert_eq!(pos.x, i as f32 + 1.0);
        assert_eq!(pos.y, 10.0);
    }
}

#[test]
fn test_stale_handle_after_destroy() {
    let mut world = World::new();
    let e = world.create_entity();
    world.add_component(e, Position::zero()).unwrap();
    world.destroy_entity(e).unwrap();

    assert!(matches!(
        world.add_component(e, Position::zero()),
        Err(EcsError::StaleHandle { .. })
    ));
    assert!(matches!(
        world.get_component::<Position>(e),
        Err(EcsError::StaleHandle { .. })
    ));
    assert!(matches!(
        world.remove_component::<Position>(e),
        Err(EcsError::StaleHandle { .. })
    ));

    // The recycled slot starts clean.
    let reused = world.create_entity();
    assert_eq!(reused.index(), e.index());
    assert!(!world.has_component::<Position>(reused));
}

#[test]
fn test_fail_fast_leaves_later_systems_untouched() {
    let mut world = World::new();
    let e = world.create_entity();
    world.add_component(e, Position::zero()).unwrap();
    world.add_component(e, Velocity::new(1.0, 1.0)).unwrap();

    let guard = world
        .register_system(
            system_fn("guard", |world, _| {
                if world.entity_count() > 0 {
                    return Err(EcsError::system("guard", "refusing to run"));
                }
                Ok(())
            }),
            SystemOptions::new(),
        )
        .unwrap();
    world
        .register_system(MovementSystem::new(), SystemOptions::new().after(guard))
        .unwrap();

    let err = world.update(1.0).unwrap_err();
    assert!(err.to_string().contains("refusing to run"));
    assert_eq!(*world.get_component::<Position>(e).unwrap(), Position::zero());
    assert_eq!(world.frame(), 0);

    world.set_system_enabled(guard, false).unwrap();
    world.update(1.0).unwrap();
    assert_eq!(*world.get_component::<Position>(e).unwrap(), Position::new(1.0, 1.0));
    assert_eq!(world.frame(), 1);
}

#[test]
fn test_expiry_with_deferred_destroy() {
    let mut world = World::with_config(WorldConfig::default().flush_deferred_per_frame());
    let destroyed = Rc::new(Cell::new(0));
    let counter = Rc::clone(&destroyed);
    world.on_destroy(move |_| counter.set(counter.get() + 1));

    for ttl in [0.5, 1.5, 2.5] {
        let e = world.create_entity();
        world.add_component(e, Lifetime(ttl)).unwrap();
        world.add_component(e, Position::zero()).unwrap();
    }

    world
        .register_system(
            system_fn("expire", |world, dt| {
                let mut expired = Vec::new();
                for (entity, lifetime) in world.components_mut::<Lifetime>()?.iter_mut() {
                    lifetime.0 -= dt;
                    if lifetime.0 <= 0.0 {
                        expired.push(entity);
                    }
                }
                for entity in expired {
                    world.defer_destroy(entity);
                }
                Ok(())
            }),
            SystemOptions::new(),
        )
        .unwrap();

    world.update(1.0).unwrap();
    assert_eq!(world.entity_count(), 2);
    assert_eq!(world.components::<Position>().unwrap().len(), 2);

    world.update(1.0).unwrap();
    world.update(1.0).unwrap();
    assert_eq!(world.entity_count(), 0);
    assert!(world.components::<Lifetime>().unwrap().is_empty());
    assert_eq!(destroyed.get(), 3);
}

#[test]
fn test_rejected_cycle_does_not_block_update() {
    let mut world = World::new();
    let a = world
        .register_system(system_fn("a", |_, _| Ok(())), SystemOptions::new())
        .unwrap();
    let b = world
        .register_system(system_fn("b", |_, _| Ok(())), SystemOptions::new().after(a))
        .unwrap();

    assert!(world.add_system_dependency(a, b).is_err());
    world.update(1.0).unwrap();
    assert_eq!(world.system_order().unwrap(), vec![a, b]);
}

struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn name(&self) -> &str {
        "physics"
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    fn build(&mut self, world: &mut World) -> ecs_core::Result<()> {
        world.register_component::<Position>()?;
        world.register_component::<Velocity>()?;
        world.register_system(MovementSystem::new(), SystemOptions::new())?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn test_plugin_built_world_runs() {
    let mut world = World::new();
    let mut plugins = PluginRegistry::new();
    plugins.register(Box::new(PhysicsPlugin)).unwrap();
    plugins.build_all(&mut world).unwrap();

    let e = world.create_entity();
    world.add_component(e, Position::zero()).unwrap();
    world.add_component(e, Velocity::new(0.0, 2.0)).unwrap();
    world.update(0.5).unwrap();

    assert_eq!(*world.get_component::<Position>(e).unwrap(), Position::new(0.0, 1.0));
    plugins.shutdown_all(&mut world).unwrap();
}
