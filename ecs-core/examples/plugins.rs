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
//! Plugin example
//!
//! Two plugins: `motion` registers the transform components and movement,
//! `bounds` depends on it and wraps positions back into a square arena.

use std::any::Any;

use ecs_core::ecs::components::{Position, Velocity};
use ecs_core::ecs::systems::MovementSystem;
use ecs_core::ecs::{system_fn, SystemId, SystemOptions, World};
use ecs_core::plugins::{Plugin, PluginRegistry};
use ecs_core::register_plugin;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct MotionPlugin {
    movement: Option<SystemId>,
}

impl Plugin for MotionPlugin {
    fn name(&self) -> &str {
        "motion"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn build(&mut self, world: &mut World) -> ecs_core::Result<()> {
        world.register_component::<Position>()?;
        world.register_component::<Velocity>()?;
        self.movement = Some(world.register_system(MovementSystem::new(), SystemOptions::new())?);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct BoundsPlugin {
    half_extent: f32,
}

impl Plugin for BoundsPlugin {
    fn name(&self) -> &str {
        "bounds"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["motion"]
    }

    fn build(&mut self, world: &mut World) -> ecs_core::Result<()> {
        let half = self.half_extent;
        // Movement is registered first, so it already precedes this system.
        world.register_system(
            system_fn("wrap_bounds", move |world: &mut World, _dt| {
                for (_, pos) in world.components_mut::<Position>()?.iter_mut() {
                    if pos.x > half {
                        pos.x -= 2.0 * half;
                    } else if pos.x < -half {
                        pos.x += 2.0 * half;
                    }
                    if pos.y > half {
                        pos.y -= 2.0 * half;
                    } else if pos.y < -half {
                        pos.y += 2.0 * half;
                    }
                }
                Ok(())
            }),
            SystemOptions::new(),
        )?;
        Ok(())
    }

    fn shutdown(&mut self, world: &mut World) -> ecs_core::Result<()> {
        info!(entities = world.entity_count(), "bounds plugin shutting down");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ecs_core=info".parse()?))
        .init();

    let mut world = World::new();
    let mut plugins = PluginRegistry::new();

    // Registration order does not matter; dependencies decide the build order.
    register_plugin!(plugins, BoundsPlugin { half_extent: 10.0 })?;
    register_plugin!(plugins, MotionPlugin::default())?;
    plugins.build_all(&mut world)?;
    println!("Plugin load order: {}", plugins.load_order().join(", "));

    let movement = plugins
        .get("motion")
        .and_then(|p| p.as_any().downcast_ref::<MotionPlugin>())
        .and_then(|p| p.movement);
    println!("Movement system: {:?}", movement);

    let ball = world.create_entity();
    world.add_component(ball, Position::new(8.0, 0.0))?;
    world.add_component(ball, Velocity::new(3.0, 1.5))?;

    for frame in 1..=4 {
        world.update(1.0)?;
        let pos = world.get_component::<Position>(ball)?;
        println!("Frame {}: Position({:.1}, {:.1})", frame, pos.x, pos.y);
    }

    plugins.shutdown_all(&mut world)?;
    Ok(())
}
