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
//! Reference systems

use tracing::debug;

use crate::ecs::components::{Position, Velocity};
use crate::ecs::{System, World};
use crate::error::Result;

/// Integrates [`Velocity`] into [`Position`] with explicit Euler steps
///
/// Entities with a position but no velocity are left alone. A step that would
/// produce a non-finite position is skipped for that entity.
#[derive(Debug, Default)]
pub struct MovementSystem {
    moved_last_frame: usize,
}

impl MovementSystem {
    /// Create a new movement system
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities moved during the last update
    pub fn moved_last_frame(&self) -> usize {
        self.moved_last_frame
    }
}

impl System for MovementSystem {
    fn update(&mut self, world: &mut World, dt: f32) -> Result<()> {
        self.moved_last_frame = 0;
        if !world.is_component_registered::<Position>()
            || !world.is_component_registered::<Velocity>()
        {
            return Ok(());
        }

        let (positions, velocities) = world.components_pair_mut::<Position, Velocity>()?;
        for (entity, position) in positions.iter_mut() {
            let Ok(velocity) = velocities.get(entity) else {
                continue;
            };
            let mut next = *position;
            next.advance(velocity, dt);
            if !next.is_valid() {
                debug!(entity = %entity, "skipping non-finite movement step");
                continue;
            }
            *position = next;
            self.moved_last_frame += 1;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "movement"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::SystemOptions;

    #[test]
    fn test_moves_entities_with_velocity() {
        let mut world = World::new();
        let moving = world.create_entity();
        world.add_component(moving, Position::new(0.0, 0.0)).unwrap();
        world.add_component(moving, Velocity::new(2.0, -1.0)).unwrap();
        let still = world.create_entity();
        world.add_component(still, Position::new(5.0, 5.0)).unwrap();

        let mut system = MovementSystem::new();
        system.update(&mut world, 0.5).unwrap();

        assert_eq!(*world.get_component::<Position>(moving).unwrap(), Position::new(1.0, -0.5));
        assert_eq!(*world.get_component::<Position>(still).unwrap(), Position::new(5.0, 5.0));
        assert_eq!(system.moved_last_frame(), 1);
    }

    #[test]
    fn test_no_components_registered() {
        let mut world = World::new();
        let mut system = MovementSystem::new();
        system.update(&mut world, 1.0).unwrap();
        assert_eq!(system.moved_last_frame(), 0);
    }

    #[test]
    fn test_non_finite_step_skipped() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position::new(1.0, 1.0)).unwrap();
        world.add_component(e, Velocity::new(f32::MAX, 0.0)).unwrap();

        let mut system = MovementSystem::new();
        system.update(&mut world, f32::MAX).unwrap();
        assert_eq!(*world.get_component::<Position>(e).unwrap(), Position::new(1.0, 1.0));
    }

    #[test]
    fn test_registered_in_world() {
        let mut world = World::new();
        let id = world.register_system(MovementSystem::new(), SystemOptions::new()).unwrap();
        assert_eq!(world.systems().name_of(id).unwrap(), "movement");

        let e = world.create_entity();
        world.add_component(e, Position::zero()).unwrap();
        world.add_component(e, Velocity::new(1.0, 0.0)).unwrap();
        world.update(1.0).unwrap();
        world.update(1.0).unwrap();
        assert_eq!(world.get_component::<Position>(e).unwrap().x, 2.0);
    }
}
