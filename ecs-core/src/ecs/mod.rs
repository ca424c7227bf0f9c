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
//! Entity Component System (ECS) core implementation
//!
//! This module provides the foundational ECS architecture including:
//! - Generational entity handles with index recycling
//! - Sparse-set component storage with dense iteration
//! - Dependency-ordered system execution
//! - Optional parallel iteration support via Rayon

mod entity;
mod component;
pub mod graph;
mod system;
mod world;

/// Reference component types
pub mod components;

/// Reference system implementations
pub mod systems;

pub use entity::{Entity, EntityManager};
pub use component::{Component, ComponentArray, ComponentStorage};
pub use graph::topological_sort;
pub use system::{system_fn, FnSystem, System, SystemId, SystemOptions, SystemRegistry};
pub use world::World;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_creation() {
        let world = World::new();
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.systems().len(), 0);
    }

    #[test]
    fn test_entity_creation() {
        let mut world = World::new();
        let entity = world.create_entity();
        assert_eq!(world.entity_count(), 1);
        assert!(world.is_entity_alive(entity));
    }
}
