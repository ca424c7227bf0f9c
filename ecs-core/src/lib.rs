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
//! # ECS Core
//!
//! A sparse-set Entity Component System for games and simulations.
//!
//! ## Features
//!
//! - **Generational Entities**: recycled indices with stale-handle detection
//! - **Sparse-Set Storage**: O(1) add, remove and lookup with dense iteration
//! - **Ordered Systems**: dependency-sorted, deterministic execution each frame
//! - **Parallelization**: Optional Rayon integration for per-array iteration
//! - **Extensibility**: Plugin system bundling components and systems
//!
//! ## Example
//!
//! ```rust
//! use ecs_core::ecs::components::{Position, Velocity};
//! use ecs_core::ecs::systems::MovementSystem;
//! use ecs_core::ecs::{SystemOptions, World};
//!
//! let mut world = World::new();
//! let entity = world.create_entity();
//! world.add_component(entity, Position::new(0.0, 0.0)).unwrap();
//! world.add_component(entity, Velocity::new(1.0, 0.0)).unwrap();
//!
//! world.register_system(MovementSystem::new(), SystemOptions::new()).unwrap();
//! world.update(1.0).unwrap();
//!
//! assert_eq!(world.get_component::<Position>(entity).unwrap().x, 1.0);
//! ```

#![warn(missing_docs)]

/// Entity Component System implementation
pub mod ecs;

/// World configuration
pub mod config;

/// Error types
pub mod error;

/// Plugin system for extensibility
pub mod plugins;

pub use config::WorldConfig;
pub use ecs::{Entity, World};
pub use error::{EcsError, Result};
