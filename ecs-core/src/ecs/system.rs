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
//! System registration and dependency ordering
//!
//! Systems contain the per-frame logic that operates on components. Each
//! registered system gets a [`SystemId`] and may declare systems it must run
//! after. The [`SystemRegistry`] turns those declarations into a single
//! deterministic execution order with Kahn's algorithm, breaking ties by the
//! lowest id.
//!
//! The order is cached and only recomputed after the graph changes
//! (`clean -> dirty` on registration or dependency edits, `dirty -> clean` on a
//! successful sort).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::{info, warn};

use crate::ecs::graph::topological_sort;
use crate::ecs::World;
use crate::error::{EcsError, Result};

/// Trait for systems that operate on the ECS world
///
/// A system is called once per frame, in dependency order, with exclusive
/// access to the world. It must not keep references into the world after
/// returning.
pub trait System {
    /// Run one frame of this system
    ///
    /// # Errors
    ///
    /// Any error aborts the rest of the frame and is returned from
    /// [`World::update`].
    fn update(&mut self, world: &mut World, dt: f32) -> Result<()>;

    /// Get the name of this system for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// System built from a closure, see [`system_fn`]
pub struct FnSystem<F> {
    name: String,
    func: F,
}

impl<F> System for FnSystem<F>
where
    F: FnMut(&mut World, f32) -> Result<()>,
{
    fn update(&mut self, world: &mut World, dt: f32) -> Result<()> {
        (self.func)(world, dt)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Wrap a closure as a named [`System`]
///
/// ```
/// use ecs_core::ecs::{system_fn, SystemOptions, World};
///
/// let mut world = World::new();
/// let id = world
///     .register_system(system_fn("noop", |_world, _dt| Ok(())), SystemOptions::new())
///     .unwrap();
/// assert_eq!(world.systems().name_of(id).unwrap(), "noop");
/// ```
pub fn system_fn<F>(name: impl Into<String>, func: F) -> FnSystem<F>
where
    F: FnMut(&mut World, f32) -> Result<()>,
{
    FnSystem {
        name: name.into(),
        func,
    }
}

/// Handle to a registered system
///
/// Ids are assigned sequentially from zero in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemId(u32);

impl SystemId {
    /// Create a system id from a raw value
    pub const fn new(id: u32) -> Self {
        SystemId(id)
    }

    /// Get the raw value
    pub const fn raw(&self) -> u32 {
        self.0
    }

    fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "System({})", self.0)
    }
}

/// Registration options for a system
#[derive(Debug, Clone)]
pub struct SystemOptions {
    /// Systems that must run before this one
    pub depends_on: Vec<SystemId>,
    /// Disabled systems keep their place in the order but are skipped
    pub enabled: bool,
}

impl SystemOptions {
    /// No dependencies, enabled
    pub fn new() -> Self {
        SystemOptions {
            depends_on: Vec::new(),
            enabled: true,
        }
    }

    /// Run after `system`
    pub fn after(mut self, system: SystemId) -> Self {
        self.depends_on.push(system);
        self
    }

    /// Run after every system in `systems`
    pub fn after_all(mut self, systems: impl IntoIterator<Item = SystemId>) -> Self {
        self.depends_on.extend(systems);
        self
    }

    /// Register the system disabled
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl Default for SystemOptions {
    fn default() -> Self {
        Self::new()
    }
}

struct SystemNode {
    name: String,
    dependencies: BTreeSet<SystemId>,
    enabled: bool,
    // Empty only while the world is running this system.
    system: Option<Box<dyn System>>,
}

/// Registered systems, their dependencies and the cached execution order
pub struct SystemRegistry {
    nodes: Vec<SystemNode>,
    sorted_order: Vec<SystemId>,
    dirty: bool,
}

impl SystemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a registry with room for `capacity` systems
    pub fn with_capacity(capacity: usize) -> Self {
        SystemRegistry {
            nodes: Vec::with_capacity(capacity),
            sorted_order: Vec::with_capacity(capacity),
            dirty: false,
        }
    }

    /// Register a system
    ///
    /// Sorting is deferred until the order is next requested.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownDependency`] if any id in `options.depends_on` was
    /// never registered.
    pub fn register<S: System + 'static>(
        &mut self,
        system: S,
        options: SystemOptions,
    ) -> Result<SystemId> {
        self.register_boxed(Box::new(system), options)
    }

    /// Register an already boxed system
    pub fn register_boxed(
        &mut self,
        system: Box<dyn System>,
        options: SystemOptions,
    ) -> Result<SystemId> {
        let name = system.name().to_string();
        if let Some(&dependency) = options.depends_on.iter().find(|dep| !self.exists(**dep)) {
            return Err(EcsError::UnknownDependency {
                system: name,
                dependency,
            });
        }
        self.nodes.try_reserve(1)?;

        let id = SystemId::new(self.nodes.len() as u32);
        info!(system = %name, id = id.raw(), dependencies = ?options.depends_on, "registered system");
        self.nodes.push(SystemNode {
            name,
            dependencies: options.depends_on.into_iter().collect(),
            enabled: options.enabled,
            system: Some(system),
        });
        self.dirty = true;
        Ok(id)
    }

    /// Make `system` run after `dependency`
    ///
    /// The edge is checked immediately: if it would close a cycle it is rolled
    /// back and [`EcsError::CyclicDependency`] is returned, leaving the previous
    /// order intact.
    pub fn add_dependency(&mut self, system: SystemId, dependency: SystemId) -> Result<()> {
        if !self.exists(system) {
            return Err(EcsError::SystemNotFound { id: system });
        }
        if !self.exists(dependency) {
            return Err(EcsError::UnknownDependency {
                system: self.nodes[system.slot()].name.clone(),
                dependency,
            });
        }
        if !self.nodes[system.slot()].dependencies.insert(dependency) {
            return Ok(());
        }

        match topological_sort(&self.graph()) {
            Ok(order) => {
                self.sorted_order = order;
                self.dirty = false;
                Ok(())
            }
            Err(systems) => {
                self.nodes[system.slot()].dependencies.remove(&dependency);
                warn!(
                    system = %system,
                    dependency = %dependency,
                    cycle = ?systems,
                    "rejected dependency that would create a cycle"
                );
                Err(EcsError::CyclicDependency { systems })
            }
        }
    }

    /// Drop the edge `system -> dependency`, returning `true` if it existed
    pub fn remove_dependency(&mut self, system: SystemId, dependency: SystemId) -> Result<bool> {
        let node = self
            .nodes
            .get_mut(system.slot())
            .ok_or(EcsError::SystemNotFound { id: system })?;
        let removed = node.dependencies.remove(&dependency);
        if removed {
            self.dirty = true;
        }
        Ok(removed)
    }

    /// Execution order, recomputed if the graph changed since the last call
    ///
    /// # Errors
    ///
    /// [`EcsError::CyclicDependency`] while the graph contains a cycle. The
    /// registry stays dirty and reports the error on every call.
    pub fn sorted_order(&mut self) -> Result<&[SystemId]> {
        if self.dirty {
            let order = topological_sort(&self.graph())
                .map_err(|systems| EcsError::CyclicDependency { systems })?;
            info!(systems = order.len(), "recomputed system order");
            self.sorted_order = order;
            self.dirty = false;
        }
        Ok(&self.sorted_order)
    }

    /// Returns `true` if the cached order is out of date
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Enable or disable a system without changing the order
    pub fn set_enabled(&mut self, id: SystemId, enabled: bool) -> Result<()> {
        self.node_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// Returns whether a system runs during updates
    pub fn is_enabled(&self, id: SystemId) -> Result<bool> {
        Ok(self.node(id)?.enabled)
    }

    /// Name reported by the system at registration
    pub fn name_of(&self, id: SystemId) -> Result<&str> {
        Ok(&self.node(id)?.name)
    }

    /// Direct dependencies of a system, lowest id first
    pub fn dependencies_of(&self, id: SystemId) -> Result<Vec<SystemId>> {
        Ok(self.node(id)?.dependencies.iter().copied().collect())
    }

    /// Get the number of registered systems
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no system is registered
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Take a system out of its slot so it can borrow the world mutably
    pub(crate) fn take(&mut self, id: SystemId) -> Option<Box<dyn System>> {
        self.nodes.get_mut(id.slot()).and_then(|node| node.system.take())
    }

    /// Put a system taken with [`Self::take`] back
    pub(crate) fn restore(&mut self, id: SystemId, system: Box<dyn System>) {
        if let Some(node) = self.nodes.get_mut(id.slot()) {
            node.system = Some(system);
        }
    }

    fn exists(&self, id: SystemId) -> bool {
        id.slot() < self.nodes.len()
    }

    fn node(&self, id: SystemId) -> Result<&SystemNode> {
        self.nodes
            .get(id.slot())
            .ok_or(EcsError::SystemNotFound { id })
    }

    fn node_mut(&mut self, id: SystemId) -> Result<&mut SystemNode> {
        self.nodes
            .get_mut(id.slot())
            .ok_or(EcsError::SystemNotFound { id })
    }

    fn graph(&self) -> BTreeMap<SystemId, BTreeSet<SystemId>> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (SystemId::new(slot as u32), node.dependencies.clone()))
            .collect()
    }
}

impl Default for SystemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SystemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemRegistry")
            .field("systems", &self.nodes.iter().map(|n| &n.name).collect::<Vec<_>>())
            .field("sorted_order", &self.sorted_order)
            .field("dirty", &self.dirty)
            .finish()
    }
}
