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
//! World management
//!
//! The World is the central container for all ECS data. It owns the entity
//! manager, one [`ComponentArray`] per registered component type and the
//! system registry, and drives a frame with [`World::update`].
//!
//! Destroying an entity removes it from every component array before its
//! generation is bumped, then notifies the `on_destroy` hooks. Systems that
//! want to destroy entities while walking a component array queue them with
//! [`World::defer_destroy`]; the queue is applied between systems (or at the
//! end of the frame, see [`WorldConfig::flush_deferred_per_system`]).

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use tracing::{debug, error, info, trace, warn};

use crate::config::WorldConfig;
use crate::ecs::{
    Component, ComponentArray, ComponentStorage, Entity, EntityManager, System, SystemId,
    SystemOptions, SystemRegistry,
};
use crate::error::{EcsError, Result};

type DestroyHook = Box<dyn FnMut(Entity)>;

/// The main ECS world container
pub struct World {
    entities: EntityManager,
    storages: Vec<Box<dyn ComponentStorage>>,
    storage_index: HashMap<TypeId, usize>,
    systems: SystemRegistry,
    destroy_hooks: Vec<DestroyHook>,
    pending_destroy: Vec<Entity>,
    frame: u64,
    config: WorldConfig,
}

impl World {
    /// Create a new empty world with the default configuration
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a new empty world
    pub fn with_config(config: WorldConfig) -> Self {
        World {
            entities: EntityManager::with_capacity(config.entity_capacity),
            storages: Vec::new(),
            storage_index: HashMap::new(),
            systems: SystemRegistry::with_capacity(config.system_capacity),
            destroy_hooks: Vec::new(),
            pending_destroy: Vec::new(),
            frame: 0,
            config,
        }
    }

    /// Configuration the world was built with
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    // ---- entities ----

    /// Create a new entity
    ///
    /// # Panics
    ///
    /// Panics if the allocator is exhausted; see [`Self::try_create_entity`].
    pub fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    /// Create a new entity, reporting allocation failure as an error
    pub fn try_create_entity(&mut self) -> Result<Entity> {
        self.entities.try_create()
    }

    /// Destroy an entity and every component attached to it
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleHandle`] if the entity was already destroyed.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<()> {
        self.entities.validate(entity)?;

        let mut removed = 0usize;
        for storage in &mut self.storages {
            if storage.remove_entity(entity) {
                removed += 1;
            }
        }
        self.entities.destroy(entity)?;
        debug!(entity = %entity, components = removed, "removed components of destroyed entity");

        for hook in &mut self.destroy_hooks {
            hook(entity);
        }
        Ok(())
    }

    /// Check if an entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_live(entity)
    }

    /// Check if an entity is alive
    pub fn is_entity_alive(&self, entity: Entity) -> bool {
        self.is_alive(entity)
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Get an iterator over all alive entities, in slot order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// Read-only access to the entity manager
    pub fn entity_manager(&self) -> &EntityManager {
        &self.entities
    }

    /// Register a callback run after every entity destruction
    ///
    /// Hooks run in registration order, after the entity's components are gone.
    pub fn on_destroy<F>(&mut self, hook: F)
    where
        F: FnMut(Entity) + 'static,
    {
        self.destroy_hooks.push(Box::new(hook));
    }

    /// Queue `entity` for destruction at the next flush
    pub fn defer_destroy(&mut self, entity: Entity) {
        self.pending_destroy.push(entity);
    }

    /// Number of destroys waiting for the next flush
    pub fn pending_destroy_count(&self) -> usize {
        self.pending_destroy.len()
    }

    /// Apply queued destroys, returning how many entities were destroyed
    ///
    /// Handles that went stale while queued (including duplicates) are skipped.
    pub fn flush_deferred(&mut self) -> usize {
        if self.pending_destroy.is_empty() {
            return 0;
        }
        let pending = std::mem::take(&mut self.pending_destroy);
        let mut destroyed = 0;
        for entity in pending {
            match self.destroy_entity(entity) {
                Ok(()) => destroyed += 1,
                Err(err) => warn!(entity = %entity, error = %err, "skipping deferred destroy"),
            }
        }
        destroyed
    }

    /// Destroy every entity and drop all component data
    ///
    /// Handles issued before the call are stale afterwards. Destroy hooks are
    /// not called and queued destroys are discarded. Registered component types
    /// and systems are kept.
    pub fn clear(&mut self) {
        for storage in &mut self.storages {
            storage.clear();
        }
        self.entities.clear();
        self.pending_destroy.clear();
    }

    // ---- components ----

    /// Register a component type, reserving the configured capacity
    ///
    /// Registering a type twice is a no-op.
    pub fn register_component<T: Component>(&mut self) -> Result<()> {
        if self.storage_index.contains_key(&TypeId::of::<T>()) {
            return Ok(());
        }
        let mut array = ComponentArray::<T>::new();
        array.reserve(self.config.component_capacity)?;
        self.storages.try_reserve(1)?;
        self.storage_index.try_reserve(1)?;

        self.storage_index.insert(TypeId::of::<T>(), self.storages.len());
        self.storages.push(Box::new(array));
        info!(component = T::type_name(), "registered component type");
        Ok(())
    }

    /// Returns `true` if `T` has been registered
    pub fn is_component_registered<T: Component>(&self) -> bool {
        self.storage_index.contains_key(&TypeId::of::<T>())
    }

    /// Attach a component, registering its type on first use
    ///
    /// Returns the previous value if the entity already had one.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) -> Result<Option<T>> {
        self.entities.validate(entity)?;
        self.register_component::<T>()?;
        self.components_mut::<T>()?.add(entity, value)
    }

    /// Get a component of a live entity
    pub fn get_component<T: Component>(&self, entity: Entity) -> Result<&T> {
        self.entities.validate(entity)?;
        match self.storage::<T>() {
            Some(array) => array.get(entity),
            None => Err(not_found::<T>(entity)),
        }
    }

    /// Get a mutable component of a live entity
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T> {
        self.entities.validate(entity)?;
        match self.storage_mut::<T>() {
            Some(array) => array.get_mut(entity),
            None => Err(not_found::<T>(entity)),
        }
    }

    /// Detach and return a component
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<T> {
        self.entities.validate(entity)?;
        match self.storage_mut::<T>() {
            Some(array) => array.remove(entity),
            None => Err(not_found::<T>(entity)),
        }
    }

    /// Returns `true` if `entity` is alive and has a `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.is_alive(entity) && self.storage::<T>().map_or(false, |array| array.contains(entity))
    }

    /// The array holding every `T`
    pub fn components<T: Component>(&self) -> Result<&ComponentArray<T>> {
        self.storage::<T>().ok_or(EcsError::ComponentNotRegistered {
            component: T::type_name(),
        })
    }

    /// The array holding every `T`, mutably
    pub fn components_mut<T: Component>(&mut self) -> Result<&mut ComponentArray<T>> {
        self.storage_mut::<T>().ok_or(EcsError::ComponentNotRegistered {
            component: T::type_name(),
        })
    }

    /// Borrow two different component arrays mutably at once
    ///
    /// # Errors
    ///
    /// [`EcsError::AliasedComponentAccess`] if `A` and `B` are the same type,
    /// [`EcsError::ComponentNotRegistered`] if either is unknown.
    pub fn components_pair_mut<A: Component, B: Component>(
        &mut self,
    ) -> Result<(&mut ComponentArray<A>, &mut ComponentArray<B>)> {
        let a = self.slot_of::<A>()?;
        let b = self.slot_of::<B>()?;
        if a == b {
            return Err(EcsError::AliasedComponentAccess {
                component: A::type_name(),
            });
        }

        let (first, second) = if a < b {
            let (left, right) = self.storages.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.storages.split_at_mut(a);
            (&mut right[0], &mut left[b])
        };
        Ok((downcast_mut::<A>(first)?, downcast_mut::<B>(second)?))
    }

    /// Number of registered component types
    pub fn component_type_count(&self) -> usize {
        self.storages.len()
    }

    fn storage<T: Component>(&self) -> Option<&ComponentArray<T>> {
        let slot = *self.storage_index.get(&TypeId::of::<T>())?;
        self.storages[slot].as_any().downcast_ref::<ComponentArray<T>>()
    }

    fn storage_mut<T: Component>(&mut self) -> Option<&mut ComponentArray<T>> {
        let slot = *self.storage_index.get(&TypeId::of::<T>())?;
        self.storages[slot].as_any_mut().downcast_mut::<ComponentArray<T>>()
    }

    fn slot_of<T: Component>(&self) -> Result<usize> {
        self.storage_index
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(EcsError::ComponentNotRegistered {
                component: T::type_name(),
            })
    }

    // ---- systems ----

    /// Register a system; see [`SystemRegistry::register`]
    pub fn register_system<S: System + 'static>(
        &mut self,
        system: S,
        options: SystemOptions,
    ) -> Result<SystemId> {
        self.systems.register(system, options)
    }

    /// Make `system` run after `dependency`; see [`SystemRegistry::add_dependency`]
    pub fn add_system_dependency(&mut self, system: SystemId, dependency: SystemId) -> Result<()> {
        self.systems.add_dependency(system, dependency)
    }

    /// Drop a dependency edge, returning `true` if it existed
    pub fn remove_system_dependency(
        &mut self,
        system: SystemId,
        dependency: SystemId,
    ) -> Result<bool> {
        self.systems.remove_dependency(system, dependency)
    }

    /// Enable or disable a system
    pub fn set_system_enabled(&mut self, system: SystemId, enabled: bool) -> Result<()> {
        self.systems.set_enabled(system, enabled)
    }

    /// Current execution order
    pub fn system_order(&mut self) -> Result<Vec<SystemId>> {
        Ok(self.systems.sorted_order()?.to_vec())
    }

    /// The system registry
    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    /// The system registry, mutably
    pub fn systems_mut(&mut self) -> &mut SystemRegistry {
        &mut self.systems
    }

    /// Number of successfully completed updates
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run every enabled system once, in dependency order
    ///
    /// Systems registered while the frame runs join the order on the next call.
    ///
    /// # Errors
    ///
    /// [`EcsError::CyclicDependency`] before any system runs if the graph has a
    /// cycle. Otherwise the first system error aborts the frame: later systems
    /// do not run, the frame counter is not advanced and queued destroys stay
    /// queued.
    pub fn update(&mut self, dt: f32) -> Result<()> {
        let order = self.systems.sorted_order()?.to_vec();
        trace!(frame = self.frame, systems = order.len(), dt, "frame start");

        for id in order {
            if !self.systems.is_enabled(id)? {
                continue;
            }
            // Absent when update is re-entered from inside this system.
            let Some(mut system) = self.systems.take(id) else {
                continue;
            };

            let started = self.config.log_system_timings.then(Instant::now);
            let result = system.update(self, dt);
            if let Some(started) = started {
                trace!(
                    system = system.name(),
                    elapsed_us = started.elapsed().as_micros() as u64,
                    "system finished"
                );
            }
            self.systems.restore(id, system);

            if let Err(err) = result {
                let name = self.systems.name_of(id).unwrap_or("<unknown>");
                error!(system = name, id = id.raw(), frame = self.frame, error = %err, "system failed, aborting frame");
                return Err(err);
            }
            if self.config.flush_deferred_per_system {
                self.flush_deferred();
            }
        }

        self.flush_deferred();
        self.frame += 1;
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field(
                "components",
                &self.storages.iter().map(|s| s.component_name()).collect::<Vec<_>>(),
            )
            .field("systems", &self.systems)
            .field("pending_destroy", &self.pending_destroy.len())
            .field("frame", &self.frame)
            .finish()
    }
}

fn not_found<T: Component>(entity: Entity) -> EcsError {
    EcsError::ComponentNotFound {
        entity,
        component: T::type_name(),
    }
}

fn downcast_mut<T: Component>(
    storage: &mut Box<dyn ComponentStorage>,
) -> Result<&mut ComponentArray<T>> {
    storage
        .as_any_mut()
        .downcast_mut::<ComponentArray<T>>()
        .ok_or(EcsError::ComponentNotRegistered {
            component: T::type_name(),
        })
}
