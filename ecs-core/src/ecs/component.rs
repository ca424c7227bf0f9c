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
//! Component storage and management
//!
//! Components are plain data attached to entities. Each component type lives
//! in its own [`ComponentArray`], a sparse set that keeps the data densely
//! packed for cache-friendly iteration while still giving O(1) insert,
//! removal and lookup by entity.
//!
//! # Memory Layout
//!
//! ```text
//! sparse:   [ 1, -, 0, -, 2 ]           indexed by Entity::index()
//!                  |
//! dense:    [ c2, c0, c4 ]              packed component values
//! entities: [ e2, e0, e4 ]              owner of each dense slot
//! ```
//!
//! # Ordering
//!
//! Iteration walks the dense array in physical order. That order is insertion
//! order until the first removal: [`ComponentArray::remove`] moves the last
//! element into the hole (swap-remove), so the order of the remaining
//! elements changes. This is the price of O(1) removal and is expected
//! behaviour, not a bug.
//!
//! # Borrowing
//!
//! References returned by [`ComponentArray::get`], [`ComponentArray::get_mut`]
//! and the iterators borrow the array, so the compiler rejects any add or
//! remove while they are alive. To drop components while walking the array
//! use [`ComponentArray::retain`].

use std::any::Any;
use std::mem;

use crate::ecs::Entity;
use crate::error::{EcsError, Result};

/// Sparse slot value meaning "no component"
const EMPTY: u32 = u32::MAX;

/// Trait that all components must implement
///
/// Components should be plain data structures without behavior.
/// Keep components small and focused for better cache performance.
pub trait Component: 'static + Send + Sync {
    /// Human-readable name used in errors and logs
    fn type_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

/// Sparse-set storage for one component type
///
/// Invariants, checked in debug builds for the slots each change touches:
/// - `dense.len() == entities.len()`
/// - for every slot `i`, `sparse[entities[i].index()] == i`
///
/// # Memory
///
/// The sparse vector is indexed by [`Entity::index`], so its size follows the
/// highest index ever stored rather than the number of components. Handles
/// from an [`EntityManager`](crate::ecs::EntityManager) stay dense. A
/// hand-made handle with a huge index makes the array allocate and fill
/// `4 * (index + 1)` bytes.
#[derive(Debug)]
pub struct ComponentArray<T: Component> {
    sparse: Vec<u32>,
    dense: Vec<T>,
    entities: Vec<Entity>,
}

impl<T: Component> ComponentArray<T> {
    /// Create an empty array
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an array with room for `capacity` components
    pub fn with_capacity(capacity: usize) -> Self {
        ComponentArray {
            sparse: Vec::with_capacity(capacity),
            dense: Vec::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
        }
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if no component is stored
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Reserve room for `additional` more components
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.dense.try_reserve(additional)?;
        self.entities.try_reserve(additional)?;
        Ok(())
    }

    /// Attach `value` to `entity`
    ///
    /// If the entity already has a component in this array the value is
    /// overwritten in place and the previous value is returned. The array does
    /// not consult the entity manager; callers validate liveness first.
    ///
    /// A component left behind by an older generation of the same index is
    /// dropped and replaced, returning `None`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidHandle`] for [`Entity::INVALID`]
    /// - [`EcsError::StaleHandle`] if a newer generation of the index owns the slot
    /// - [`EcsError::OutOfMemory`] if storage cannot grow
    pub fn add(&mut self, entity: Entity, value: T) -> Result<Option<T>> {
        if !entity.is_valid() {
            return Err(EcsError::InvalidHandle { entity });
        }

        let index = entity.index() as usize;
        if let Some(&slot) = self.sparse.get(index) {
            if slot != EMPTY {
                let slot = slot as usize;
                let owner = self.entities[slot];
                if owner == entity {
                    return Ok(Some(mem::replace(&mut self.dense[slot], value)));
                }
                if !is_newer_generation(entity.generation(), owner.generation()) {
                    return Err(EcsError::StaleHandle { entity });
                }
                self.entities[slot] = entity;
                self.dense[slot] = value;
                self.debug_check_slot(slot);
                return Ok(None);
            }
        }

        if index >= self.sparse.len() {
            self.sparse.try_reserve(index + 1 - self.sparse.len())?;
            self.sparse.resize(index + 1, EMPTY);
        }
        self.reserve(1)?;

        let slot = self.dense.len();
        self.sparse[index] = slot as u32;
        self.dense.push(value);
        self.entities.push(entity);
        self.debug_check_slot(slot);
        Ok(None)
    }

    /// Detach and return the component of `entity`
    ///
    /// The last dense element is moved into the freed slot, so iteration order
    /// of the remaining components changes.
    pub fn remove(&mut self, entity: Entity) -> Result<T> {
        let slot = self.slot_of(entity)?;
        let last = self.dense.len() - 1;

        let value = self.dense.swap_remove(slot);
        self.entities.swap_remove(slot);
        if slot != last {
            let moved = self.entities[slot];
            self.sparse[moved.index() as usize] = slot as u32;
            self.debug_check_slot(slot);
        }
        self.sparse[entity.index() as usize] = EMPTY;

        debug_assert_eq!(self.dense.len(), self.entities.len());
        Ok(value)
    }

    /// Shared reference to the component of `entity`
    pub fn get(&self, entity: Entity) -> Result<&T> {
        let slot = self.slot_of(entity)?;
        Ok(&self.dense[slot])
    }

    /// Mutable reference to the component of `entity`
    ///
    /// The borrow ends before the array can be structurally modified again.
    pub fn get_mut(&mut self, entity: Entity) -> Result<&mut T> {
        let slot = self.slot_of(entity)?;
        Ok(&mut self.dense[slot])
    }

    /// Returns `true` if `entity` has a component in this array
    pub fn contains(&self, entity: Entity) -> bool {
        self.slot_of(entity).is_ok()
    }

    /// `(entity, &component)` pairs in dense order
    ///
    /// Each call starts a fresh pass.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.entities.iter().copied().zip(self.dense.iter())
    }

    /// `(entity, &mut component)` pairs in dense order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        self.entities.iter().copied().zip(self.dense.iter_mut())
    }

    /// Owning entities in dense order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Dense component slice
    ///
    /// Systems that only need the data can walk this directly.
    pub fn components(&self) -> &[T] {
        &self.dense
    }

    /// Mutable dense component slice
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.dense
    }

    /// Keep only the components for which `keep` returns `true`
    ///
    /// Every component is visited exactly once. Rejected components are
    /// swap-removed immediately, so the callback may see elements out of
    /// insertion order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Entity, &mut T) -> bool,
    {
        let mut slot = 0;
        while slot < self.dense.len() {
            let entity = self.entities[slot];
            if keep(entity, &mut self.dense[slot]) {
                slot += 1;
                continue;
            }
            // The element swapped into `slot` has not been visited yet.
            let last = self.dense.len() - 1;
            self.dense.swap_remove(slot);
            self.entities.swap_remove(slot);
            if slot != last {
                let moved = self.entities[slot];
                self.sparse[moved.index() as usize] = slot as u32;
                self.debug_check_slot(slot);
            }
            self.sparse[entity.index() as usize] = EMPTY;
        }
        debug_assert_eq!(self.dense.len(), self.entities.len());
    }

    /// Apply `f` to every component on the Rayon thread pool
    ///
    /// Only component data is touched, so this is safe to call from inside a
    /// single system.
    #[cfg(feature = "parallel")]
    pub fn par_for_each_mut<F>(&mut self, f: F)
    where
        F: Fn(Entity, &mut T) + Send + Sync,
    {
        use rayon::prelude::*;

        self.entities
            .par_iter()
            .zip(self.dense.par_iter_mut())
            .for_each(|(&entity, component)| f(entity, component));
    }

    /// Remove every component
    pub fn clear(&mut self) {
        self.sparse.clear();
        self.dense.clear();
        self.entities.clear();
    }

    fn slot_of(&self, entity: Entity) -> Result<usize> {
        if !entity.is_valid() {
            return Err(EcsError::InvalidHandle { entity });
        }
        match self.sparse.get(entity.index() as usize) {
            Some(&slot) if slot != EMPTY && self.entities[slot as usize] == entity => {
                Ok(slot as usize)
            }
            _ => Err(EcsError::ComponentNotFound {
                entity,
                component: T::type_name(),
            }),
        }
    }

    fn debug_check_slot(&self, slot: usize) {
        debug_assert_eq!(self.dense.len(), self.entities.len());
        debug_assert_eq!(self.sparse[self.entities[slot].index() as usize] as usize, slot);
    }

    /// Walk every slot and assert both invariants
    #[cfg(test)]
    fn assert_consistent(&self) {
        assert_eq!(self.dense.len(), self.entities.len());
        for (slot, entity) in self.entities.iter().enumerate() {
            assert_eq!(self.sparse[entity.index() as usize] as usize, slot);
        }
        let occupied = self.sparse.iter().filter(|&&slot| slot != EMPTY).count();
        assert_eq!(occupied, self.dense.len());
    }
}

/// `true` if `candidate` was issued after `current` for the same index
///
/// Generations wrap, so the comparison is done on the wrapped distance.
fn is_newer_generation(candidate: u32, current: u32) -> bool {
    let distance = candidate.wrapping_sub(current);
    distance != 0 && distance < 1 << 31
}

impl<T: Component> Default for ComponentArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a [`ComponentArray`]
///
/// The world keeps one boxed storage per component type and uses this trait
/// to cascade entity destruction without knowing the concrete types.
pub trait ComponentStorage: Any {
    /// Name of the stored component type
    fn component_name(&self) -> &'static str;

    /// Drop the component of `entity`, returning `true` if one existed
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Returns `true` if `entity` has a component here
    fn contains_entity(&self, entity: Entity) -> bool;

    /// Number of stored components
    fn len(&self) -> usize;

    /// Returns `true` if no component is stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every component
    fn clear(&mut self);

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ComponentStorage for ComponentArray<T> {
    fn component_name(&self) -> &'static str {
        T::type_name()
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_ok()
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn len(&self) -> usize {
        ComponentArray::len(self)
    }

    fn clear(&mut self) {
        ComponentArray::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
