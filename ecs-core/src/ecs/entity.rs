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
//! Entity management
//!
//! Entities are lightweight `{index, generation}` handles. The
//! [`EntityManager`] hands them out, recycles freed indices through a free
//! list, and bumps a slot's generation on every destroy so that outstanding
//! handles to the old occupant become stale.

use std::fmt;

use tracing::debug;

use crate::error::{EcsError, Result};

/// Generational entity handle
///
/// Two handles are equal iff both the index and the generation match. A handle
/// carries no data; it is a key into component storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Sentinel handle that is never issued by an [`EntityManager`]
    pub const INVALID: Entity = Entity {
        index: u32::MAX,
        generation: u32::MAX,
    };

    /// Create a handle from raw parts
    pub const fn new(index: u32, generation: u32) -> Self {
        Entity { index, generation }
    }

    /// Slot index of this handle
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation the slot had when this handle was issued
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Returns `false` for the reserved sentinel index
    pub const fn is_valid(&self) -> bool {
        self.index != u32::MAX
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}, gen: {})", self.index, self.generation)
    }
}

/// Issues, recycles and validates entity handles
///
/// `generations[i]` is the current generation of slot `i`; a handle is live iff
/// its generation equals that value and the slot is not on the free list.
#[derive(Debug, Default)]
pub struct EntityManager {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_list: Vec<u32>,
    live_count: u32,
}

impl EntityManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with room for `capacity` slots before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        EntityManager {
            generations: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live_count: 0,
        }
    }

    /// Issue a new handle, reusing a freed index when one is available
    ///
    /// # Panics
    ///
    /// Panics if the allocator is exhausted; see [`Self::try_create`].
    pub fn create(&mut self) -> Entity {
        match self.try_create() {
            Ok(entity) => entity,
            Err(err) => panic!("entity allocation failed: {err}"),
        }
    }

    /// Issue a new handle, reporting allocator exhaustion as an error
    pub fn try_create(&mut self) -> Result<Entity> {
        if let Some(index) = self.free_list.pop() {
            let slot = index as usize;
            self.alive[slot] = true;
            self.live_count += 1;
            let entity = Entity::new(index, self.generations[slot]);
            debug!(entity = %entity, "recycled entity slot");
            return Ok(entity);
        }

        let index = self.generations.len();
        if index >= u32::MAX as usize {
            return Err(EcsError::EntityLimitReached);
        }
        self.generations.try_reserve(1)?;
        self.alive.try_reserve(1)?;
        self.free_list.try_reserve(self.generations.len() + 1 - self.free_list.len())?;

        self.generations.push(0);
        self.alive.push(true);
        self.live_count += 1;
        let entity = Entity::new(index as u32, 0);
        debug!(entity = %entity, "allocated entity slot");
        Ok(entity)
    }

    /// Destroy a live handle
    ///
    /// Increments the slot generation so every outstanding copy of `entity`
    /// becomes stale, then recycles the index.
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        self.validate(entity)?;
        let slot = entity.index as usize;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.alive[slot] = false;
        // Capacity for every slot was reserved in try_create, so this never reallocates.
        self.free_list.push(entity.index);
        self.live_count -= 1;
        debug!(entity = %entity, next_generation = self.generations[slot], "destroyed entity");
        Ok(())
    }

    /// Returns `true` iff `entity` refers to the current occupant of its slot
    pub fn is_live(&self, entity: Entity) -> bool {
        let slot = entity.index as usize;
        slot < self.generations.len()
            && self.alive[slot]
            && self.generations[slot] == entity.generation
    }

    /// Fail with [`EcsError::StaleHandle`] unless `entity` is live
    pub fn validate(&self, entity: Entity) -> Result<()> {
        if !entity.is_valid() {
            return Err(EcsError::InvalidHandle { entity });
        }
        if self.is_live(entity) {
            Ok(())
        } else {
            Err(EcsError::StaleHandle { entity })
        }
    }

    /// Current generation of `index`, if the slot has ever been allocated
    pub fn generation_of(&self, index: u32) -> Option<u32> {
        self.generations.get(index as usize).copied()
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.live_count as usize
    }

    /// Returns `true` if no entity is live
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Number of slots ever allocated (live plus recyclable)
    pub fn capacity(&self) -> usize {
        self.generations.len()
    }

    /// Live handles in slot order
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.generations
            .iter()
            .zip(self.alive.iter())
            .enumerate()
            .filter(|(_, (_, &alive))| alive)
            .map(|(index, (&generation, _))| Entity::new(index as u32, generation))
    }

    /// Destroy every live entity
    ///
    /// Slots are kept and recycled, so handles issued before the call are all
    /// stale afterwards.
    pub fn clear(&mut self) {
        let live: Vec<Entity> = self.iter().collect();
        for entity in live {
            let slot = entity.index as usize;
            self.generations[slot] = self.generations[slot].wrapping_add(1);
            self.alive[slot] = false;
            self.free_list.push(entity.index);
        }
        self.live_count = 0;
    }
}
