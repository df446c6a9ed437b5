// Copyright 2024 Saptak Santra
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

//! Entity id allocation, version tracking, and FIFO recycling.
//!
//! Hand-rolled rather than built on `slotmap`: `Entity{id,world}` /
//! `EntityReference{entity,version}` exposes its version as a plain `u32`
//! the caller can read and compare directly, which doesn't match
//! `slotmap`'s opaque generational key encoding. This is the data structure
//! the crate actually cares about here, so it's built the way this crate
//! builds its other core structures (`BitSet`, `Chunk`) rather than reached
//! for as a dependency.

use std::collections::VecDeque;

use crate::archetype::{ArchetypeIndex, RowLocation};
use crate::entity::{Entity, EntityLocation};
use crate::error::{precondition, EcsError, Result};

#[derive(Debug, Clone, Copy)]
struct DirectorySlot {
    version: u32,
    alive: bool,
    location: EntityLocation,
}

/// An id pending reuse, queued behind every id recycled before it (FIFO),
/// so a freshly destroyed id is not handed back out immediately — giving
/// stale `EntityReference`s more time to be noticed as dead before their
/// slot index is reused.
#[derive(Debug, Clone, Copy)]
struct RecycledEntity {
    id: u32,
}

/// Owns the mapping from entity id to current location and liveness,
/// and the free list used to reuse ids after destruction.
pub struct EntityDirectory {
    world_id: u16,
    slots: Vec<DirectorySlot>,
    free_list: VecDeque<RecycledEntity>,
    live_count: u32,
}

const PLACEHOLDER_LOCATION: EntityLocation = EntityLocation {
    archetype: usize::MAX,
    chunk_index: u32::MAX,
    row_index: u32::MAX,
};

impl EntityDirectory {
    pub fn new(world_id: u16, initial_capacity: usize) -> Self {
        Self {
            world_id,
            slots: Vec::with_capacity(initial_capacity),
            free_list: VecDeque::new(),
            live_count: 0,
        }
    }

    pub fn len(&self) -> u32 {
        self.live_count
    }

    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Acquire an id for a new entity: either recycle one from the free
    /// list (its version already bumped at recycle time) or allocate a
    /// fresh slot starting at version 1.
    pub fn acquire(&mut self, location: EntityLocation) -> Result<Entity> {
        precondition!(
            (self.slots.len() as u64) < (u32::MAX as u64),
            EcsError::EntityCapacityExceeded,
            "entity directory id space exhausted"
        );

        if let Some(recycled) = self.free_list.pop_front() {
            let slot = &mut self.slots[recycled.id as usize];
            debug_assert!(!slot.alive, "recycled slot must not be alive");
            slot.alive = true;
            slot.location = location;
            self.live_count += 1;
            return Ok(Entity::new(recycled.id, self.world_id));
        }

        let id = self.slots.len() as u32;
        let capacity_before = self.slots.capacity();
        self.slots.push(DirectorySlot {
            version: 1,
            alive: true,
            location,
        });
        if self.slots.capacity() > capacity_before {
            tracing::trace!(capacity = self.slots.capacity(), "entity directory grew");
        }
        self.live_count += 1;
        Ok(Entity::new(id, self.world_id))
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.id as usize)
            .is_some_and(|slot| slot.alive)
    }

    /// Current version for `entity.id`, or `None` if the id was never
    /// allocated. Does not check liveness — callers comparing against a
    /// held `EntityReference` should also check `is_alive`.
    pub fn current_version(&self, entity: Entity) -> Option<u32> {
        self.slots.get(entity.id as usize).map(|slot| slot.version)
    }

    pub fn location(&self, entity: Entity) -> Option<EntityLocation> {
        let slot = self.slots.get(entity.id as usize)?;
        slot.alive.then_some(slot.location)
    }

    pub fn set_location(&mut self, entity: Entity, location: EntityLocation) {
        debug_assert!(self.is_alive(entity));
        if let Some(slot) = self.slots.get_mut(entity.id as usize) {
            slot.location = location;
        }
    }

    /// Update just the row half of an entity's location, for in-archetype
    /// displacement after a swap-remove or cross-chunk backfill.
    pub fn set_row_location(&mut self, entity: Entity, archetype: ArchetypeIndex, row: RowLocation) {
        self.set_location(
            entity,
            EntityLocation {
                archetype,
                chunk_index: row.chunk_index,
                row_index: row.row_index,
            },
        );
    }

    /// Mark `entity` dead and queue its id for reuse. Version is bumped
    /// immediately (wrapping) so any outstanding `EntityReference` observes
    /// staleness right away, even though the id itself is not handed back
    /// out until its turn at the front of the free list.
    pub fn recycle(&mut self, entity: Entity) -> Result<()> {
        let slot = self
            .slots
            .get_mut(entity.id as usize)
            .ok_or(EcsError::DeadEntity)?;
        precondition!(slot.alive, EcsError::DeadEntity, "entity already dead");

        slot.alive = false;
        slot.version = slot.version.wrapping_add(1);
        slot.location = PLACEHOLDER_LOCATION;
        self.live_count -= 1;
        self.free_list.push_back(RecycledEntity { id: entity.id });
        Ok(())
    }
}
