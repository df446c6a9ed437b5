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

//! Entity identifiers and version-checked weak references.

use std::fmt;

/// A bare entity handle: a directory index plus the id of the world that
/// issued it. Cheap, `Copy`, freely passed around — but the pair alone is
/// not safe against dangling use across id recycling. Pair it with a
/// directory-fetched version, or use [`EntityReference`], to detect staleness.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    pub id: u32,
    pub world: u16,
}

impl Entity {
    pub(crate) fn new(id: u32, world: u16) -> Self {
        Self { id, world }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}#w{})", self.id, self.world)
    }
}

/// A weak, version-validated handle to an entity.
///
/// Valid iff the directory's current version for `entity.id` equals
/// `version`; [`World::is_alive`](crate::world::World::is_alive) is the
/// authoritative check. Never an owner of entity state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EntityReference {
    pub entity: Entity,
    pub version: u32,
}

impl EntityReference {
    pub fn new(entity: Entity, version: u32) -> Self {
        Self { entity, version }
    }
}

/// Location of a live entity's row within its archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLocation {
    pub archetype: usize,
    pub chunk_index: u32,
    pub row_index: u32,
}
