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

//! Archetype storage: a signature plus a chunked table of rows.
//!
//! `Archetype::add` only ever appends to the last chunk, allocating a new
//! one once it's full. That invariant means every chunk before the last is
//! always completely full, which in turn makes `Archetype::remove` well
//! defined: removing the last chunk's last row is a plain swap-remove,
//! removing anything earlier pops the last chunk's last row and splices it
//! into the vacated slot (`Chunk::replace_from_tail`).

#[cfg(feature = "profiling")]
use tracing::trace_span;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::bitset::BitSet;
use crate::chunk::Chunk;
use crate::component::{Component, ComponentId, ComponentRegistry, MAX_BUNDLE_COMPONENTS};
use crate::entity::Entity;

/// Index of an archetype within `World`'s archetype table.
pub type ArchetypeIndex = usize;

/// Where a row landed after a structural change.
#[derive(Debug, Clone, Copy)]
pub struct RowLocation {
    pub chunk_index: u32,
    pub row_index: u32,
}

/// Reports the entity (if any) displaced by a removal, and where it now
/// lives within the same archetype.
#[derive(Debug, Clone, Copy)]
pub struct Displaced {
    pub entity: Entity,
    pub location: RowLocation,
}

/// An archetype's component signature: a `BitSet` for fast subset/fingerprint
/// tests plus a sorted id list for deterministic column iteration.
#[derive(Debug, Clone)]
pub struct Signature {
    bits: BitSet,
    sorted_ids: SmallVec<[ComponentId; MAX_BUNDLE_COMPONENTS]>,
}

impl Signature {
    pub fn empty() -> Self {
        Self {
            bits: BitSet::new(),
            sorted_ids: SmallVec::new(),
        }
    }

    pub fn from_ids(ids: &[ComponentId]) -> Self {
        let mut sorted_ids: SmallVec<[ComponentId; MAX_BUNDLE_COMPONENTS]> =
            SmallVec::from_slice(ids);
        sorted_ids.sort_unstable();
        sorted_ids.dedup();
        let mut bits = BitSet::new();
        for &id in &sorted_ids {
            bits.set(id);
        }
        Self { bits, sorted_ids }
    }

    pub fn bits(&self) -> &BitSet {
        &self.bits
    }

    pub fn ids(&self) -> &[ComponentId] {
        &self.sorted_ids
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.bits.test(id)
    }

    pub fn with_added(&self, id: ComponentId) -> Self {
        let mut ids: SmallVec<[ComponentId; MAX_BUNDLE_COMPONENTS]> = self.sorted_ids.clone();
        if !ids.contains(&id) {
            ids.push(id);
        }
        Self::from_ids(&ids)
    }

    pub fn with_removed(&self, id: ComponentId) -> Self {
        let ids: SmallVec<[ComponentId; MAX_BUNDLE_COMPONENTS]> = self
            .sorted_ids
            .iter()
            .copied()
            .filter(|&existing| existing != id)
            .collect();
        Self::from_ids(&ids)
    }
}

/// Minimum number of rows a chunk must be able to hold regardless of
/// per-component byte cost, so a very wide signature still gets a usable
/// chunk rather than one sized to zero.
const MIN_ENTITIES_PER_CHUNK: usize = 16;

fn entities_per_chunk(signature: &Signature, chunk_bytes: usize) -> usize {
    let row_bytes: usize = signature
        .ids()
        .iter()
        .map(|&id| ComponentRegistry::size_of(id).max(1))
        .sum::<usize>()
        .max(1);
    (chunk_bytes / row_bytes).max(MIN_ENTITIES_PER_CHUNK)
}

/// One component-signature bucket of entities, stored as a sequence of
/// fixed-capacity chunks plus an amortized edge cache for structural
/// transitions to neighboring archetypes.
pub struct Archetype {
    signature: Signature,
    chunks: Vec<Chunk>,
    rows_per_chunk: usize,
    len: usize,
    edge_add: FxHashMap<ComponentId, ArchetypeIndex>,
    edge_remove: FxHashMap<ComponentId, ArchetypeIndex>,
}

impl Archetype {
    pub fn new(signature: Signature, chunk_bytes: usize) -> Self {
        let rows_per_chunk = entities_per_chunk(&signature, chunk_bytes);
        Self {
            signature,
            chunks: Vec::new(),
            rows_per_chunk,
            len: 0,
            edge_add: FxHashMap::default(),
            edge_remove: FxHashMap::default(),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk(&self, index: usize) -> &Chunk {
        &self.chunks[index]
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn rows_per_chunk(&self) -> usize {
        self.rows_per_chunk
    }

    /// Register an empty column for `T`, for bundle types not already part
    /// of this archetype's signature. A no-op once the archetype has been
    /// sized: columns are only meaningful attached at chunk-allocation time,
    /// so this just documents intent — the actual column is created lazily
    /// the first time a chunk is allocated, from `self.signature`.
    pub fn register_column<T: Component>(&mut self) {
        debug_assert!(
            ComponentRegistry::id_of::<T>()
                .map(|id| self.signature.contains(id))
                .unwrap_or(false),
            "register_column called for a type not in this archetype's signature"
        );
    }

    /// Cached transition target for adding `component`, if one has been
    /// recorded before.
    pub fn edge_add(&self, component: ComponentId) -> Option<ArchetypeIndex> {
        self.edge_add.get(&component).copied()
    }

    pub fn set_edge_add(&mut self, component: ComponentId, target: ArchetypeIndex) {
        self.edge_add.insert(component, target);
    }

    pub fn edge_remove(&self, component: ComponentId) -> Option<ArchetypeIndex> {
        self.edge_remove.get(&component).copied()
    }

    pub fn set_edge_remove(&mut self, component: ComponentId, target: ArchetypeIndex) {
        self.edge_remove.insert(component, target);
    }

    fn last_chunk_has_room(&self) -> bool {
        self.chunks.last().is_some_and(|c| !c.is_full())
    }

    /// Reserve a row for `entity`, appending a new chunk if the last one is
    /// full (or none exist yet). Caller must write every column before the
    /// row is read. The returned flag tells the caller whether a new chunk
    /// was allocated, so `World` can keep its running capacity counter in
    /// sync without rescanning every archetype.
    pub fn add(&mut self, entity: Entity) -> (RowLocation, bool) {
        let allocated_chunk = !self.last_chunk_has_room();
        if allocated_chunk {
            #[cfg(feature = "profiling")]
            let _span = trace_span!("archetype.allocate_chunk", rows_per_chunk = self.rows_per_chunk).entered();
            self.chunks
                .push(Chunk::new(self.signature.ids(), self.rows_per_chunk));
        }
        let chunk_index = (self.chunks.len() - 1) as u32;
        let chunk = self.chunks.last_mut().expect("chunk just pushed");
        let row = chunk.push(entity);
        self.len += 1;
        (
            RowLocation {
                chunk_index,
                row_index: row as u32,
            },
            allocated_chunk,
        )
    }

    pub fn column_ptr_mut(&mut self, loc: RowLocation, id: ComponentId) -> Option<*mut u8> {
        self.chunks[loc.chunk_index as usize].column_ptr_mut(id, loc.row_index as usize)
    }

    pub fn get<T: 'static>(&self, loc: RowLocation, id: ComponentId) -> Option<&T> {
        self.chunks[loc.chunk_index as usize].get(id, loc.row_index as usize)
    }

    pub fn get_mut<T: 'static>(&mut self, loc: RowLocation, id: ComponentId) -> Option<&mut T> {
        self.chunks[loc.chunk_index as usize].get_mut(id, loc.row_index as usize)
    }

    pub fn has_column(&self, id: ComponentId) -> bool {
        self.signature.contains(id)
    }

    /// Copy every shared column from `(self, src_loc)` into `(dest,
    /// dest_loc)`. Used when moving an entity to a structurally different
    /// archetype: components the destination still has keep their bytes,
    /// components only in `self` are left behind for the remove step.
    pub fn copy_shared_components(&self, src_loc: RowLocation, dest: &mut Archetype, dest_loc: RowLocation) {
        let src_chunk = &self.chunks[src_loc.chunk_index as usize];
        let dst_chunk = &mut dest.chunks[dest_loc.chunk_index as usize];
        for &id in self.signature.ids() {
            if !dest.signature.contains(id) {
                continue;
            }
            let descriptor = ComponentRegistry::descriptor_of(id);
            if let (Some(src_ptr), Some(dst_ptr)) = (
                src_chunk.column_ptr(id, src_loc.row_index as usize),
                dst_chunk.column_ptr_mut(id, dest_loc.row_index as usize),
            ) {
                unsafe {
                    std::ptr::copy_nonoverlapping(src_ptr, dst_ptr, descriptor.size);
                }
            }
        }
    }

    /// Remove the row at `loc`, running destructors for every column there.
    /// Returns the entity (and its new location within this same archetype)
    /// that was displaced to fill the hole, if any, and whether the last
    /// chunk was freed as a result (for the caller's capacity bookkeeping).
    pub fn remove(&mut self, loc: RowLocation) -> (Option<Displaced>, bool) {
        self.remove_impl(loc, None)
    }

    /// Like `remove`, but skips running destructors for any column id set in
    /// `moved_out`. The caller uses this when the row's values for those
    /// columns have already been moved elsewhere by bitwise copy — a
    /// structural move to another archetype (`copy_shared_components`), or a
    /// `ptr::read` the caller took ownership of directly — so dropping them
    /// here too would double-drop.
    pub fn remove_skipping(&mut self, loc: RowLocation, moved_out: &BitSet) -> (Option<Displaced>, bool) {
        self.remove_impl(loc, Some(moved_out))
    }

    fn remove_impl(&mut self, loc: RowLocation, moved_out: Option<&BitSet>) -> (Option<Displaced>, bool) {
        let last_chunk_idx = (self.chunks.len() - 1) as u32;
        self.len -= 1;

        let displaced = if loc.chunk_index == last_chunk_idx {
            let chunk = &mut self.chunks[loc.chunk_index as usize];
            let removed = match moved_out {
                Some(mask) => chunk.swap_remove_skipping(loc.row_index as usize, mask),
                None => chunk.swap_remove(loc.row_index as usize),
            };
            removed.map(|entity| Displaced {
                entity,
                location: loc,
            })
        } else {
            let (left, right) = self.chunks.split_at_mut(last_chunk_idx as usize);
            let dest = &mut left[loc.chunk_index as usize];
            let tail = &mut right[0];
            let entity = match moved_out {
                Some(mask) => tail.replace_from_tail_skipping(dest, loc.row_index as usize, mask),
                None => tail.replace_from_tail(dest, loc.row_index as usize),
            };
            Some(Displaced {
                entity,
                location: loc,
            })
        };

        let freed_chunk = self
            .chunks
            .last()
            .is_some_and(|c| c.is_empty() && self.chunks.len() > 1);
        if freed_chunk {
            self.chunks.pop();
        }

        (displaced, freed_chunk)
    }

    /// Drop every chunk with no live rows beyond the first, reclaiming
    /// their storage. Called from bulk maintenance, not on every remove.
    pub fn trim_excess(&mut self) -> usize {
        #[cfg(feature = "profiling")]
        let _span = trace_span!("archetype.trim_excess").entered();

        let before = self.chunks.len();
        let mut kept_one_empty = false;
        self.chunks.retain(|c| {
            if !c.is_empty() {
                return true;
            }
            if !kept_one_empty {
                kept_one_empty = true;
                return true;
            }
            false
        });
        let freed = before - self.chunks.len();
        if freed > 0 {
            tracing::trace!(freed, "archetype chunks trimmed");
        }
        freed
    }

    /// Total row capacity currently allocated across all chunks (live + free).
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.rows_per_chunk
    }
}
