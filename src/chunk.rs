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

//! Fixed-capacity, column-major storage block.
//!
//! A `Chunk` holds up to `capacity` entities' worth of components, one
//! type-erased `Column` per component kind plus a parallel `entity` array.
//! Capacity is fixed at construction and never reallocated — this is what
//! lets an `Archetype` hand out raw pointers into a chunk's columns that
//! stay valid for the lifetime of the chunk, and what makes the
//! entities-per-chunk budget (driven by `WorldConfig::chunk_bytes`)
//! meaningful.

use rustc_hash::FxHashMap;

use crate::bitset::BitSet;
use crate::component::{ComponentId, ComponentRegistry, TypeDescriptor};
use crate::entity::Entity;

/// Type-erased, fixed-capacity column of component values.
struct Column {
    data: Box<[u8]>,
    item_size: usize,
    drop_fn: Option<unsafe fn(*mut u8)>,
}

impl Column {
    fn new(descriptor: TypeDescriptor, capacity: usize) -> Self {
        let byte_len = descriptor.size * capacity;
        Self {
            data: vec![0u8; byte_len].into_boxed_slice(),
            item_size: descriptor.size,
            drop_fn: descriptor.drop_fn,
        }
    }

    #[inline]
    unsafe fn ptr_at(&self, row: usize) -> *const u8 {
        self.data.as_ptr().add(row * self.item_size)
    }

    #[inline]
    unsafe fn ptr_mut_at(&mut self, row: usize) -> *mut u8 {
        self.data.as_mut_ptr().add(row * self.item_size)
    }

    /// Copy the raw bytes at `row` into `other`'s `row`. Both columns must
    /// hold the same component kind.
    unsafe fn copy_row_into(&self, row: usize, other: &mut Column, other_row: usize) {
        debug_assert_eq!(self.item_size, other.item_size);
        std::ptr::copy_nonoverlapping(
            self.ptr_at(row),
            other.ptr_mut_at(other_row),
            self.item_size,
        );
    }

    /// Drop the value at `row` in place, if the component kind needs drop.
    unsafe fn drop_row(&mut self, row: usize) {
        if let Some(drop_fn) = self.drop_fn {
            drop_fn(self.ptr_mut_at(row));
        }
    }
}

/// A fixed-capacity block of rows, one column per component kind in the
/// owning archetype plus a parallel entity-id array.
///
/// Rows `0..len` are live; rows beyond `len` are uninitialized bytes and
/// must never be read through `get`/`get_mut`. `push` appends, `swap_remove`
/// fills a hole with the current last row (the usual archetype-ECS removal
/// strategy), `replace_from_tail` pulls the very last row out of another
/// chunk entirely to backfill across a chunk boundary.
pub struct Chunk {
    columns: FxHashMap<ComponentId, Column>,
    entities: Box<[Entity]>,
    capacity: usize,
    len: usize,
}

impl Chunk {
    pub fn new(component_ids: &[ComponentId], capacity: usize) -> Self {
        debug_assert!(capacity > 0, "chunk capacity must be nonzero");
        let mut columns = FxHashMap::default();
        columns.reserve(component_ids.len());
        for &id in component_ids {
            let descriptor = ComponentRegistry::descriptor_of(id);
            columns.insert(id, Column::new(descriptor, capacity));
        }
        Self {
            columns,
            entities: vec![Entity::new(0, 0); capacity].into_boxed_slice(),
            capacity,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities[..self.len]
    }

    pub fn entity_at(&self, row: usize) -> Entity {
        self.entities[row]
    }

    /// Reserve the next row for `entity`. Caller must follow up by writing
    /// every column for the new row before the chunk is read again.
    pub fn push(&mut self, entity: Entity) -> usize {
        debug_assert!(!self.is_full(), "push on a full chunk");
        let row = self.len;
        self.entities[row] = entity;
        self.len += 1;
        row
    }

    pub fn get<T: 'static>(&self, id: ComponentId, row: usize) -> Option<&T> {
        let col = self.columns.get(&id)?;
        debug_assert!(row < self.len);
        Some(unsafe { &*(col.ptr_at(row) as *const T) })
    }

    pub fn get_mut<T: 'static>(&mut self, id: ComponentId, row: usize) -> Option<&mut T> {
        let col = self.columns.get_mut(&id)?;
        debug_assert!(row < self.len);
        Some(unsafe { &mut *(col.ptr_mut_at(row) as *mut T) })
    }

    pub fn column_ptr_mut(&mut self, id: ComponentId, row: usize) -> Option<*mut u8> {
        let col = self.columns.get_mut(&id)?;
        debug_assert!(row < self.len);
        Some(unsafe { col.ptr_mut_at(row) })
    }

    pub fn column_ptr(&self, id: ComponentId, row: usize) -> Option<*const u8> {
        let col = self.columns.get(&id)?;
        debug_assert!(row < self.len);
        Some(unsafe { col.ptr_at(row) })
    }

    pub fn has_column(&self, id: ComponentId) -> bool {
        self.columns.contains_key(&id)
    }

    /// Remove `row` by swapping in the current last row. Returns the entity
    /// that used to own the last row, if a swap happened (i.e. `row` was not
    /// already last).
    pub fn swap_remove(&mut self, row: usize) -> Option<Entity> {
        self.swap_remove_impl(row, None)
    }

    /// Like `swap_remove`, but skips running the destructor for any column
    /// whose id is set in `moved_out`. Used when a structural move has
    /// already bitwise-copied those columns' values elsewhere (to a
    /// destination archetype, or out via `ptr::read` for a returned
    /// component) — running their destructors here too would double-drop.
    pub fn swap_remove_skipping(&mut self, row: usize, moved_out: &BitSet) -> Option<Entity> {
        self.swap_remove_impl(row, Some(moved_out))
    }

    fn swap_remove_impl(&mut self, row: usize, moved_out: Option<&BitSet>) -> Option<Entity> {
        debug_assert!(row < self.len);
        let last = self.len - 1;
        unsafe {
            for (&id, col) in self.columns.iter_mut() {
                if !moved_out.is_some_and(|m| m.test(id)) {
                    col.drop_row(row);
                }
                if row != last {
                    let src = col.ptr_at(last);
                    let dst = col.ptr_mut_at(row);
                    std::ptr::copy_nonoverlapping(src, dst, col.item_size);
                }
            }
        }
        self.len -= 1;
        if row != last {
            self.entities[row] = self.entities[last];
            Some(self.entities[row])
        } else {
            None
        }
    }

    /// Pop the last row of `self` and copy it into `dest`'s `dest_row`,
    /// dropping whatever value currently lives there first. `dest_row` must
    /// be a row within `dest`'s live range — typically the row the caller
    /// just evicted an entity from in a cross-chunk remove. Returns the
    /// entity that moved.
    pub fn replace_from_tail(&mut self, dest: &mut Chunk, dest_row: usize) -> Entity {
        self.replace_from_tail_impl(dest, dest_row, None)
    }

    /// Like `replace_from_tail`, but skips dropping `dest`'s existing value
    /// at `dest_row` for any column id set in `moved_out` (see
    /// `swap_remove_skipping`).
    pub fn replace_from_tail_skipping(&mut self, dest: &mut Chunk, dest_row: usize, moved_out: &BitSet) -> Entity {
        self.replace_from_tail_impl(dest, dest_row, Some(moved_out))
    }

    fn replace_from_tail_impl(&mut self, dest: &mut Chunk, dest_row: usize, moved_out: Option<&BitSet>) -> Entity {
        debug_assert!(!self.is_empty());
        let last = self.len - 1;
        for (&id, src_col) in self.columns.iter() {
            if let Some(dst_col) = dest.columns.get_mut(&id) {
                unsafe {
                    if !moved_out.is_some_and(|m| m.test(id)) {
                        dst_col.drop_row(dest_row);
                    }
                    src_col.copy_row_into(last, dst_col, dest_row);
                }
            }
        }
        let entity = self.entities[last];
        dest.entities[dest_row] = entity;
        // The bytes were moved (copied) out, not dropped: clear bookkeeping
        // without running destructors, matching `Vec::pop` semantics.
        self.len -= 1;
        entity
    }

    /// Drop every live row's components without shrinking storage.
    pub fn clear(&mut self) {
        unsafe {
            for col in self.columns.values_mut() {
                for row in 0..self.len {
                    col.drop_row(row);
                }
            }
        }
        self.len = 0;
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        unsafe {
            for col in self.columns.values_mut() {
                for row in 0..self.len {
                    col.drop_row(row);
                }
            }
        }
    }
}
