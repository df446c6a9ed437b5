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

//! World: central entity and archetype storage.
//!
//! Structural calls (`create`, `add`, `remove`, `destroy`) flow
//! `World` → archetype graph → archetype (chunk pack/unpack) → entity
//! directory. Iteration flows `World` → query cache → archetype → chunk.

#[cfg(feature = "profiling")]
use tracing::trace_span;

use crate::archetype::{Archetype, ArchetypeIndex, RowLocation, Signature};
use crate::bitset::{BitSet, SpanBitSet};
use crate::command::CommandBuffer;
use crate::component::{Bundle, Component, ComponentId, ComponentRegistry, MAX_BUNDLE_COMPONENTS};
use crate::config::WorldConfig;
use crate::directory::EntityDirectory;
use crate::entity::{Entity, EntityLocation, EntityReference};
use crate::error::{precondition, EcsError, Result};
use crate::event::EventSink;
use crate::graph::ArchetypeGraph;
use crate::query::{Query, QueryCache, QueryDescription};

/// Obtain two distinct, simultaneously mutable archetype references.
fn borrow_two_mut(archetypes: &mut [Archetype], a: usize, b: usize) -> (&mut Archetype, &mut Archetype) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = archetypes.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = archetypes.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

/// The central ECS world: owns every archetype, the entity directory, the
/// archetype graph, and the query cache.
pub struct World {
    world_id: u16,
    directory: EntityDirectory,
    archetypes: Vec<Archetype>,
    graph: ArchetypeGraph,
    query_cache: QueryCache,
    config: WorldConfig,
    event_sink: Option<Box<dyn EventSink>>,
    capacity: usize,
    size: u32,
    /// Reused stack-sized backing storage for `SpanBitSet` transition
    /// probes; grows at most once per process as component ids are
    /// registered, never reallocated on a steady-state structural change.
    scratch_bits: Vec<u64>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let mut world = Self {
            world_id: 0,
            directory: EntityDirectory::new(0, config.initial_entity_capacity),
            archetypes: Vec::with_capacity(config.initial_archetype_capacity),
            graph: ArchetypeGraph::with_capacity(config.initial_archetype_capacity),
            query_cache: QueryCache::new(),
            config,
            event_sink: None,
            capacity: 0,
            size: 0,
            scratch_bits: Vec::new(),
        };
        // Bootstrap the empty archetype (entities with no components); it
        // always lives at index 0, which simplifies lookups elsewhere.
        world.get_or_create_for_signature(Signature::empty());
        world
    }

    pub fn with_event_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    pub fn set_event_sink(&mut self, sink: Option<Box<dyn EventSink>>) {
        self.event_sink = sink;
    }

    /// Number of live entities.
    pub fn len(&self) -> u32 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Total row capacity allocated across every archetype.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        entity.world == self.world_id && self.directory.is_alive(entity)
    }

    /// True iff `reference` names a currently live entity at the exact
    /// version the reference was taken at.
    pub fn is_reference_alive(&self, reference: EntityReference) -> bool {
        self.is_alive(reference.entity)
            && self.directory.current_version(reference.entity) == Some(reference.version)
    }

    fn location(&self, entity: Entity) -> Result<EntityLocation> {
        if entity.world != self.world_id {
            return Err(EcsError::DeadEntity);
        }
        self.directory.location(entity).ok_or(EcsError::DeadEntity)
    }

    fn get_or_create_for_signature(&mut self, signature: Signature) -> ArchetypeIndex {
        {
            let archetypes = &self.archetypes;
            if let Some(idx) = self
                .graph
                .lookup(&signature, |i| archetypes[i].signature())
            {
                return idx;
            }
        }
        let idx = self.archetypes.len();
        self.archetypes
            .push(Archetype::new(signature.clone(), self.config.chunk_bytes));
        self.graph.insert(&signature, idx);
        tracing::debug!(archetype = idx, components = signature.ids().len(), "archetype created");
        idx
    }

    /// Probe for an archetype one component away from `source`'s signature
    /// (`toggle` added if absent, removed if present), without allocating a
    /// new owned `Signature` — the candidate is built on a reusable scratch
    /// buffer via `SpanBitSet`. Returns `None` if no such archetype exists
    /// yet, in which case the caller falls back to `Signature::with_added`/
    /// `with_removed` to actually create one.
    fn probe_transition(&mut self, source: ArchetypeIndex, toggle: ComponentId) -> Option<ArchetypeIndex> {
        let source_bits = self.archetypes[source].signature().bits();
        let needed = source_bits.word_len().max(toggle.index() / 64 + 1);
        if self.scratch_bits.len() < needed {
            self.scratch_bits.resize(needed, 0);
        }
        let mut span = SpanBitSet::from_initialized(&mut self.scratch_bits[..needed]);
        span.copy_from(self.archetypes[source].signature().bits());
        if span.test(toggle) {
            span.clear(toggle);
        } else {
            span.set(toggle);
        }
        let fingerprint = span.fingerprint();
        let archetypes = &self.archetypes;
        self.graph
            .lookup_with(fingerprint, |idx| span.equals_owned(archetypes[idx].signature().bits()))
    }

    fn get_or_create_archetype(&mut self, ids: &[ComponentId]) -> ArchetypeIndex {
        self.get_or_create_for_signature(Signature::from_ids(ids))
    }

    fn add_to_archetype(&mut self, idx: ArchetypeIndex, entity: Entity) -> RowLocation {
        let (loc, allocated_chunk) = self.archetypes[idx].add(entity);
        if allocated_chunk {
            self.capacity += self.archetypes[idx].rows_per_chunk();
        }
        loc
    }

    fn remove_from_archetype(&mut self, idx: ArchetypeIndex, loc: RowLocation) {
        let (displaced, freed_chunk) = self.archetypes[idx].remove(loc);
        if freed_chunk {
            self.capacity -= self.archetypes[idx].rows_per_chunk();
        }
        if let Some(displaced) = displaced {
            self.directory
                .set_row_location(displaced.entity, idx, displaced.location);
        }
    }

    /// Remove the row at `loc` from `idx`, skipping destructors for every
    /// column set in `moved_out` — the columns whose bytes a structural move
    /// already bitwise-copied elsewhere (to a destination archetype's row,
    /// or out via `ptr::read` for a returned component).
    fn remove_from_archetype_skipping(&mut self, idx: ArchetypeIndex, loc: RowLocation, moved_out: &BitSet) {
        let (displaced, freed_chunk) = self.archetypes[idx].remove_skipping(loc, moved_out);
        if freed_chunk {
            self.capacity -= self.archetypes[idx].rows_per_chunk();
        }
        if let Some(displaced) = displaced {
            self.directory
                .set_row_location(displaced.entity, idx, displaced.location);
        }
    }

    /// Create a new entity carrying every component in `bundle`.
    pub fn create<B: Bundle>(&mut self, bundle: B) -> Entity {
        #[cfg(feature = "profiling")]
        let _span = trace_span!("world.create", archetype_count = self.archetypes.len()).entered();

        let ids = B::component_ids();
        let archetype_idx = self.get_or_create_archetype(&ids);
        B::register_components(&mut self.archetypes[archetype_idx]);

        // Placeholder location, corrected immediately below once we know
        // where the row actually landed.
        let placeholder = EntityLocation {
            archetype: archetype_idx,
            chunk_index: 0,
            row_index: 0,
        };
        let entity = self
            .directory
            .acquire(placeholder)
            .expect("entity capacity exceeded");

        let loc = self.add_to_archetype(archetype_idx, entity);
        self.directory.set_location(
            entity,
            EntityLocation {
                archetype: archetype_idx,
                chunk_index: loc.chunk_index,
                row_index: loc.row_index,
            },
        );

        let mut ptrs = [std::ptr::null_mut::<u8>(); MAX_BUNDLE_COMPONENTS];
        for (slot, &id) in ptrs.iter_mut().zip(ids.iter()) {
            *slot = self.archetypes[archetype_idx]
                .column_ptr_mut(loc, id)
                .expect("column registered above");
        }
        unsafe {
            bundle.write_components(&ptrs[..ids.len()]);
        }

        self.size += 1;
        if let Some(sink) = self.event_sink.as_mut() {
            sink.on_entity_created(entity);
        }
        entity
    }

    /// Destroy `entity`, dropping every component it carries and enqueuing
    /// its id for recycling.
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        let loc = self.location(entity)?;
        #[cfg(feature = "profiling")]
        let _span = trace_span!("world.destroy").entered();

        if let Some(sink) = self.event_sink.as_mut() {
            sink.on_entity_destroyed(entity);
        }

        self.remove_from_archetype(
            loc.archetype,
            RowLocation {
                chunk_index: loc.chunk_index,
                row_index: loc.row_index,
            },
        );
        self.directory.recycle(entity)?;
        self.size -= 1;
        Ok(())
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        let loc = self.location(entity).ok()?;
        let id = ComponentRegistry::id_of::<T>()?;
        self.archetypes[loc.archetype].get::<T>(
            RowLocation {
                chunk_index: loc.chunk_index,
                row_index: loc.row_index,
            },
            id,
        )
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let loc = self.location(entity).ok()?;
        let id = ComponentRegistry::id_of::<T>()?;
        self.archetypes[loc.archetype].get_mut::<T>(
            RowLocation {
                chunk_index: loc.chunk_index,
                row_index: loc.row_index,
            },
            id,
        )
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        let Ok(loc) = self.location(entity) else {
            return false;
        };
        match ComponentRegistry::id_of::<T>() {
            Some(id) => self.archetypes[loc.archetype].has_column(id),
            None => false,
        }
    }

    /// Move `entity` from its current archetype to `dest_idx`, copying every
    /// shared column, then let `init` write whatever new row content the
    /// destination signature requires but the source didn't have.
    ///
    /// `extra_taken`, if set, names one more source column whose value the
    /// caller has already read out by `ptr::read` (the component returned
    /// from `World::remove`); its destructor must not run during the source
    /// row's removal either.
    fn move_entity(
        &mut self,
        entity: Entity,
        dest_idx: ArchetypeIndex,
        extra_taken: Option<ComponentId>,
        init: impl FnOnce(&mut World, RowLocation),
    ) -> Result<()> {
        let loc = self.location(entity)?;
        let src_idx = loc.archetype;
        let src_loc = RowLocation {
            chunk_index: loc.chunk_index,
            row_index: loc.row_index,
        };

        // Every column the destination also carries gets bitwise-copied by
        // `copy_shared_components` below; the source row's removal must not
        // drop those columns again. `extra_taken` covers the one column (if
        // any) the caller already took ownership of directly.
        let mut moved_out = self.archetypes[dest_idx].signature().bits().clone();
        if let Some(id) = extra_taken {
            moved_out.set(id);
        }

        let new_loc = {
            let (src_arch, dest_arch) = borrow_two_mut(&mut self.archetypes, src_idx, dest_idx);
            let (new_loc, allocated_chunk) = dest_arch.add(entity);
            if allocated_chunk {
                self.capacity += dest_arch.rows_per_chunk();
            }
            src_arch.copy_shared_components(src_loc, dest_arch, new_loc);
            new_loc
        };

        self.directory.set_location(
            entity,
            EntityLocation {
                archetype: dest_idx,
                chunk_index: new_loc.chunk_index,
                row_index: new_loc.row_index,
            },
        );

        init(self, new_loc);

        self.remove_from_archetype_skipping(src_idx, src_loc, &moved_out);
        Ok(())
    }

    /// Add `component` to `entity`, moving it to the archetype with the
    /// extended signature. Errors if the entity already carries one.
    pub fn add<T: Component>(&mut self, entity: Entity, component: T) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = trace_span!("world.add").entered();

        let loc = self.location(entity)?;
        let id = ComponentRegistry::register::<T>();
        precondition!(
            !self.archetypes[loc.archetype].has_column(id),
            EcsError::ComponentAlreadyPresent,
            "component already present on entity"
        );

        let dest_idx = match self.archetypes[loc.archetype].edge_add(id) {
            Some(idx) => idx,
            None => {
                let idx = match self.probe_transition(loc.archetype, id) {
                    Some(idx) => idx,
                    None => {
                        let new_sig = self.archetypes[loc.archetype].signature().with_added(id);
                        self.get_or_create_for_signature(new_sig)
                    }
                };
                self.archetypes[idx].register_column::<T>();
                self.archetypes[loc.archetype].set_edge_add(id, idx);
                idx
            }
        };

        self.move_entity(entity, dest_idx, None, move |world, new_loc| {
            let ptr = world.archetypes[dest_idx]
                .column_ptr_mut(new_loc, id)
                .expect("column just created for this signature");
            unsafe {
                std::ptr::write(ptr as *mut T, component);
            }
        })?;

        if let Some(sink) = self.event_sink.as_mut() {
            sink.on_component_added(entity, id);
        }
        Ok(())
    }

    /// Remove `component` from `entity`, returning its value, moving the
    /// entity to the archetype with the shrunk signature.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Result<T> {
        #[cfg(feature = "profiling")]
        let _span = trace_span!("world.remove").entered();

        let loc = self.location(entity)?;
        let id = ComponentRegistry::id_of::<T>().ok_or(EcsError::ComponentNotPresent)?;
        precondition!(
            self.archetypes[loc.archetype].has_column(id),
            EcsError::ComponentNotPresent,
            "component not present on entity"
        );

        let src_loc = RowLocation {
            chunk_index: loc.chunk_index,
            row_index: loc.row_index,
        };
        let value = unsafe {
            std::ptr::read(
                self.archetypes[loc.archetype]
                    .column_ptr_mut(src_loc, id)
                    .expect("presence checked above") as *const T,
            )
        };

        let dest_idx = match self.archetypes[loc.archetype].edge_remove(id) {
            Some(idx) => idx,
            None => {
                let idx = match self.probe_transition(loc.archetype, id) {
                    Some(idx) => idx,
                    None => {
                        let new_sig = self.archetypes[loc.archetype].signature().with_removed(id);
                        self.get_or_create_for_signature(new_sig)
                    }
                };
                self.archetypes[loc.archetype].set_edge_remove(id, idx);
                idx
            }
        };

        self.move_entity(entity, dest_idx, Some(id), |_, _| {})?;

        if let Some(sink) = self.event_sink.as_mut() {
            sink.on_component_removed(entity, id);
        }
        Ok(value)
    }

    /// Overwrite the value of a component `entity` already carries.
    pub fn set<T: Component>(&mut self, entity: Entity, component: T) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = trace_span!("world.set").entered();

        let loc = self.location(entity)?;
        let id = ComponentRegistry::id_of::<T>().ok_or(EcsError::ComponentNotPresent)?;
        precondition!(
            self.archetypes[loc.archetype].has_column(id),
            EcsError::ComponentNotPresent,
            "component not present on entity"
        );
        let row = RowLocation {
            chunk_index: loc.chunk_index,
            row_index: loc.row_index,
        };
        let ptr = self.archetypes[loc.archetype]
            .column_ptr_mut(row, id)
            .expect("presence checked above");
        unsafe {
            std::ptr::drop_in_place(ptr as *mut T);
            std::ptr::write(ptr as *mut T, component);
        }
        if let Some(sink) = self.event_sink.as_mut() {
            sink.on_component_set(entity, id);
        }
        Ok(())
    }

    /// Resolve the archetypes matching `description`, through the cache.
    pub fn query(&self, description: &QueryDescription) -> Query<'_> {
        let matches = self.query_cache.matching(description, &self.archetypes);
        Query::new(&self.archetypes, matches)
    }

    pub fn archetype(&self, idx: ArchetypeIndex) -> &Archetype {
        &self.archetypes[idx]
    }

    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// Destroy every entity matching `description`.
    pub fn bulk_destroy(&mut self, description: &QueryDescription) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = trace_span!("world.bulk_destroy").entered();

        let matches = self.query_cache.matching(description, &self.archetypes);
        for idx in matches {
            while self.archetypes[idx].len() > 0 {
                let entity = self.archetypes[idx].chunks()[0].entities()[0];
                self.destroy(entity)?;
            }
        }
        Ok(())
    }

    /// Add `T::default()` to every entity matching `description` that
    /// doesn't already carry it.
    pub fn bulk_add<T: Component + Default>(&mut self, description: &QueryDescription) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = trace_span!("world.bulk_add").entered();

        let matches = self.query_cache.matching(description, &self.archetypes);
        for idx in matches {
            let id = ComponentRegistry::register::<T>();
            if self.archetypes[idx].has_column(id) {
                continue;
            }
            let entities: Vec<Entity> = self.archetypes[idx]
                .chunks()
                .iter()
                .flat_map(|c| c.entities().iter().copied())
                .collect();
            for entity in entities {
                self.add(entity, T::default())?;
            }
        }
        Ok(())
    }

    /// Remove `T` from every entity matching `description` that carries it.
    pub fn bulk_remove<T: Component>(&mut self, description: &QueryDescription) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = trace_span!("world.bulk_remove").entered();

        let matches = self.query_cache.matching(description, &self.archetypes);
        for idx in matches {
            let Some(id) = ComponentRegistry::id_of::<T>() else {
                continue;
            };
            if !self.archetypes[idx].has_column(id) {
                continue;
            }
            let entities: Vec<Entity> = self.archetypes[idx]
                .chunks()
                .iter()
                .flat_map(|c| c.entities().iter().copied())
                .collect();
            for entity in entities {
                self.remove::<T>(entity)?;
            }
        }
        Ok(())
    }

    /// Overwrite `T` to `value.clone()` on every entity matching
    /// `description` that already carries it.
    pub fn bulk_set<T: Component + Clone>(&mut self, description: &QueryDescription, value: T) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = trace_span!("world.bulk_set").entered();

        let matches = self.query_cache.matching(description, &self.archetypes);
        for idx in matches {
            let Some(id) = ComponentRegistry::id_of::<T>() else {
                continue;
            };
            if !self.archetypes[idx].has_column(id) {
                continue;
            }
            let entities: Vec<Entity> = self.archetypes[idx]
                .chunks()
                .iter()
                .flat_map(|c| c.entities().iter().copied())
                .collect();
            for entity in entities {
                self.set(entity, value.clone())?;
            }
        }
        Ok(())
    }

    /// Apply every command in `buffer` in order, inside one structural-change
    /// window, then clear the buffer.
    pub fn apply_commands(&mut self, buffer: &mut CommandBuffer) -> Result<()> {
        buffer.apply(self)
    }

    /// Release every archetype's empty chunks. Archetype slots themselves
    /// are never removed — their indices are load-bearing for directory
    /// locations, the archetype graph, and edge caches.
    pub fn trim_excess(&mut self) {
        #[cfg(feature = "profiling")]
        let _span = trace_span!("world.trim_excess").entered();

        self.capacity = 0;
        for archetype in &mut self.archetypes {
            archetype.trim_excess();
            self.capacity += archetype.capacity();
        }
        self.query_cache.clear();
    }

    /// Release every archetype and entity, resetting the world to empty.
    pub fn clear(&mut self) {
        self.archetypes.clear();
        self.graph = ArchetypeGraph::with_capacity(self.config.initial_archetype_capacity);
        self.directory = EntityDirectory::new(self.world_id, self.config.initial_entity_capacity);
        self.query_cache.clear();
        self.capacity = 0;
        self.size = 0;
        self.get_or_create_for_signature(Signature::empty());
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Default)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Velocity {
        dx: f32,
    }

    #[test]
    fn create_and_read_back_components() {
        let mut world = World::default();
        let e = world.create((Position { x: 1.0, y: 2.0 }, Velocity { dx: 3.0 }));
        assert_eq!(world.get::<Position>(e), Some(&Position { x: 1.0, y: 2.0 }));
        assert_eq!(world.get::<Velocity>(e), Some(&Velocity { dx: 3.0 }));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn destroy_then_recreate_bumps_version_but_reuses_id() {
        let mut world = World::default();
        let e0 = world.create((Position::default(),));
        world.destroy(e0).unwrap();
        assert!(!world.is_alive(e0));
        let e1 = world.create((Position::default(),));
        assert_eq!(e1.id, e0.id);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn add_then_remove_component_moves_between_archetypes() {
        let mut world = World::default();
        let e = world.create((Position::default(),));
        world.add(e, Velocity { dx: 5.0 }).unwrap();
        assert_eq!(world.get::<Velocity>(e), Some(&Velocity { dx: 5.0 }));
        assert_eq!(world.get::<Position>(e), Some(&Position::default()));

        let removed = world.remove::<Velocity>(e).unwrap();
        assert_eq!(removed, Velocity { dx: 5.0 });
        assert!(!world.has::<Velocity>(e));
        assert_eq!(world.get::<Position>(e), Some(&Position::default()));
    }

    #[test]
    fn add_duplicate_component_is_an_error() {
        let mut world = World::default();
        let e = world.create((Position::default(),));
        let err = world.add(e, Position { x: 9.0, y: 9.0 }).unwrap_err();
        assert_eq!(err, EcsError::ComponentAlreadyPresent);
    }

    #[test]
    fn set_on_entity_without_component_is_an_error() {
        let mut world = World::default();
        let e = world.create((Position::default(),));
        let err = world.set(e, Velocity { dx: 1.0 }).unwrap_err();
        assert_eq!(err, EcsError::ComponentNotPresent);
    }

    #[test]
    fn destroy_of_dead_entity_is_an_error() {
        let mut world = World::default();
        let e = world.create((Position::default(),));
        world.destroy(e).unwrap();
        assert_eq!(world.destroy(e), Err(EcsError::DeadEntity));
    }

    #[test]
    fn edge_cache_resolves_to_same_archetype_as_fresh_lookup() {
        let mut world = World::default();
        let e0 = world.create((Position::default(),));
        let e1 = world.create((Position::default(),));
        world.add(e0, Velocity { dx: 1.0 }).unwrap();
        world.add(e1, Velocity { dx: 2.0 }).unwrap();
        let loc0 = world.location(e0).unwrap();
        let loc1 = world.location(e1).unwrap();
        assert_eq!(loc0.archetype, loc1.archetype);
    }

    #[test]
    fn query_matches_entities_with_required_components() {
        let mut world = World::default();
        let e0 = world.create((Position::default(), Velocity { dx: 1.0 }));
        let _e1 = world.create((Position::default(),));

        let velocity_id = ComponentRegistry::register::<Velocity>();
        let desc = QueryDescription::new().with_all([velocity_id]);
        let query = world.query(&desc);
        let entities: Vec<_> = query.entities().collect();
        assert_eq!(entities, vec![e0]);
    }

    #[test]
    fn bulk_destroy_removes_every_matching_entity() {
        let mut world = World::default();
        let velocity_id = ComponentRegistry::register::<Velocity>();
        for i in 0..5 {
            world.create((Position::default(), Velocity { dx: i as f32 }));
        }
        world.create((Position::default(),));

        let desc = QueryDescription::new().with_all([velocity_id]);
        world.bulk_destroy(&desc).unwrap();
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn capacity_tracks_chunk_allocation_and_release() {
        let mut world = World::default();
        assert_eq!(world.capacity(), 0);
        let e = world.create((Position::default(),));
        assert!(world.capacity() > 0);
        world.destroy(e).unwrap();
        world.trim_excess();
        assert_eq!(world.capacity(), 0);
    }
}
