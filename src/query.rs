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

//! Query description, archetype-list cache, and iteration primitives.
//!
//! A `Query` doesn't fetch typed components itself — a chunk hands back raw
//! component access by `ComponentId` (`Chunk::get`/`get_mut`), and it's the
//! caller's job to turn that into the concrete type via the registry,
//! exactly as a chunk's own contract says. This module is only responsible
//! for turning a `QueryDescription` into the matching archetype list and
//! walking it by archetype, by chunk, or by entity.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::archetype::{Archetype, ArchetypeIndex};
use crate::bitset::BitSet;
use crate::chunk::Chunk;
use crate::component::ComponentId;
use crate::entity::Entity;

/// Four component sets describing which archetypes a query matches.
///
/// `All ⊆ S`, `Any = ∅ ∨ Any ∩ S ≠ ∅`, `None ∩ S = ∅`, `Exclusive = ∅ ∨
/// Exclusive = S`, where `S` is a candidate archetype's signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryDescription {
    all: BitSet,
    any: BitSet,
    none: BitSet,
    exclusive: BitSet,
}

impl QueryDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_all(mut self, ids: impl IntoIterator<Item = ComponentId>) -> Self {
        for id in ids {
            self.all.set(id);
        }
        self
    }

    pub fn with_any(mut self, ids: impl IntoIterator<Item = ComponentId>) -> Self {
        for id in ids {
            self.any.set(id);
        }
        self
    }

    pub fn with_none(mut self, ids: impl IntoIterator<Item = ComponentId>) -> Self {
        for id in ids {
            self.none.set(id);
        }
        self
    }

    pub fn with_exclusive(mut self, ids: impl IntoIterator<Item = ComponentId>) -> Self {
        for id in ids {
            self.exclusive.set(id);
        }
        self
    }

    pub fn matches(&self, signature: &BitSet) -> bool {
        if !self.all.is_subset_of(signature) {
            return false;
        }
        if !self.any.is_empty() && !self.any.intersects(signature) {
            return false;
        }
        if self.none.intersects(signature) {
            return false;
        }
        if !self.exclusive.is_empty() && !self.exclusive.equals(signature) {
            return false;
        }
        true
    }
}

struct CachedMatches {
    archetypes: Vec<ArchetypeIndex>,
    seen_archetypes: usize,
}

impl CachedMatches {
    fn build(description: &QueryDescription, archetypes: &[Archetype]) -> Self {
        let matched = archetypes
            .iter()
            .enumerate()
            .filter_map(|(idx, arch)| description.matches(arch.signature().bits()).then_some(idx))
            .collect();
        Self {
            archetypes: matched,
            seen_archetypes: archetypes.len(),
        }
    }

    /// Re-check only archetypes created since the last lookup: a newly
    /// created archetype only needs to be visible to iteration that starts
    /// after its creation, not retroactively to a cache snapshot already in
    /// flight.
    fn refresh(&mut self, description: &QueryDescription, archetypes: &[Archetype]) {
        let total = archetypes.len();
        if total > self.seen_archetypes {
            for (idx, arch) in archetypes.iter().enumerate().skip(self.seen_archetypes) {
                if description.matches(arch.signature().bits()) {
                    self.archetypes.push(idx);
                }
            }
            self.seen_archetypes = total;
        }
    }
}

/// The shared reader/writer latch over the query cache: many concurrent
/// readers are allowed while no structural change runs, and the cache is
/// only write-locked when a new entry must be inserted.
#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<FxHashMap<QueryDescription, CachedMatches>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the archetype indices matching `description`, using and
    /// maintaining the cache.
    ///
    /// The common case — no archetype created since this entry was last
    /// seen — is a read lock only, so concurrent queries against a
    /// quiescent archetype table never block each other. A write lock is
    /// only taken when new archetypes need to be folded in, or for a
    /// first-time lookup.
    pub fn matching(&self, description: &QueryDescription, archetypes: &[Archetype]) -> Vec<ArchetypeIndex> {
        {
            let entries = self.entries.read();
            if let Some(cached) = entries.get(description) {
                if cached.seen_archetypes == archetypes.len() {
                    return cached.archetypes.clone();
                }
            }
        }
        let mut entries = self.entries.write();
        if let Some(cached) = entries.get_mut(description) {
            cached.refresh(description, archetypes);
            return cached.archetypes.clone();
        }
        let cached = CachedMatches::build(description, archetypes);
        let result = cached.archetypes.clone();
        entries.insert(description.clone(), cached);
        result
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

/// A read-only view over the archetypes and entities matching a
/// [`QueryDescription`], snapshotted at construction time.
pub struct Query<'w> {
    archetypes: &'w [Archetype],
    matches: Vec<ArchetypeIndex>,
}

impl<'w> Query<'w> {
    pub(crate) fn new(archetypes: &'w [Archetype], matches: Vec<ArchetypeIndex>) -> Self {
        Self { archetypes, matches }
    }

    pub fn archetype_indices(&self) -> &[ArchetypeIndex] {
        &self.matches
    }

    /// Iterate matching archetypes.
    pub fn archetypes(&self) -> impl Iterator<Item = &'w Archetype> + '_ {
        self.matches.iter().map(move |&idx| &self.archetypes[idx])
    }

    /// Iterate matching chunks, yielding each chunk alongside its live row count.
    pub fn chunks(&self) -> impl Iterator<Item = (&'w Chunk, usize)> + '_ {
        self.archetypes()
            .flat_map(|arch| arch.chunks().iter().map(|chunk| (chunk, chunk.len())))
    }

    /// Iterate every matching entity, one at a time.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.chunks().flat_map(|(chunk, _)| chunk.entities().iter().copied())
    }

    pub fn entity_count(&self) -> usize {
        self.archetypes().map(|arch| arch.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::Signature;
    use crate::component::ComponentRegistry;

    struct A;
    struct B;
    struct C;

    fn setup() -> (ComponentId, ComponentId, ComponentId, Vec<Archetype>) {
        let a = ComponentRegistry::register::<A>();
        let b = ComponentRegistry::register::<B>();
        let c = ComponentRegistry::register::<C>();
        let archetypes = vec![
            Archetype::new(Signature::from_ids(&[a]), 4096),
            Archetype::new(Signature::from_ids(&[a, b]), 4096),
            Archetype::new(Signature::from_ids(&[a, b, c]), 4096),
            Archetype::new(Signature::from_ids(&[c]), 4096),
        ];
        (a, b, c, archetypes)
    }

    #[test]
    fn all_filter_requires_subset() {
        let (a, b, _c, archetypes) = setup();
        let desc = QueryDescription::new().with_all([a, b]);
        let cache = QueryCache::new();
        let mut matches = cache.matching(&desc, &archetypes);
        matches.sort_unstable();
        assert_eq!(matches, vec![1, 2]);
    }

    #[test]
    fn none_filter_excludes_archetypes_with_that_component() {
        let (a, _b, c, archetypes) = setup();
        let desc = QueryDescription::new().with_all([a]).with_none([c]);
        let cache = QueryCache::new();
        let mut matches = cache.matching(&desc, &archetypes);
        matches.sort_unstable();
        assert_eq!(matches, vec![0, 1]);
    }

    #[test]
    fn exclusive_filter_requires_exact_signature() {
        let (a, b, _c, archetypes) = setup();
        let desc = QueryDescription::new().with_exclusive([a, b]);
        let cache = QueryCache::new();
        assert_eq!(cache.matching(&desc, &archetypes), vec![1]);
    }

    #[test]
    fn cache_picks_up_archetypes_created_after_first_lookup() {
        let (a, _b, _c, mut archetypes) = setup();
        let desc = QueryDescription::new().with_all([a]);
        let cache = QueryCache::new();
        let first = cache.matching(&desc, &archetypes);
        assert_eq!(first.len(), 3);

        let new_sig = Signature::from_ids(&[a]);
        archetypes.push(Archetype::new(new_sig, 4096));
        let second = cache.matching(&desc, &archetypes);
        assert_eq!(second.len(), 4);
    }
}
