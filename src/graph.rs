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

//! Lookup from component signature to archetype index.
//!
//! Keyed by `BitSet::fingerprint()` rather than the signature itself so the
//! common-case lookup is a single hash-map probe; fingerprints can collide
//! (different signatures landing on the same `u64`), so every bucket is a
//! short list re-checked against true signature equality before being
//! trusted. No two archetypes ever share a signature.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::archetype::{ArchetypeIndex, Signature};

/// Fingerprint → archetype index lookup, collision-resolved by signature
/// equality.
#[derive(Default)]
pub struct ArchetypeGraph {
    buckets: AHashMap<u64, SmallVec<[ArchetypeIndex; 1]>>,
}

impl ArchetypeGraph {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: AHashMap::with_capacity(capacity),
        }
    }

    /// Find the archetype index whose signature equals `signature`, given a
    /// way to resolve an index back to its signature for collision checks.
    pub fn lookup<'a>(
        &self,
        signature: &Signature,
        resolve: impl Fn(ArchetypeIndex) -> &'a Signature,
    ) -> Option<ArchetypeIndex> {
        self.lookup_with(signature.bits().fingerprint(), |idx| {
            resolve(idx).bits().equals(signature.bits())
        })
    }

    /// Find the archetype index matching `fingerprint` whose bits satisfy
    /// `matches`, without requiring an owned `Signature` to probe with —
    /// the caller can test against a stack-allocated `SpanBitSet` instead.
    pub fn lookup_with(
        &self,
        fingerprint: u64,
        mut matches: impl FnMut(ArchetypeIndex) -> bool,
    ) -> Option<ArchetypeIndex> {
        let bucket = self.buckets.get(&fingerprint)?;
        bucket.iter().copied().find(|&idx| matches(idx))
    }

    /// Record that `index`'s archetype has `signature`. Caller must ensure
    /// no archetype with an equal signature is already present.
    pub fn insert(&mut self, signature: &Signature, index: ArchetypeIndex) {
        let fingerprint = signature.bits().fingerprint();
        self.buckets.entry(fingerprint).or_default().push(index);
    }
}
