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

//! Construction-time configuration for a `World`.
//!
//! This is a library, not a service: there is no config-file parsing here,
//! just the handful of knobs that affect pre-sizing and chunk layout.

/// Tuning knobs for a `World`, passed at construction.
#[derive(Debug, Clone, Copy)]
pub struct WorldConfig {
    /// Target byte budget per chunk; drives how many rows fit in one chunk
    /// for a given archetype signature.
    pub chunk_bytes: usize,

    /// Archetype table and archetype-index map are pre-sized to this many
    /// entries to avoid early resize spikes.
    pub initial_archetype_capacity: usize,

    /// Entity directory is pre-sized to this many slots.
    pub initial_entity_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: 16 * 1024,
            initial_archetype_capacity: 64,
            initial_entity_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chunk_bytes_matches_conventional_budget() {
        let config = WorldConfig::default();
        assert_eq!(config.chunk_bytes, 16 * 1024);
    }
}
