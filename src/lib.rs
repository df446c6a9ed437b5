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

//! Archetype ECS - a data-oriented entity component system core.
//!
//! Entities are grouped by their exact component set into archetypes, each
//! stored as a sequence of fixed-capacity, column-major chunks. Structural
//! changes (create/destroy entity, add/remove component) move rows between
//! archetypes along a cached edge graph; queries resolve against the
//! archetype table through a latched cache so concurrent read-only iteration
//! never blocks on concurrent structural changes to unrelated archetypes.
//!
//! Command buffers and event dispatch are layered on top of this core
//! rather than baked into it — see [`command`] and [`event`] for the narrow
//! surfaces the core exposes to them. Scheduling policy (when systems run,
//! in what order) is deliberately out of scope.

pub mod archetype;
pub mod bitset;
pub mod chunk;
pub mod command;
pub mod component;
pub mod config;
pub mod directory;
pub mod entity;
pub mod error;
pub mod event;
pub mod graph;
pub mod query;
pub mod world;

pub mod prelude;

pub use archetype::{Archetype, ArchetypeIndex};
pub use command::{Command, CommandBuffer};
pub use component::{Bundle, Component, ComponentId, ComponentRegistry};
pub use config::WorldConfig;
pub use entity::{Entity, EntityReference};
pub use error::{EcsError, Result};
pub use event::EventSink;
pub use query::{Query, QueryDescription};
pub use world::World;
