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

//! Lifecycle event hooks.
//!
//! `World` holds a single `Option<Box<dyn EventSink>>` rather than a
//! pub/sub bus with typed subscriptions: every hook here only needs the
//! data relevant to the event, never `&mut World`, so there is no
//! reentrancy hazard to build a subscriber registry around. When no sink
//! is installed, call sites compile down to a `None` check the optimizer
//! removes.

use crate::component::ComponentId;
use crate::entity::Entity;

/// Receives structural-change notifications from a `World`.
///
/// Default method bodies do nothing, so implementors only override the
/// hooks they care about.
pub trait EventSink: Send + Sync {
    fn on_entity_created(&mut self, entity: Entity) {
        let _ = entity;
    }

    fn on_entity_destroyed(&mut self, entity: Entity) {
        let _ = entity;
    }

    fn on_component_added(&mut self, entity: Entity, component: ComponentId) {
        let _ = (entity, component);
    }

    fn on_component_removed(&mut self, entity: Entity, component: ComponentId) {
        let _ = (entity, component);
    }

    fn on_component_set(&mut self, entity: Entity, component: ComponentId) {
        let _ = (entity, component);
    }
}
