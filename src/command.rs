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

//! Deferred structural-change commands.
//!
//! The command buffer's own scheduling policy (when to flush, how to order
//! against systems) is out of scope here; this module only provides the
//! narrow contract the core needs to expose: queue a batch of structural
//! changes, then apply the whole batch inside one structural-change window.

use crate::component::Component;
use crate::entity::Entity;
use crate::error::Result;
use crate::world::World;

type WorldMutation = Box<dyn FnOnce(&mut World) -> Result<()> + Send>;

/// A single deferred structural change.
pub enum Command {
    CreateEntity(WorldMutation),
    DestroyEntity(Entity),
    AddComponent(WorldMutation),
    RemoveComponent(WorldMutation),
    SetComponent(WorldMutation),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::CreateEntity(_) => write!(f, "CreateEntity(...)"),
            Command::DestroyEntity(e) => f.debug_tuple("DestroyEntity").field(e).finish(),
            Command::AddComponent(_) => write!(f, "AddComponent(...)"),
            Command::RemoveComponent(_) => write!(f, "RemoveComponent(...)"),
            Command::SetComponent(_) => write!(f, "SetComponent(...)"),
        }
    }
}

/// Queue of pending structural changes, applied to a `World` in one batch.
#[derive(Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    /// Queue entity creation with the given bundle.
    pub fn create_entity<B>(&mut self, bundle: B)
    where
        B: crate::component::Bundle,
    {
        self.commands.push(Command::CreateEntity(Box::new(move |world| {
            world.create(bundle);
            Ok(())
        })));
    }

    pub fn destroy_entity(&mut self, entity: Entity) {
        self.commands.push(Command::DestroyEntity(entity));
    }

    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) {
        self.commands.push(Command::AddComponent(Box::new(move |world| {
            world.add(entity, component)
        })));
    }

    pub fn remove_component<T: Component>(&mut self, entity: Entity) {
        self.commands.push(Command::RemoveComponent(Box::new(move |world| {
            world.remove::<T>(entity).map(|_| ())
        })));
    }

    pub fn set_component<T: Component>(&mut self, entity: Entity, component: T) {
        self.commands.push(Command::SetComponent(Box::new(move |world| {
            world.set(entity, component)
        })));
    }

    /// Apply every queued command to `world` in order, inside a single
    /// structural-change window, then clear the buffer.
    pub fn apply(&mut self, world: &mut World) -> Result<()> {
        for command in self.commands.drain(..) {
            match command {
                Command::CreateEntity(f) => f(world)?,
                Command::DestroyEntity(entity) => world.destroy(entity)?,
                Command::AddComponent(f) => f(world)?,
                Command::RemoveComponent(f) => f(world)?,
                Command::SetComponent(f) => f(world)?,
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    #[derive(Clone, Copy)]
    struct Marker;

    #[test]
    fn buffer_tracks_length_and_clears() {
        let mut buffer = CommandBuffer::new();
        assert!(buffer.is_empty());
        buffer.destroy_entity(Entity::new(0, 0));
        assert_eq!(buffer.len(), 1);
        buffer.clear();
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn apply_runs_queued_creation() {
        let mut world = World::new(WorldConfig::default());
        let mut buffer = CommandBuffer::new();
        buffer.create_entity((Marker,));
        buffer.apply(&mut world).unwrap();
        assert_eq!(world.len(), 1);
    }
}
