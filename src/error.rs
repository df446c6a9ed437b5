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

//! Error types.
//!
//! The taxonomy is intentionally narrow: precondition violations (programming
//! errors on the caller's part) and out-of-capacity failures. Contention is
//! not an error class here; the query-cache latch either grants access or
//! blocks, it never fails.

use std::fmt;

/// ECS error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsError {
    /// Operated on an entity that is not alive (stale version, or never existed).
    DeadEntity,

    /// `add::<T>` was called but the entity already carries a component of that kind.
    ComponentAlreadyPresent,

    /// `remove::<T>` / `set::<T>` was called but the entity has no component of that kind.
    ComponentNotPresent,

    /// The archetype table grew past the configured hard limit.
    ArchetypeCapacityExceeded,

    /// The entity directory could not grow to hold another live entity.
    EntityCapacityExceeded,
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::DeadEntity => write!(f, "operation on a dead entity"),
            EcsError::ComponentAlreadyPresent => write!(f, "component already present on entity"),
            EcsError::ComponentNotPresent => write!(f, "component not present on entity"),
            EcsError::ArchetypeCapacityExceeded => write!(f, "archetype table capacity exceeded"),
            EcsError::EntityCapacityExceeded => write!(f, "entity directory capacity exceeded"),
        }
    }
}

impl std::error::Error for EcsError {}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EcsError>;

/// Fails the operation with `$err`, additionally panicking in debug builds.
///
/// Precondition violations are programming errors: in a debug build this is
/// loud (an assertion), in release it still aborts the operation cleanly via
/// the `Err` return rather than crashing the process.
macro_rules! precondition {
    ($cond:expr, $err:expr, $msg:literal $(,)?) => {
        if !$cond {
            debug_assert!($cond, $msg);
            return Err($err);
        }
    };
}

pub(crate) use precondition;
