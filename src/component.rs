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

//! Component registry and bundle traits.
//!
//! The registry assigns each distinct component kind a dense, process-stable
//! `ComponentId` the first time it is registered, and records its size and
//! drop function so the rest of the crate can treat components as opaque
//! byte ranges. Registration is safe to call concurrently with itself;
//! lookup by id only takes a read lock, which is uncontended in the common
//! case of a stable, already-registered component set.

use std::any::TypeId;
use std::sync::OnceLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

use crate::archetype::Archetype;

/// Maximum number of components a `Bundle` tuple impl supports.
pub const MAX_BUNDLE_COMPONENTS: usize = 8;

/// Marker trait for anything usable as a component.
///
/// Components must be `'static` (no borrowed data) and `Send + Sync` so
/// that chunk columns can be accessed from multiple threads during
/// read-only iteration.
pub trait Component: 'static + Send + Sync {}

impl<T: 'static + Send + Sync> Component for T {}

/// Dense, process-stable identifier for a registered component kind.
///
/// Ids are assigned monotonically starting at 0 and are never reused within
/// a process, even across distinct [`World`](crate::world::World) instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u32);

impl ComponentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Size and destructor for one component kind.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    pub type_id: TypeId,
    pub size: usize,
    pub drop_fn: Option<unsafe fn(*mut u8)>,
}

impl TypeDescriptor {
    fn of<T: Component>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            size: std::mem::size_of::<T>(),
            drop_fn: if std::mem::needs_drop::<T>() {
                Some(|ptr| unsafe { std::ptr::drop_in_place(ptr as *mut T) })
            } else {
                None
            },
        }
    }
}

struct RegistryInner {
    ids: FxHashMap<TypeId, ComponentId>,
    descriptors: Vec<TypeDescriptor>,
}

static REGISTRY: OnceLock<RwLock<RegistryInner>> = OnceLock::new();

fn registry() -> &'static RwLock<RegistryInner> {
    REGISTRY.get_or_init(|| {
        RwLock::new(RegistryInner {
            ids: FxHashMap::default(),
            descriptors: Vec::new(),
        })
    })
}

/// Registry of component kinds, keyed by Rust type.
///
/// There is exactly one registry per process (not per world): `ComponentId`
/// stability is a process-wide guarantee. Worlds themselves remain
/// self-contained — this registry only hands out identifiers, it holds no
/// entity state.
pub struct ComponentRegistry;

impl ComponentRegistry {
    /// Register `T`, or return its existing id if already registered.
    pub fn register<T: Component>() -> ComponentId {
        let type_id = TypeId::of::<T>();
        if let Some(&id) = registry().read().ids.get(&type_id) {
            return id;
        }
        let mut inner = registry().write();
        // Re-check: another thread may have registered T between the read
        // lock release above and acquiring the write lock here.
        if let Some(&id) = inner.ids.get(&type_id) {
            return id;
        }
        let id = ComponentId(inner.descriptors.len() as u32);
        inner.descriptors.push(TypeDescriptor::of::<T>());
        inner.ids.insert(type_id, id);
        id
    }

    /// Look up the id of an already-registered type, if any.
    pub fn id_of<T: Component>() -> Option<ComponentId> {
        registry().read().ids.get(&TypeId::of::<T>()).copied()
    }

    pub fn size_of(id: ComponentId) -> usize {
        registry().read().descriptors[id.index()].size
    }

    pub fn descriptor_of(id: ComponentId) -> TypeDescriptor {
        registry().read().descriptors[id.index()]
    }

    pub fn type_of(id: ComponentId) -> TypeId {
        registry().read().descriptors[id.index()].type_id
    }
}

/// A bundle of components that can be spawned onto a single entity at once.
///
/// Implemented for tuples of up to [`MAX_BUNDLE_COMPONENTS`] components; this
/// is the ergonomic layer over the raw `ComponentId`-keyed archetype API
/// that the world, query engine and command buffer all share underneath.
pub trait Bundle: Send + Sync + 'static {
    /// Component ids in this bundle, registering each type on first use.
    fn component_ids() -> SmallVec<[ComponentId; MAX_BUNDLE_COMPONENTS]>
    where
        Self: Sized;

    /// Ensure component columns exist in `archetype` for every member type.
    fn register_components(archetype: &mut Archetype)
    where
        Self: Sized;

    /// Write this bundle's values to the given column pointers.
    ///
    /// # Safety
    /// `ptrs` must have one entry per component in bundle order, each
    /// pointing to a correctly sized, properly aligned, writable slot.
    unsafe fn write_components(self, ptrs: &[*mut u8]);
}

macro_rules! impl_bundle {
    ($($T:ident),*) => {
        impl<$($T: Component),*> Bundle for ($($T,)*) {
            fn component_ids() -> SmallVec<[ComponentId; MAX_BUNDLE_COMPONENTS]> {
                smallvec![$(ComponentRegistry::register::<$T>()),*]
            }

            fn register_components(archetype: &mut Archetype) {
                $(archetype.register_column::<$T>();)*
            }

            #[allow(non_snake_case)]
            unsafe fn write_components(self, ptrs: &[*mut u8]) {
                let ($($T,)*) = self;
                let mut i = 0;
                $(
                    std::ptr::write(ptrs[i] as *mut $T, $T);
                    i += 1;
                )*
                let _ = i;
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);
