//! # Component: Type-Erased Values With Stable Keys
//!
//! A component is any `'static` value. Inside an [`Entity`](super::Entity) it
//! is stored as `Box<dyn Component>` and recovered with a checked downcast:
//!
//! ```text
//!  Transform ──Box::new──► Box<dyn Component> ──as_any_mut──► &mut dyn Any
//!                                                               │
//!                                       downcast_mut::<Transform>()
//!                                                               ▼
//!                                                  Some(&mut Transform)
//! ```
//!
//! A failed downcast is a [`LookupError::WrongType`], never undefined
//! behaviour.
//!
//! ## Keys
//!
//! Stores are keyed by `u64`. A [`ComponentKey`] comes from one of three
//! places:
//!
//! - [`ComponentKey::of::<T>()`](ComponentKey::of): the singleton slot for type
//!   `T`, derived from the type's `TypeId`.
//! - [`ComponentKey::named`]: a caller-chosen string such as `"player"`.
//! - [`ComponentKey::from_raw`]: a caller-chosen integer.
//!
//! Type and name keys are `FxHasher` digests with a domain byte mixed in, so a
//! type key and a name key never share a digest input. Type keys hash the
//! `TypeId` rather than `type_name`, which is not guaranteed unique. The
//! digest is deterministic within a build: the key of a type does not depend
//! on which type was looked up first.

use std::any::{Any, TypeId};
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::error::LookupError;

/// Object-safe view of a component. Implemented for every `'static` type.
pub trait Component: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Full type name of the concrete value, for diagnostics.
    fn type_name(&self) -> &'static str;
}

impl<T: Any> Component for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

const TYPE_DOMAIN: u8 = 0x01;
const NAME_DOMAIN: u8 = 0x02;

/// Key of a slot in a component or child store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey(u64);

impl ComponentKey {
    /// The singleton slot of type `T`.
    pub fn of<T: 'static>() -> Self {
        let mut hasher = FxHasher::default();
        hasher.write_u8(TYPE_DOMAIN);
        TypeId::of::<T>().hash(&mut hasher);
        Self(hasher.finish())
    }

    /// The slot for a string name.
    pub fn named(name: &str) -> Self {
        Self(digest(NAME_DOMAIN, name))
    }

    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

fn digest(domain: u8, text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_u8(domain);
    hasher.write(text.as_bytes());
    hasher.finish()
}

pub(crate) fn downcast_mut<T: Component>(
    stored: &mut dyn Component,
    key: u64,
) -> Result<&mut T, LookupError> {
    // Called through the trait path so `Self` is the stored value's type,
    // not the reference.
    let found = Component::type_name(&*stored);
    Component::as_any_mut(stored).downcast_mut::<T>().ok_or(LookupError::WrongType {
        key,
        expected: std::any::type_name::<T>(),
        found,
    })
}
