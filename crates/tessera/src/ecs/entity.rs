//! # Entity: A Node in the Scene Tree
//!
//! An [`Entity`] is a bag of components plus an ordered set of child entities.
//! The whole scene is one root entity; the player, the camera and the tile map
//! are its children.
//!
//! ```text
//! Entity
//! ┌─────────────────────────────────────────────────────────┐
//! │ components: SplayStore<dyn Component>                   │
//! │   of::<Transform>()   → Transform                       │
//! │   of::<Sprite>()      → Sprite                          │
//! │   named("walk")       → Animator            (by name)   │
//! │   0, 1, 2 …           → Rect, Rect, Rect    (push)      │
//! │                                                         │
//! │ children: SplayStore<Entity>                            │
//! │   named("player")     → Entity { … }                    │
//! │   0, 1 …              → Entity { … }        (push)      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Three Ways to Address a Slot
//!
//! - **By type** (`add_component`, `component`): at most one component per
//!   type. Adding a second one is an error.
//! - **By name or id** (`add_named_component`, `add_keyed_component`,
//!   `add_named_child`): first writer wins. Adding under a taken name keeps
//!   the old value and returns it.
//! - **By position** (`push_component`, `push_child`): array mode, any number
//!   of values of the same type. A pushed value's position is the number of
//!   slots filled before it (typed and named ones included), so positions
//!   grow in push order and restart at 0 after a clear.
//!
//! ## Failure Policy
//!
//! The plain accessors (`component`, `named_child`, …) treat a missing slot or
//! a type mismatch as a programming error: they log at High severity and
//! panic through [`logger::fatal`]. Each has a `try_` twin returning
//! [`LookupError`] for code that expects absence.
//!
//! ## Lookups Take `&mut self`
//!
//! Every lookup splays the store, so even reads need `&mut self`. Copy what
//! you need out of one component before touching the next.

use std::fmt;

use super::census;
use super::component::{Component, ComponentKey, downcast_mut};
use super::store::SplayStore;
use crate::error::LookupError;
use crate::logger;

/// A scene node owning components and child entities.
pub struct Entity {
    components: SplayStore<dyn Component>,
    children: SplayStore<Entity>,
}

impl Entity {
    pub fn new() -> Self {
        census::entity_created();
        Self {
            components: SplayStore::new(),
            children: SplayStore::new(),
        }
    }

    /// Builder form of [`add_component`](Self::add_component).
    pub fn with<T: Component>(mut self, component: T) -> Self {
        self.add_component(component);
        self
    }

    /// Builder form of [`add_named_child`](Self::add_named_child).
    pub fn with_child(mut self, name: &str, child: Entity) -> Self {
        self.add_named_child(name, child);
        self
    }

    // ── Components by type ──────────────────────────────────────────────

    /// Attach the singleton component of type `T`.
    ///
    /// # Panics
    ///
    /// If a `T` is already attached.
    pub fn add_component<T: Component>(&mut self, component: T) -> &mut T {
        self.try_add_component(component)
            .unwrap_or_else(|err| logger::fatal(err))
    }

    pub fn try_add_component<T: Component>(&mut self, component: T) -> Result<&mut T, LookupError> {
        let key = ComponentKey::of::<T>().raw();
        if self.components.contains(key) {
            return Err(LookupError::AlreadyPresent {
                key,
                type_name: std::any::type_name::<T>(),
            });
        }
        census::components_added(1);
        downcast_mut(self.components.insert(key, Box::new(component)), key)
    }

    /// The singleton component of type `T`.
    ///
    /// # Panics
    ///
    /// If no `T` is attached.
    pub fn component<T: Component>(&mut self) -> &mut T {
        self.try_component().unwrap_or_else(|err| logger::fatal(err))
    }

    pub fn try_component<T: Component>(&mut self) -> Result<&mut T, LookupError> {
        self.lookup(ComponentKey::of::<T>(), || {
            format!("component `{}`", std::any::type_name::<T>())
        })
    }

    pub fn has_component<T: Component>(&mut self) -> bool {
        self.components.contains(ComponentKey::of::<T>().raw())
    }

    /// Detach and drop the singleton `T`. Returns `false` if there was none.
    pub fn remove_component<T: Component>(&mut self) -> bool {
        self.remove_slot(ComponentKey::of::<T>())
    }

    // ── Components by name or id ────────────────────────────────────────

    /// Attach `component` under `name`. If the name is taken the existing
    /// component is kept and returned.
    ///
    /// # Panics
    ///
    /// If the existing component under `name` is not a `T`.
    pub fn add_named_component<T: Component>(&mut self, name: &str, component: T) -> &mut T {
        self.add_keyed_component(ComponentKey::named(name).raw(), component)
    }

    /// Attach `component` under a caller-chosen integer id. First writer wins.
    ///
    /// # Panics
    ///
    /// If the existing component under `id` is not a `T`.
    pub fn add_keyed_component<T: Component>(&mut self, id: u64, component: T) -> &mut T {
        if !self.components.contains(id) {
            census::components_added(1);
        }
        let stored = self.components.insert(id, Box::new(component));
        downcast_mut(stored, id).unwrap_or_else(|err| logger::fatal(err))
    }

    pub fn named_component<T: Component>(&mut self, name: &str) -> &mut T {
        self.try_named_component(name)
            .unwrap_or_else(|err| logger::fatal(err))
    }

    pub fn try_named_component<T: Component>(&mut self, name: &str) -> Result<&mut T, LookupError> {
        self.lookup(ComponentKey::named(name), || format!("component `{name}`"))
    }

    pub fn keyed_component<T: Component>(&mut self, id: u64) -> &mut T {
        self.try_keyed_component(id)
            .unwrap_or_else(|err| logger::fatal(err))
    }

    pub fn try_keyed_component<T: Component>(&mut self, id: u64) -> Result<&mut T, LookupError> {
        self.lookup(ComponentKey::from_raw(id), || format!("component #{id}"))
    }

    pub fn has_named_component(&mut self, name: &str) -> bool {
        self.components.contains(ComponentKey::named(name).raw())
    }

    pub fn remove_named_component(&mut self, name: &str) -> bool {
        self.remove_slot(ComponentKey::named(name))
    }

    // ── Components by position ──────────────────────────────────────────

    /// Append a component in array mode. Several components of one type may
    /// be pushed; they are addressed by push position.
    pub fn push_component<T: Component>(&mut self, component: T) -> &mut T {
        let key = self.components.next_index();
        if !self.components.contains(key) {
            census::components_added(1);
        }
        let stored = self.components.push(Box::new(component));
        downcast_mut(stored, key).unwrap_or_else(|err| logger::fatal(err))
    }

    /// The component pushed at `position`.
    ///
    /// # Panics
    ///
    /// If nothing was pushed there, or it is not a `T`.
    pub fn component_at<T: Component>(&mut self, position: u64) -> &mut T {
        self.try_keyed_component(position)
            .unwrap_or_else(|err| logger::fatal(err))
    }

    /// Every stored `T`, in key order. Pushed components come in push order.
    pub fn components_of<T: Component>(&mut self) -> Vec<&mut T> {
        self.components
            .ordered_mut()
            .into_iter()
            .filter_map(|c| Component::as_any_mut(c).downcast_mut::<T>())
            .collect()
    }

    /// Type names of all stored components, in key order.
    pub fn component_names(&self) -> Vec<&'static str> {
        self.components
            .ordered()
            .into_iter()
            .map(|c| Component::type_name(c))
            .collect()
    }

    pub fn components_len(&self) -> usize {
        self.components.len()
    }

    /// Drop every component. Children are kept.
    pub fn clear(&mut self) {
        census::components_dropped(self.components.len());
        self.components.clear();
    }

    // ── Children ────────────────────────────────────────────────────────

    /// Append a child in array mode and return it.
    pub fn push_child(&mut self, child: Entity) -> &mut Entity {
        self.children.push(Box::new(child))
    }

    /// Attach `child` under `name`. If the name is taken, `child` is dropped
    /// and the existing child is returned.
    pub fn add_named_child(&mut self, name: &str, child: Entity) -> &mut Entity {
        self.children.insert(ComponentKey::named(name).raw(), Box::new(child))
    }

    pub fn add_keyed_child(&mut self, id: u64, child: Entity) -> &mut Entity {
        self.children.insert(id, Box::new(child))
    }

    /// Create an empty child under `name` (or return the existing one).
    pub fn spawn_child(&mut self, name: &str) -> &mut Entity {
        self.add_named_child(name, Entity::new())
    }

    /// The child pushed at `position`.
    ///
    /// # Panics
    ///
    /// If there is no such child.
    pub fn child(&mut self, position: u64) -> &mut Entity {
        self.try_child(position)
            .unwrap_or_else(|err| logger::fatal(err))
    }

    pub fn try_child(&mut self, position: u64) -> Result<&mut Entity, LookupError> {
        self.children.search(position).ok_or_else(|| LookupError::Missing {
            what: format!("child #{position}"),
            key: position,
        })
    }

    /// The child attached under `name`.
    ///
    /// # Panics
    ///
    /// If there is no such child.
    pub fn named_child(&mut self, name: &str) -> &mut Entity {
        self.try_named_child(name)
            .unwrap_or_else(|err| logger::fatal(err))
    }

    pub fn try_named_child(&mut self, name: &str) -> Result<&mut Entity, LookupError> {
        let key = ComponentKey::named(name).raw();
        self.children.search(key).ok_or_else(|| LookupError::Missing {
            what: format!("child `{name}`"),
            key,
        })
    }

    pub fn has_child(&mut self, name: &str) -> bool {
        self.children.contains(ComponentKey::named(name).raw())
    }

    /// Detach and drop the child under `name`. Returns `false` if absent.
    pub fn remove_child(&mut self, name: &str) -> bool {
        self.children.remove(ComponentKey::named(name).raw())
    }

    /// Detach the child under `name` and hand it to the caller.
    pub fn take_child(&mut self, name: &str) -> Option<Entity> {
        self.children
            .take(ComponentKey::named(name).raw())
            .map(|child| *child)
    }

    /// Children in key order. Pushed children come in push order.
    pub fn children(&self) -> Vec<&Entity> {
        self.children.ordered()
    }

    pub fn children_mut(&mut self) -> Vec<&mut Entity> {
        self.children.ordered_mut()
    }

    pub fn children_len(&self) -> usize {
        self.children.len()
    }

    /// Drop every child (and, recursively, their subtrees).
    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn lookup<T: Component>(
        &mut self,
        key: ComponentKey,
        describe: impl FnOnce() -> String,
    ) -> Result<&mut T, LookupError> {
        let key = key.raw();
        match self.components.search(key) {
            Some(stored) => downcast_mut(stored, key),
            None => Err(LookupError::Missing {
                what: describe(),
                key,
            }),
        }
    }

    fn remove_slot(&mut self, key: ComponentKey) -> bool {
        let removed = self.components.remove(key.raw());
        if removed {
            census::components_dropped(1);
        }
        removed
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        census::components_dropped(self.components.len());
        census::entity_dropped();
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("components", &self.component_names())
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Rect, Transform};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Health(u32);
    #[derive(Debug, PartialEq)]
    struct Speed(f32);

    #[test]
    fn add_and_get_component() {
        let mut e = Entity::new();
        e.add_component(Health(10));
        e.add_component(Speed(2.5));

        assert_eq!(e.component::<Health>(), &Health(10));
        e.component::<Speed>().0 = 4.0;
        assert_eq!(e.component::<Speed>(), &Speed(4.0));
        assert_eq!(e.components_len(), 2);
    }

    #[test]
    fn second_add_is_rejected() {
        let mut e = Entity::new();
        e.add_component(Health(10));
        let err = e.try_add_component(Health(99)).err().unwrap();
        assert!(matches!(err, LookupError::AlreadyPresent { .. }));
        assert_eq!(e.component::<Health>(), &Health(10));
        assert_eq!(e.components_len(), 1);
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn second_add_is_fatal() {
        let mut e = Entity::new();
        e.add_component(Health(10));
        e.add_component(Health(11));
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn missing_component_is_fatal() {
        let mut e = Entity::new();
        e.component::<Health>();
    }

    #[test]
    fn try_component_reports_missing() {
        let mut e = Entity::new();
        assert!(matches!(
            e.try_component::<Health>(),
            Err(LookupError::Missing { .. })
        ));
        assert!(!e.has_component::<Health>());
    }

    #[test]
    fn remove_component() {
        let mut e = Entity::new().with(Health(1));
        assert!(e.remove_component::<Health>());
        assert!(!e.remove_component::<Health>());
        assert!(!e.has_component::<Health>());
    }

    #[test]
    fn named_components_first_writer_wins() {
        let mut e = Entity::new();
        e.add_named_component("hp", Health(5));
        let kept = e.add_named_component("hp", Health(50));
        assert_eq!(kept, &mut Health(5));
        assert!(e.has_named_component("hp"));
        assert!(!e.has_named_component("mp"));
        assert_eq!(e.named_component::<Health>("hp"), &Health(5));
        assert_eq!(e.components_len(), 1);
    }

    #[test]
    fn named_component_wrong_type() {
        let mut e = Entity::new();
        e.add_named_component("hp", Health(5));
        assert!(matches!(
            e.try_named_component::<Speed>("hp"),
            Err(LookupError::WrongType { .. })
        ));
    }

    #[test]
    fn keyed_components() {
        let mut e = Entity::new();
        e.add_keyed_component(42, Speed(1.0));
        assert_eq!(e.keyed_component::<Speed>(42), &Speed(1.0));
        assert!(e.try_keyed_component::<Speed>(43).is_err());
    }

    #[test]
    fn pushed_components_keep_order() {
        let mut e = Entity::new();
        e.add_component(Transform::default());
        e.push_component(Rect::new(0.0, 0.0, 16.0, 16.0));
        e.push_component(Rect::new(16.0, 0.0, 16.0, 16.0));
        e.push_component(Rect::new(32.0, 0.0, 16.0, 16.0));

        // The typed Transform took position 0.
        assert_eq!(e.component_at::<Rect>(1).x, 0.0);
        assert_eq!(e.component_at::<Rect>(2).x, 16.0);
        let xs: Vec<f32> = e.components_of::<Rect>().iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![0.0, 16.0, 32.0]);
        assert_eq!(e.components_len(), 4);
    }

    #[test]
    fn children_by_name_and_position() {
        let mut root = Entity::new();
        root.add_named_child("player", Entity::new().with(Health(3)));
        root.push_child(Entity::new().with(Speed(1.0)));
        root.push_child(Entity::new().with(Speed(2.0)));

        assert!(root.has_child("player"));
        assert_eq!(root.named_child("player").component::<Health>(), &Health(3));
        assert_eq!(root.child(1).component::<Speed>(), &Speed(1.0));
        assert_eq!(root.child(2).component::<Speed>(), &Speed(2.0));
        assert_eq!(root.children_len(), 3);

        assert!(root.remove_child("player"));
        assert!(!root.has_child("player"));
        assert!(root.try_named_child("player").is_err());
        assert_eq!(root.children_len(), 2);
    }

    #[test]
    fn named_child_first_writer_wins() {
        let mut root = Entity::new();
        root.spawn_child("camera").add_component(Health(1));
        let existing = root.add_named_child("camera", Entity::new().with(Health(2)));
        assert_eq!(existing.component::<Health>(), &Health(1));
        assert_eq!(root.children_len(), 1);
    }

    #[test]
    fn take_child_hands_over_ownership() {
        let mut root = Entity::new().with_child("npc", Entity::new().with(Health(9)));
        let mut npc = root.take_child("npc").unwrap();
        assert_eq!(npc.component::<Health>(), &Health(9));
        assert_eq!(root.children_len(), 0);
    }

    #[test]
    #[should_panic(expected = "child #0 not found")]
    fn missing_child_is_fatal() {
        let mut root = Entity::new();
        root.child(0);
    }

    #[test]
    fn census_balances_after_drop() {
        let before = census::snapshot();
        {
            let mut root = Entity::new();
            root.add_component(Health(1));
            let child = root.spawn_child("a");
            child.add_component(Speed(1.0));
            child.push_component(Rect::ZERO);
            root.push_child(Entity::new().with(Health(2)));
            // Rejected duplicate is dropped immediately.
            root.add_named_child("a", Entity::new().with(Health(3)));

            let during = census::snapshot().since(&before);
            assert_eq!(during.entities, 3);
            assert_eq!(during.components, 4);
        }
        assert_eq!(census::snapshot(), before);
    }

    #[test]
    fn clear_drops_components_only() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);
        struct Tracked;
        impl Drop for Tracked {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::SeqCst);
            }
        }

        let mut e = Entity::new();
        e.add_component(Tracked);
        e.push_component(Tracked);
        e.spawn_child("kept");
        e.clear();
        assert_eq!(DROPS.load(Ordering::SeqCst), 2);
        assert_eq!(e.components_len(), 0);
        assert_eq!(e.children_len(), 1);

        e.clear_children();
        assert_eq!(e.children_len(), 0);
    }

    #[test]
    fn positions_restart_after_clear() {
        let mut root = Entity::new();
        root.push_child(Entity::new().with(Health(1)));
        root.push_child(Entity::new().with(Health(2)));
        root.clear_children();
        root.push_child(Entity::new().with(Health(3)));
        assert_eq!(root.child(0).component::<Health>(), &Health(3));

        let mut e = Entity::new();
        e.push_component(Rect::ZERO);
        e.clear();
        e.push_component(Rect::new(8.0, 0.0, 8.0, 8.0));
        assert_eq!(e.component_at::<Rect>(0).x, 8.0);
    }
}
