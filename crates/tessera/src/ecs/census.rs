//! Live-instance accounting for leak checks.
//!
//! Every [`Entity`](super::Entity) and every component stored in one is
//! counted while it is alive. Counters are per thread: a test sees only the
//! entities it created, and the game loop (single-threaded) sees the whole
//! scene.
//!
//! ```ignore
//! let before = census::snapshot();
//! build_and_drop_level();
//! assert_eq!(census::snapshot(), before);
//! ```

use std::cell::Cell;

thread_local! {
    static ENTITIES: Cell<i64> = const { Cell::new(0) };
    static COMPONENTS: Cell<i64> = const { Cell::new(0) };
}

/// Counts of live entities and stored components on this thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Census {
    pub entities: i64,
    pub components: i64,
}

impl Census {
    /// No entity or component is alive.
    pub fn is_clean(&self) -> bool {
        self.entities == 0 && self.components == 0
    }

    /// Difference between this snapshot and an earlier one.
    pub fn since(&self, earlier: &Census) -> Census {
        Census {
            entities: self.entities - earlier.entities,
            components: self.components - earlier.components,
        }
    }
}

pub fn snapshot() -> Census {
    Census {
        entities: ENTITIES.with(Cell::get),
        components: COMPONENTS.with(Cell::get),
    }
}

pub(crate) fn entity_created() {
    ENTITIES.with(|c| c.set(c.get() + 1));
}

pub(crate) fn entity_dropped() {
    ENTITIES.with(|c| c.set(c.get() - 1));
}

pub(crate) fn components_added(count: usize) {
    COMPONENTS.with(|c| c.set(c.get() + count as i64));
}

pub(crate) fn components_dropped(count: usize) {
    COMPONENTS.with(|c| c.set(c.get() - count as i64));
}
