//! Keyboard state.
//!
//! The [`Input`] snapshot tracks which keys are currently held, just pressed
//! this frame, or just released this frame. Window/event code owned by the
//! application feeds it, either event by event ([`press`](Input::press),
//! [`release`](Input::release)) or as a full snapshot of held keys
//! ([`refresh`](Input::refresh)). Controllers only ever read it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The keys the engine's controllers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    W,
    A,
    S,
    D,
    Space,
    Enter,
    Escape,
}

impl Key {
    pub const ALL: [Key; 11] = [
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::Space,
        Key::Enter,
        Key::Escape,
    ];
}

/// Held / just pressed / just released key sets.
#[derive(Debug, Clone, Default)]
pub struct Input {
    pressed: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the key is currently held down.
    pub fn pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Returns `true` if the key went down this frame.
    pub fn just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Returns `true` if the key went up this frame.
    pub fn just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn press(&mut self, key: Key) {
        if self.pressed.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: Key) {
        if self.pressed.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Replace the held set with `held`, deriving the just-pressed and
    /// just-released sets from the difference to the previous state.
    pub fn refresh(&mut self, held: &[Key]) {
        self.clear_just();
        let next: HashSet<Key> = held.iter().copied().collect();
        for key in Key::ALL {
            match (self.pressed.contains(&key), next.contains(&key)) {
                (false, true) => self.press(key),
                (true, false) => self.release(key),
                _ => {}
            }
        }
    }

    /// Forget per-frame edges. Called at the start of each frame.
    pub fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}
