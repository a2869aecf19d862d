//! Controllers turn input into the four movement directions.
//!
//! Systems that move or animate an entity hold a `Box<dyn Controller>` and
//! never look at keys themselves, so a scripted or network-driven controller
//! can stand in for the keyboard.

use crate::input::{Input, Key};
use crate::math::Vec2;

pub trait Controller {
    fn key_down_left(&self, input: &Input) -> bool;
    fn key_down_right(&self, input: &Input) -> bool;
    fn key_down_up(&self, input: &Input) -> bool;
    fn key_down_down(&self, input: &Input) -> bool;

    /// Unnormalised direction: each axis is -1, 0 or 1, y pointing down.
    fn direction(&self, input: &Input) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(
            axis(self.key_down_left(input), self.key_down_right(input)),
            axis(self.key_down_up(input), self.key_down_down(input)),
        )
    }
}

/// Keyboard bindings. The default accepts both the arrow keys and WASD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub left: Vec<Key>,
    pub right: Vec<Key>,
    pub up: Vec<Key>,
    pub down: Vec<Key>,
}

impl Keyboard {
    pub fn arrows() -> Self {
        Self {
            left: vec![Key::Left],
            right: vec![Key::Right],
            up: vec![Key::Up],
            down: vec![Key::Down],
        }
    }

    pub fn wasd() -> Self {
        Self {
            left: vec![Key::A],
            right: vec![Key::D],
            up: vec![Key::W],
            down: vec![Key::S],
        }
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self {
            left: vec![Key::Left, Key::A],
            right: vec![Key::Right, Key::D],
            up: vec![Key::Up, Key::W],
            down: vec![Key::Down, Key::S],
        }
    }
}

fn any_pressed(input: &Input, keys: &[Key]) -> bool {
    keys.iter().any(|key| input.pressed(*key))
}

impl Controller for Keyboard {
    fn key_down_left(&self, input: &Input) -> bool {
        any_pressed(input, &self.left)
    }

    fn key_down_right(&self, input: &Input) -> bool {
        any_pressed(input, &self.right)
    }

    fn key_down_up(&self, input: &Input) -> bool {
        any_pressed(input, &self.up)
    }

    fn key_down_down(&self, input: &Input) -> bool {
        any_pressed(input, &self.down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_accept_both_layouts() {
        let keyboard = Keyboard::default();
        let mut input = Input::new();
        input.press(Key::A);
        input.press(Key::Down);
        assert!(keyboard.key_down_left(&input));
        assert!(keyboard.key_down_down(&input));
        assert_eq!(keyboard.direction(&input), Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn opposite_keys_cancel() {
        let keyboard = Keyboard::arrows();
        let mut input = Input::new();
        input.press(Key::Left);
        input.press(Key::Right);
        assert_eq!(keyboard.direction(&input), Vec2::ZERO);
    }

    #[test]
    fn wasd_ignores_arrows() {
        let keyboard = Keyboard::wasd();
        let mut input = Input::new();
        input.press(Key::Up);
        assert!(!keyboard.key_down_up(&input));
    }
}
