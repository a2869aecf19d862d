//! Controller-driven movement.

use crate::components::Controller;
use crate::ecs::{System, UpdateContext};
use crate::math::{Transform, Vec2};

/// Moves a named child's [`Transform`] by a fixed number of pixels per frame
/// in the direction its controller reports.
pub struct MovementSystem {
    target: String,
    controller: Box<dyn Controller>,
    speed: f32,
}

impl MovementSystem {
    /// Pixels per frame.
    pub const DEFAULT_SPEED: f32 = 4.0;

    pub fn new(target: &str, controller: impl Controller + 'static) -> Self {
        Self {
            target: target.to_string(),
            controller: Box::new(controller),
            speed: Self::DEFAULT_SPEED,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

/// Scale a -1/0/1 direction so diagonals are not faster than straight moves.
pub(crate) fn normalized_step(direction: Vec2) -> Vec2 {
    if direction.x != 0.0 && direction.y != 0.0 {
        direction * std::f32::consts::FRAC_1_SQRT_2
    } else {
        direction
    }
}

impl System for MovementSystem {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let direction = self.controller.direction(ctx.input);
        if direction == Vec2::ZERO {
            return;
        }
        let step = normalized_step(direction) * self.speed;
        let transform = ctx.scene.named_child(&self.target).component::<Transform>();
        transform.rect.x += step.x;
        transform.rect.y += step.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Keyboard;
    use crate::ecs::Entity;
    use crate::input::{Input, Key};
    use crate::systems::testing;
    use crate::time::Time;

    fn scene() -> Entity {
        Entity::new().with_child("player", Entity::new().with(Transform::from_rect(100.0, 100.0, 16.0, 16.0)))
    }

    fn position(scene: &mut Entity) -> Vec2 {
        scene.named_child("player").component::<Transform>().position()
    }

    #[test]
    fn straight_move_uses_full_speed() {
        let mut scene = scene();
        let mut system = MovementSystem::new("player", Keyboard::default());
        let mut input = Input::new();
        input.press(Key::Right);

        testing::update(&mut system, &mut scene, &input, &Time::new());
        assert_eq!(position(&mut scene), Vec2::new(104.0, 100.0));
    }

    #[test]
    fn diagonal_move_is_normalized() {
        let mut scene = scene();
        let mut system = MovementSystem::new("player", Keyboard::default());
        let mut input = Input::new();
        input.press(Key::Left);
        input.press(Key::Up);

        testing::update(&mut system, &mut scene, &input, &Time::new());
        let moved = Vec2::new(100.0, 100.0) - position(&mut scene);
        assert!((moved.length() - MovementSystem::DEFAULT_SPEED).abs() < 1e-4);
        assert!((moved.x - moved.y).abs() < 1e-6);
    }

    #[test]
    fn idle_controller_leaves_transform() {
        let mut scene = scene();
        let mut system = MovementSystem::new("player", Keyboard::arrows()).with_speed(10.0);
        testing::update(&mut system, &mut scene, &Input::new(), &Time::new());
        assert_eq!(position(&mut scene), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn step_normalization() {
        assert_eq!(normalized_step(Vec2::new(0.0, -1.0)), Vec2::new(0.0, -1.0));
        let diagonal = normalized_step(Vec2::new(1.0, 1.0));
        assert!((diagonal.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn missing_target_is_fatal() {
        let mut scene = Entity::new();
        let mut system = MovementSystem::new("ghost", Keyboard::default());
        let mut input = Input::new();
        input.press(Key::D);
        testing::update(&mut system, &mut scene, &input, &Time::new());
    }
}
