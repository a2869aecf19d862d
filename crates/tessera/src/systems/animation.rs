//! Sprite animation systems.

use crate::components::{Animator, Controller, Sprite};
use crate::ecs::{System, UpdateContext};
use crate::math::Vec2;

/// Advances a named child's [`Animator`] and writes the current frame into
/// its [`Sprite`].
pub struct AnimationSystem {
    target: String,
}

impl AnimationSystem {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
        }
    }
}

impl System for AnimationSystem {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let entity = ctx.scene.named_child(&self.target);
        let Some(frame) = entity.component::<Animator>().frame_at(ctx.time.elapsed()) else {
            return;
        };
        entity.component::<Sprite>().src = frame;
    }
}

/// Switches between walk and idle clips from the controller's direction.
///
/// Clips are named `walk up|down|left|right` and `idle up|down|left|right`.
/// When moving diagonally the vertical clip wins. When the controller goes
/// idle, the idle clip faces the last direction moved (down at start).
pub struct AnimateMoveSystem {
    target: String,
    controller: Box<dyn Controller>,
    facing: Vec2,
}

impl AnimateMoveSystem {
    pub fn new(target: &str, controller: impl Controller + 'static) -> Self {
        Self {
            target: target.to_string(),
            controller: Box::new(controller),
            facing: Vec2::new(0.0, 1.0),
        }
    }
}

/// The clip for a direction, vertical taking priority.
fn clip_name(direction: Vec2, walking: bool) -> Option<&'static str> {
    let name = if direction.y > 0.0 {
        ["walk down", "idle down"]
    } else if direction.y < 0.0 {
        ["walk up", "idle up"]
    } else if direction.x > 0.0 {
        ["walk right", "idle right"]
    } else if direction.x < 0.0 {
        ["walk left", "idle left"]
    } else {
        return None;
    };
    Some(if walking { name[0] } else { name[1] })
}

impl System for AnimateMoveSystem {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let direction = self.controller.direction(ctx.input);
        let walking = direction != Vec2::ZERO;
        if walking {
            self.facing = direction;
        }
        if let Some(clip) = clip_name(self.facing, walking) {
            ctx.scene
                .named_child(&self.target)
                .component::<Animator>()
                .play(clip);
        }
    }
}
