//! Camera follow.

use crate::ecs::{System, UpdateContext};
use crate::math::Transform;

/// Keeps the followed entity centred on screen without showing anything
/// outside the world.
///
/// The camera entity's `Transform` doubles as its configuration: `rect.x/y`
/// is the camera position the system writes, `rect.w/h × scale` the size of
/// the world it may pan over. The view size comes from the engine config.
pub struct CameraSystem {
    follow: String,
    camera: String,
}

impl CameraSystem {
    pub fn new(follow: &str, camera: &str) -> Self {
        log::info!("Initializing Camera System ({camera} follows {follow})");
        Self {
            follow: follow.to_string(),
            camera: camera.to_string(),
        }
    }
}

impl System for CameraSystem {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let follow = *ctx.scene.named_child(&self.follow).component::<Transform>();
        let (view_w, view_h) = (ctx.config.width as f32, ctx.config.height as f32);
        let target = follow.position() + follow.scaled_size() / 2.0;

        let camera = ctx.scene.named_child(&self.camera).component::<Transform>();
        let world = camera.scaled_size();
        camera.rect.x = follow_axis(target.x, view_w, world.x);
        camera.rect.y = follow_axis(target.y, view_h, world.y);
    }
}

/// Centre on `target`, then clamp to `[0, world - view]`. When the world is
/// smaller than the view the upper bound wins, pinning the world's far edge.
fn follow_axis(target: f32, view: f32, world: f32) -> f32 {
    let mut position = target - view / 2.0;
    if position < 0.0 {
        position = 0.0;
    }
    if position > world - view {
        position = world - view;
    }
    position
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;
    use crate::input::Input;
    use crate::math::Rect;
    use crate::systems::testing;
    use crate::time::Time;

    // World is 40×24 tiles of 64px (2560×1536); the view is 1280×768.
    fn scene(player: (f32, f32)) -> Entity {
        Entity::new()
            .with_child(
                "player",
                Entity::new().with(Transform::new(Rect::new(player.0, player.1, 16.0, 16.0), 4.0)),
            )
            .with_child("camera", Entity::new().with(Transform::from_rect(0.0, 0.0, 2560.0, 1536.0)))
    }

    fn camera_after_update(player: (f32, f32)) -> (f32, f32) {
        let mut scene = scene(player);
        let mut system = CameraSystem::new("player", "camera");
        testing::update(&mut system, &mut scene, &Input::new(), &Time::new());
        let camera = scene.named_child("camera").component::<Transform>();
        (camera.rect.x, camera.rect.y)
    }

    #[test]
    fn centres_on_scaled_target() {
        // Player is 64px on screen; its centre is at (1032, 832).
        assert_eq!(camera_after_update((1000.0, 800.0)), (1032.0 - 640.0, 832.0 - 384.0));
    }

    #[test]
    fn clamps_at_world_origin() {
        assert_eq!(camera_after_update((10.0, 10.0)), (0.0, 0.0));
    }

    #[test]
    fn clamps_at_far_edge() {
        assert_eq!(camera_after_update((2500.0, 1500.0)), (2560.0 - 1280.0, 1536.0 - 768.0));
    }

    #[test]
    fn small_world_pins_far_edge() {
        assert_eq!(follow_axis(50.0, 1280.0, 640.0), -640.0);
    }
}
