//! Drawing sprites through the camera.

use crate::components::Sprite;
use crate::ecs::{Entity, System};
use crate::math::{Transform, Vec2};
use crate::render::Canvas;

/// Draws every entity in the scene that has both a [`Sprite`] and a
/// [`Transform`], depth first in child order, offset by the camera.
///
/// Sprites are submitted in tree order, so entities that share a material
/// should be siblings to batch well (a tile map as one child holding all
/// tiles, for instance).
#[derive(Debug, Default)]
pub struct SpriteDrawSystem {
    camera: Option<String>,
}

impl SpriteDrawSystem {
    /// Draw in world coordinates, without a camera.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset everything by the position of the named child's `Transform`.
    pub fn with_camera(camera: &str) -> Self {
        Self {
            camera: Some(camera.to_string()),
        }
    }

    fn camera_position(&self, scene: &mut Entity) -> Vec2 {
        let Some(name) = &self.camera else {
            return Vec2::ZERO;
        };
        scene.named_child(name).component::<Transform>().position()
    }
}

fn draw_tree(entity: &mut Entity, camera: Vec2, canvas: &mut dyn Canvas) {
    let transform = entity.try_component::<Transform>().ok().copied();
    let sprite = entity.try_component::<Sprite>().ok().copied();
    if let (Some(transform), Some(sprite)) = (transform, sprite) {
        canvas.draw(sprite.src, transform.screen_rect(camera), &sprite.material);
    }
    for child in entity.children_mut() {
        draw_tree(child, camera, canvas);
    }
}

impl System for SpriteDrawSystem {
    fn draw(&mut self, scene: &mut Entity, canvas: &mut dyn Canvas) {
        let camera = self.camera_position(scene);
        draw_tree(scene, camera, canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Material;
    use crate::math::Rect;
    use crate::systems::testing;

    #[derive(Default)]
    struct Recording(Vec<(Rect, Rect, u32)>);

    impl Canvas for Recording {
        fn draw(&mut self, src: Rect, dest: Rect, material: &Material) {
            self.0.push((src, dest, material.id()));
        }
    }

    fn sprite_entity(x: f32, y: f32, material: Material) -> Entity {
        Entity::new()
            .with(Transform::new(Rect::new(x, y, 16.0, 16.0), 2.0))
            .with(Sprite::new(Rect::new(0.0, 0.0, 16.0, 16.0), material))
    }

    #[test]
    fn draws_through_camera_in_tree_order() {
        let (grass, hero) = (testing::material(), testing::material());
        let mut tiles = Entity::new();
        tiles.push_child(sprite_entity(0.0, 0.0, grass));
        tiles.push_child(sprite_entity(32.0, 0.0, grass));

        let mut scene = Entity::new()
            .with_child("camera", Entity::new().with(Transform::from_rect(10.0, 20.0, 640.0, 640.0)))
            .with_child("tiles", tiles)
            .with_child("player", sprite_entity(100.0, 100.0, hero));

        let mut canvas = Recording::default();
        SpriteDrawSystem::with_camera("camera").draw(&mut scene, &mut canvas);

        assert_eq!(canvas.0.len(), 3);
        let dests: Vec<Rect> = canvas.0.iter().map(|(_, dest, _)| *dest).collect();
        assert!(dests.contains(&Rect::new(-10.0, -20.0, 32.0, 32.0)));
        assert!(dests.contains(&Rect::new(22.0, -20.0, 32.0, 32.0)));
        assert!(dests.contains(&Rect::new(90.0, 80.0, 32.0, 32.0)));

        // The two tiles are siblings, so they are submitted back to back.
        let ids: Vec<u32> = canvas.0.iter().map(|(_, _, id)| *id).collect();
        let first = ids.iter().position(|id| *id == grass.id()).unwrap();
        assert_eq!(ids[first + 1], grass.id());
    }

    #[test]
    fn entities_without_sprite_are_skipped() {
        let mut scene = Entity::new()
            .with_child("marker", Entity::new().with(Transform::default()))
            .with_child("player", sprite_entity(0.0, 0.0, testing::material()));
        let mut canvas = Recording::default();
        SpriteDrawSystem::new().draw(&mut scene, &mut canvas);
        assert_eq!(canvas.0.len(), 1);
        assert_eq!(canvas.0[0].1, Rect::new(0.0, 0.0, 32.0, 32.0));
    }
}
