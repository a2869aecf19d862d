//! What to draw for an entity: a region of a texture through a material.

use super::material::Material;
use crate::math::Rect;

/// A drawable region. `src` is in texture pixels; where it lands on screen
/// comes from the entity's [`Transform`](crate::math::Transform).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub src: Rect,
    pub material: Material,
}

impl Sprite {
    pub fn new(src: Rect, material: Material) -> Self {
        Self { src, material }
    }

    /// The whole texture.
    pub fn full(material: Material) -> Self {
        let size = material.texture_size();
        Self::new(Rect::new(0.0, 0.0, size.x, size.y), material)
    }
}
