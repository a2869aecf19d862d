//! Math types and glam re-exports.
//!
//! Screen space is in pixels with the origin at the top-left corner and y
//! pointing down. [`Rect`] is the workhorse: sprite source regions, draw
//! destinations and collision boxes are all rects.

pub use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Top-left corner.
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Bottom-right corner.
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Same size, moved by `offset`.
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }
}

/// Position and size of something in the world, plus a uniform scale.
///
/// The drawn size is `rect.w * scale` by `rect.h * scale`; the position is not
/// scaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub rect: Rect,
    pub scale: f32,
}

impl Transform {
    pub const fn new(rect: Rect, scale: f32) -> Self {
        Self { rect, scale }
    }

    /// A transform at `(x, y)` with size `w` by `h` and scale 1.
    pub const fn from_rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Rect::new(x, y, w, h), 1.0)
    }

    pub fn position(&self) -> Vec2 {
        self.rect.min()
    }

    pub fn scaled_size(&self) -> Vec2 {
        self.rect.size() * self.scale
    }

    /// The on-screen rectangle: position offset by `-camera`, size scaled.
    pub fn screen_rect(&self, camera: Vec2) -> Rect {
        let size = self.scaled_size();
        Rect::new(self.rect.x - camera.x, self.rect.y - camera.y, size.x, size.y)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Rect::ZERO, 1.0)
    }
}
