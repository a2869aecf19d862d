//! # Vertex: Per-Corner Data for Sprite Quads
//!
//! Each sprite becomes two triangles, six vertices, and every vertex is four
//! floats: a screen position and a texture coordinate.
//!
//! ```text
//! SpriteVertex (16 bytes per vertex)
//! ┌────────────────┬──────────────┐
//! │ position       │ uv           │
//! │ [f32; 2]       │ [f32; 2]     │
//! │ offset 0       │ offset 8     │
//! │ location(0)    │ location(1)  │
//! └────────────────┴──────────────┘
//!
//!  TL ───── TR        triangle 1: BL, TR, TL
//!  │ ╲       │        triangle 2: BL, BR, TR
//!  │   ╲     │
//!  │     ╲   │
//!  BL ───── BR
//! ```
//!
//! `#[repr(C)]` plus `bytemuck::Pod` lets the batch be handed to the backend
//! as a flat `&[f32]` without copying.

use bytemuck::{Pod, Zeroable};

/// One corner of a sprite quad, in screen pixels and normalised texture
/// coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl SpriteVertex {
    /// Float components per attribute: position, uv.
    pub const ATTRIBUTES: [u32; 2] = [2, 2];
    /// Floats per vertex.
    pub const STRIDE: usize = 4;
    pub const PER_SPRITE: usize = 6;

    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_attributes() {
        let floats: u32 = SpriteVertex::ATTRIBUTES.iter().sum();
        assert_eq!(floats as usize, SpriteVertex::STRIDE);
        assert_eq!(
            std::mem::size_of::<SpriteVertex>(),
            SpriteVertex::STRIDE * std::mem::size_of::<f32>()
        );
    }

    #[test]
    fn casts_to_flat_floats() {
        let vertices = [SpriteVertex::new(1.0, 2.0, 0.25, 0.5)];
        let flat: &[f32] = bytemuck::cast_slice(&vertices);
        assert_eq!(flat, &[1.0, 2.0, 0.25, 0.5]);
    }
}
