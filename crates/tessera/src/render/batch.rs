//! # Batching: Fewer Draw Calls, Same Pixels
//!
//! Every draw call costs CPU time for state changes and driver validation.
//! Drawing a 20×12 tile map one sprite at a time is 240 calls; drawing it as
//! one vertex buffer is one call. [`BatchRenderer`] gets there by appending
//! each sprite's six vertices to a CPU-side buffer and only issuing a draw
//! when it must.
//!
//! ## When a Batch Is Flushed
//!
//! ```text
//!  draw(src, dest, material)
//!        │
//!        ├─ buffer at capacity?            ──► flush
//!        ├─ no active material?            ──► flush (discards, nothing bound)
//!        ├─ material.id ≠ active.id?       ──► flush
//!        │
//!        └─ append 6 vertices, active = material
//!
//!  flush:  empty → nothing
//!          no material → drop vertices
//!          else  use program, set sampler unit, bind texture,
//!                upload, draw len/stride vertices, clear
//! ```
//!
//! Consecutive sprites sharing a material therefore cost one draw call.
//! Submission order is draw order; sprites are never reordered, so
//! interleaving two materials (A, B, A, B) defeats batching. Sort by material
//! in the draw systems if that matters.
//!
//! ## Capacity
//!
//! The flush threshold is derived from `max_sprites` by the
//! [`CapacityPolicy`]. The check happens before appending, so under
//! `Quadratic` the buffer can overshoot the threshold by at most one sprite
//! (24 floats), while `PerSprite` never exceeds `max_sprites` sprites.
//!
//! ## Frame Protocol
//!
//! `clear` → `begin_draw` → any number of `draw` → `end_draw` → `display`.
//! `display` is the unbatched path: it pushes whatever is in the buffer
//! without binding a material, and does nothing after a proper `end_draw`.
//!
//! ## Comparison
//!
//! - **SpriteBatch (XNA/MonoGame)**: Same begin/draw/end protocol, with
//!   optional deferred sorting by texture. We only batch runs.
//! - **Bevy**: Extracts sprites to a render world, sorts and batches by
//!   image handle in a separate pass. Far more machinery.

use bytemuck::cast_slice;

use super::backend::{BufferHandle, Gpu};
use super::vertex::SpriteVertex;
use crate::components::Material;
use crate::config::{CapacityPolicy, EngineConfig};
use crate::math::Rect;

/// Anything sprites can be drawn into.
pub trait Canvas {
    /// Queue `src` (texture pixels) to be drawn at `dest` (screen pixels).
    fn draw(&mut self, src: Rect, dest: Rect, material: &Material);
}

/// Counters for the current frame, reset by `begin_draw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStats {
    pub sprites: u32,
    pub draw_calls: u32,
}

/// Accumulates sprite quads and flushes them grouped by material.
pub struct BatchRenderer {
    gpu: Gpu,
    buffer: Option<BufferHandle>,
    vertices: Vec<SpriteVertex>,
    material: Option<Material>,
    max_sprites: usize,
    policy: CapacityPolicy,
    stats: BatchStats,
}

impl BatchRenderer {
    /// Create the renderer and its GPU vertex buffer.
    pub fn new(gpu: Gpu, max_sprites: usize) -> Self {
        let buffer = gpu.with(|backend| backend.create_vertex_buffer(&SpriteVertex::ATTRIBUTES));
        log::debug!("Batch renderer: buffer #{}, {max_sprites} sprites", buffer.raw());
        Self {
            gpu,
            buffer: Some(buffer),
            vertices: Vec::with_capacity(max_sprites * SpriteVertex::PER_SPRITE),
            material: None,
            max_sprites,
            policy: CapacityPolicy::default(),
            stats: BatchStats::default(),
        }
    }

    pub fn from_config(gpu: Gpu, config: &EngineConfig) -> Self {
        Self::new(gpu, config.max_sprites).with_capacity_policy(config.capacity)
    }

    pub fn with_capacity_policy(mut self, policy: CapacityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Buffer length, in floats, at which a draw flushes first.
    pub fn capacity_floats(&self) -> usize {
        match self.policy {
            CapacityPolicy::Quadratic => self.max_sprites * self.max_sprites * 6,
            CapacityPolicy::PerSprite => {
                self.max_sprites * SpriteVertex::PER_SPRITE * SpriteVertex::STRIDE
            }
        }
    }

    /// Floats waiting in the buffer.
    pub fn pending_floats(&self) -> usize {
        self.vertices.len() * SpriteVertex::STRIDE
    }

    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Start a frame's batched drawing.
    pub fn begin_draw(&mut self) {
        self.material = None;
        self.stats = BatchStats::default();
    }

    /// Queue one sprite.
    pub fn draw(&mut self, src: Rect, dest: Rect, material: &Material) {
        let size = material.texture_size();
        let (u0, v0) = (src.x / size.x, src.y / size.y);
        let (u1, v1) = ((src.x + src.w) / size.x, (src.y + src.h) / size.y);

        let switch = self.material.is_none_or(|active| active.id() != material.id());
        if self.pending_floats() >= self.capacity_floats() || switch {
            self.flush();
            self.material = Some(*material);
        }

        let (x0, y0) = (dest.x, dest.y);
        let (x1, y1) = (dest.x + dest.w, dest.y + dest.h);
        let bottom_left = SpriteVertex::new(x0, y1, u0, v1);
        let top_right = SpriteVertex::new(x1, y0, u1, v0);
        let top_left = SpriteVertex::new(x0, y0, u0, v0);
        let bottom_right = SpriteVertex::new(x1, y1, u1, v1);
        self.vertices.extend_from_slice(&[
            bottom_left,
            top_right,
            top_left,
            bottom_left,
            bottom_right,
            top_right,
        ]);
        self.stats.sprites += 1;
    }

    /// Flush the last batch of the frame.
    pub fn end_draw(&mut self) {
        self.flush();
    }

    /// Draw the buffer as is, without binding a material.
    pub fn display(&mut self) {
        if self.vertices.is_empty() {
            return;
        }
        let Some(buffer) = self.live_buffer() else { return };
        let data: &[f32] = cast_slice(&self.vertices);
        let count = self.vertices.len() as u32;
        self.gpu.with(|backend| {
            backend.upload_vertices(buffer, data);
            backend.draw_triangles(buffer, count);
        });
        self.stats.draw_calls += 1;
        self.vertices.clear();
    }

    /// Clear the frame. Components are 0–255.
    pub fn clear(&mut self, r: f32, g: f32, b: f32, a: f32) {
        let color = [r / 255.0, g / 255.0, b / 255.0, a / 255.0];
        self.gpu.with(|backend| backend.clear(color));
    }

    /// [`clear`](Self::clear) with an opaque alpha.
    pub fn clear_rgb(&mut self, r: f32, g: f32, b: f32) {
        self.clear(r, g, b, 255.0);
    }

    /// Free the vertex buffer now. Later calls, and the drop, do nothing.
    pub fn release(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.gpu.with(|backend| backend.release_vertex_buffer(buffer));
        }
    }

    fn flush(&mut self) {
        if self.vertices.is_empty() {
            return;
        }
        let Some(material) = self.material else {
            self.vertices.clear();
            return;
        };
        let Some(buffer) = self.live_buffer() else { return };

        let data: &[f32] = cast_slice(&self.vertices);
        let count = self.vertices.len() as u32;
        self.gpu.with(|backend| {
            material.compile(backend);
            material.bind(backend);
            backend.upload_vertices(buffer, data);
            backend.draw_triangles(buffer, count);
        });
        self.stats.draw_calls += 1;
        self.vertices.clear();
    }

    fn live_buffer(&mut self) -> Option<BufferHandle> {
        if self.buffer.is_none() {
            log::warn!(
                "Batch renderer used after release, dropping {} vertices",
                self.vertices.len()
            );
            self.vertices.clear();
        }
        self.buffer
    }
}

impl Canvas for BatchRenderer {
    fn draw(&mut self, src: Rect, dest: Rect, material: &Material) {
        BatchRenderer::draw(self, src, dest, material);
    }
}

impl Drop for BatchRenderer {
    fn drop(&mut self) {
        self.release();
    }
}
