//! # Backend: The Narrow Waist Between Engine and GPU
//!
//! The renderer and the GPU components never talk to a graphics API directly.
//! They issue a handful of immediate-mode calls through [`GraphicsBackend`]:
//!
//! ```text
//!  BatchRenderer ──┐
//!  Shader ─────────┼──► Gpu (Rc<RefCell<dyn GraphicsBackend>>)
//!  Texture ────────┘            │
//!                               ├──► HeadlessBackend   records calls (tests, tools)
//!                               └──► WgpuBackend       real rendering
//! ```
//!
//! ## Handles and Ownership
//!
//! Backends hand out small `Copy` handles. Each handle is owned by exactly one
//! component value (a [`BatchRenderer`](super::BatchRenderer) owns its vertex
//! buffer, a [`Shader`](crate::components::Shader) its program, a
//! [`Texture`](crate::components::Texture) its image) which releases it when
//! dropped. Because the owning values are moved, not copied, a handle is
//! released exactly once.
//!
//! [`Gpu`] is the shared, single-threaded reference to the backend that those
//! owners keep so they can release in `Drop`. Never call into the backend
//! while already inside [`Gpu::with`]; the `RefCell` would panic.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::assets::{ImageData, ShaderSources};
use crate::error::ResourceError;
use crate::math::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// A vertex buffer together with its attribute layout.
    BufferHandle
);
handle!(
    /// A linked shader program.
    ProgramHandle
);
handle!(
    /// A texture uploaded to the GPU.
    TextureHandle
);

/// A value for a named shader uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

/// Texture coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wrap {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter {
    Nearest,
    Linear,
}

/// Storage format of texture texels. Source pixels are always RGBA8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
}

/// How a texture is stored and sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureParams {
    pub format: PixelFormat,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub filter_min: Filter,
    pub filter_mag: Filter,
}

impl Default for TextureParams {
    /// Repeat wrapping and nearest filtering: crisp pixel art.
    fn default() -> Self {
        Self {
            format: PixelFormat::Rgba8UnormSrgb,
            wrap_s: Wrap::Repeat,
            wrap_t: Wrap::Repeat,
            filter_min: Filter::Nearest,
            filter_mag: Filter::Nearest,
        }
    }
}

/// Immediate-mode graphics calls the engine needs.
///
/// Calls are issued in frame order: `clear`, then any number of
/// `use_program`/`set_uniform`/`bind_texture`/`upload_vertices`/
/// `draw_triangles` groups, then `present`.
pub trait GraphicsBackend {
    /// Create a vertex buffer whose vertices consist of float attributes of
    /// the given component counts, e.g. `[2, 2]` for position + uv.
    fn create_vertex_buffer(&mut self, attributes: &[u32]) -> BufferHandle;
    fn release_vertex_buffer(&mut self, buffer: BufferHandle);
    /// Replace the buffer's contents.
    fn upload_vertices(&mut self, buffer: BufferHandle, data: &[f32]);
    /// Draw `vertex_count` vertices from the start of the buffer as a
    /// triangle list, with the current program and bound textures.
    fn draw_triangles(&mut self, buffer: BufferHandle, vertex_count: u32);
    /// Clear the frame to a color with components in `0.0..=1.0`.
    fn clear(&mut self, color: [f32; 4]);

    fn compile_program(&mut self, sources: &ShaderSources) -> Result<ProgramHandle, ResourceError>;
    fn use_program(&mut self, program: ProgramHandle);
    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: Uniform);
    fn release_program(&mut self, program: ProgramHandle);

    fn create_texture(&mut self, image: &ImageData, params: &TextureParams) -> TextureHandle;
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);
    fn release_texture(&mut self, texture: TextureHandle);

    /// Submit the frame.
    fn present(&mut self);
}

/// Shared handle to the graphics backend.
#[derive(Clone)]
pub struct Gpu(Rc<RefCell<dyn GraphicsBackend>>);

impl Gpu {
    /// Wrap a backend the caller keeps a typed reference to (tests inspect
    /// a `HeadlessBackend` this way).
    pub fn new<B: GraphicsBackend + 'static>(backend: Rc<RefCell<B>>) -> Self {
        Self(backend)
    }

    pub fn from_backend<B: GraphicsBackend + 'static>(backend: B) -> Self {
        Self(Rc::new(RefCell::new(backend)))
    }

    /// Run `f` with exclusive access to the backend.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn GraphicsBackend) -> R) -> R {
        f(&mut *self.0.borrow_mut())
    }
}

impl std::fmt::Debug for Gpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gpu").finish_non_exhaustive()
    }
}
