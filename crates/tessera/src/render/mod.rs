//! Rendering: the backend seam, the sprite batcher and the backends.

mod backend;
mod batch;
mod headless;
mod vertex;
#[cfg(feature = "wgpu-backend")]
mod wgpu_backend;

pub use backend::{
    BufferHandle, Filter, GraphicsBackend, Gpu, PixelFormat, ProgramHandle, TextureHandle,
    TextureParams, Uniform, Wrap,
};
pub use batch::{BatchRenderer, BatchStats, Canvas};
pub use headless::{Command, DrawCall, HeadlessBackend};
pub use vertex::SpriteVertex;
#[cfg(feature = "wgpu-backend")]
pub use wgpu_backend::{PROJECTION_UNIFORM, WgpuBackend};
