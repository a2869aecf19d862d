//! Convenience re-exports: `use tessera::prelude::*` for the common items.

pub use crate::assets::{ImageData, ShaderSources};
pub use crate::collision::{collide, contains_point};
pub use crate::components::{Animator, Controller, Keyboard, Material, Shader, Sprite, Texture};
pub use crate::config::{CapacityPolicy, EngineConfig};
pub use crate::ecs::{Component, ComponentKey, Entity, Schedule, System, UpdateContext};
pub use crate::error::{LookupError, ResourceError};
pub use crate::game::Game;
pub use crate::input::{Input, Key};
pub use crate::logger::{LogTarget, Severity};
pub use crate::math::{Mat4, Rect, Transform, Vec2};
pub use crate::render::{BatchRenderer, Canvas, Gpu, GraphicsBackend, HeadlessBackend, TextureParams};
#[cfg(feature = "wgpu-backend")]
pub use crate::render::WgpuBackend;
pub use crate::systems::{
    AnimateMoveSystem, AnimationSystem, CameraSystem, MovementSystem, SpriteDrawSystem,
};
pub use crate::time::Time;
