//! Concrete components shipped with the engine.
//!
//! Anything `'static` can be attached to an [`Entity`](crate::ecs::Entity);
//! these are the ones the renderer and the built-in systems understand.

mod animator;
mod controller;
mod material;
mod shader;
mod sprite;
mod texture;

pub use animator::Animator;
pub use controller::{Controller, Keyboard};
pub use material::{Material, SAMPLER_UNIFORM};
pub use shader::Shader;
pub use sprite::Sprite;
pub use texture::Texture;
