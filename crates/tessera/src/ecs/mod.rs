//! The entity/component core: a splay-tree store, the entity tree built on
//! it, and the systems that run over that tree each frame.

pub mod census;
mod component;
mod entity;
mod store;
mod system;

pub use census::Census;
pub use component::{Component, ComponentKey};
pub use entity::Entity;
pub use store::SplayStore;
pub use system::{Schedule, System, UpdateContext};
