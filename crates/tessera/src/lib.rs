//! # Tessera: Tile Game Core
//!
//! A small 2D engine core for tile-based games: a splay-tree component store,
//! an entity tree built on it, a material-batching sprite renderer, AABB
//! collision and a severity logger.
//!
//! Start with `use tessera::prelude::*` and build a [`Game`](game::Game).

pub mod assets;
pub mod collision;
pub mod components;
pub mod config;
pub mod ecs;
pub mod error;
pub mod game;
pub mod input;
pub mod logger;
pub mod math;
pub mod prelude;
pub mod render;
pub mod systems;
pub mod time;
