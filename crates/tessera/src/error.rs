//! Error types.
//!
//! Lookups and resource loading report typed errors. The panicking accessors
//! on [`Entity`](crate::ecs::Entity) and the `load` constructors of the GPU
//! components route these through [`logger::fatal`](crate::logger::fatal);
//! the `try_*` variants hand them back to the caller.

use std::path::PathBuf;

use thiserror::Error;

/// A component or child lookup failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("{what} not found (key {key:#018x})")]
    Missing { what: String, key: u64 },

    /// The slot exists but holds a different type. Only possible when two
    /// names hash to the same key or a caller-chosen id is reused.
    #[error("slot {key:#018x} holds `{found}`, expected `{expected}`")]
    WrongType {
        key: u64,
        expected: &'static str,
        found: &'static str,
    },

    #[error("`{type_name}` is already attached (key {key:#018x})")]
    AlreadyPresent { key: u64, type_name: &'static str },
}

/// Which shader stage failed to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("VERTEX"),
            ShaderStage::Fragment => f.write_str("FRAGMENT"),
        }
    }
}

/// Loading a GPU resource failed.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("failed to read shader file {}", path.display())]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader compilation error of type {stage}\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program linking error\n{log}")]
    ShaderLink { log: String },

    #[error("failed to load texture {}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Reading an [`EngineConfig`](crate::config::EngineConfig) failed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
