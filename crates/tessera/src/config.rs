//! Engine configuration.
//!
//! [`EngineConfig`] collects the numbers the frame loop and the renderer need.
//! Defaults reproduce the classic setup: a 1280×768 view, 64-pixel tiles and
//! batches of up to 255 sprites. A JSON file can override any subset:
//!
//! ```json
//! {
//!   "width": 1920,
//!   "height": 1080,
//!   "capacity": "per_sprite",
//!   "log": { "kind": "file", "path": "debug.err" }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logger::LogTarget;

/// How the batch renderer derives its flush threshold from `max_sprites`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Flush once the buffer holds `max_sprites² × 6` floats. This is the
    /// historical threshold; it is much larger than `max_sprites` sprites.
    #[default]
    Quadratic,
    /// Flush once the buffer holds `max_sprites` sprites (`× 6` vertices).
    PerSprite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// View width in pixels.
    pub width: u32,
    /// View height in pixels.
    pub height: u32,
    /// Edge length of a map tile in pixels.
    pub tile_size: u32,
    pub max_sprites: usize,
    pub capacity: CapacityPolicy,
    /// Clear color, 0–255 per channel.
    pub clear_color: [u8; 4],
    pub log: LogTarget,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 768,
            tile_size: 64,
            max_sprites: 255,
            capacity: CapacityPolicy::Quadratic,
            clear_color: [0, 0, 0, 255],
            log: LogTarget::Console,
        }
    }
}

impl EngineConfig {
    /// Read a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Number of tile columns needed to cover the view width.
    pub fn columns(&self) -> u32 {
        self.width.div_ceil(self.tile_size)
    }

    /// Number of tile rows needed to cover the view height.
    pub fn rows(&self) -> u32 {
        self.height.div_ceil(self.tile_size)
    }

    /// An off-screen parking position, well outside any reachable area.
    pub fn removed_position(&self) -> (f32, f32) {
        (
            self.width as f32 * -2.0 - 1.0,
            self.height as f32 * -2.0 - 1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!((config.width, config.height), (1280, 768));
        assert_eq!(config.columns(), 20);
        assert_eq!(config.rows(), 12);
        assert_eq!(config.removed_position(), (-2561.0, -1537.0));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "width": 100, "capacity": "per_sprite" }"#).unwrap();
        assert_eq!(config.width, 100);
        assert_eq!(config.height, 768);
        assert_eq!(config.capacity, CapacityPolicy::PerSprite);
        assert_eq!(config.columns(), 2);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "max_sprites": 64, "log": { "kind": "file" } }"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.max_sprites, 64);
        assert_eq!(config.log, LogTarget::debug_file());
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::from_json("{ width: }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            EngineConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
