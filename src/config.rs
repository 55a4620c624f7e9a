//! # Engine Configuration
//!
//! Tunables for the camera, input handling and renderer, read once at start-up.
//!
//! The configuration lives in an optional JSON file (`blockfield.json` in the working
//! directory, or the path named by the `BLOCKFIELD_CONFIG` environment variable). Every
//! field is optional; anything left out falls back to the built-in default.
//!
//! ```json
//! {
//!     "movement_speed": 8.0,
//!     "field_of_view_degrees": 90.0
//! }
//! ```

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::error::EngineError;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "BLOCKFIELD_CONFIG";

/// Configuration file looked up when the environment variable is unset.
pub const DEFAULT_CONFIG_PATH: &str = "blockfield.json";

/// Runtime configuration for the whole application.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Title of the application window
    pub window_title: String,
    /// Initial window width in logical pixels
    pub window_width: u32,
    /// Initial window height in logical pixels
    pub window_height: u32,
    /// Directory holding `shaders/` and `textures/`
    pub assets_path: PathBuf,
    /// Degrees of rotation per unit of raw mouse motion
    pub mouse_sensitivity_degrees: f32,
    /// Radians per second per unit of normalised touch drag
    pub touch_sensitivity: f32,
    /// Gain applied to the move-touch drag before it joins keyboard movement
    pub touch_move_gain: f32,
    /// Camera speed in blocks per second
    pub movement_speed: f32,
    /// Touches released faster than this count as taps
    pub tap_threshold_ms: u64,
    /// Vertical field of view
    pub field_of_view_degrees: f32,
    /// Near clip plane distance
    pub z_near: f32,
    /// Far clip plane distance
    pub z_far: f32,
    /// Sleep inserted per frame while the window is in the background
    pub background_frame_delay_ms: u64,
    /// Camera position on start-up
    pub camera_start: [f32; 3],
    /// Sky colour the 3D pass clears to
    pub clear_color: [f64; 3],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_title: String::from("Blockfield"),
            window_width: 640,
            window_height: 480,
            assets_path: PathBuf::from("assets"),
            mouse_sensitivity_degrees: 1.0,
            touch_sensitivity: 15.0,
            touch_move_gain: 10.0,
            movement_speed: 5.0,
            tap_threshold_ms: 500,
            field_of_view_degrees: 80.0,
            z_near: 0.2,
            z_far: 500.0,
            background_frame_delay_ms: 100,
            camera_start: [127.5, 127.5, 124.0],
            clear_color: [0.53, 0.81, 0.92],
        }
    }
}

impl EngineConfig {
    /// Loads the configuration from the default location.
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] if the file exists but cannot be parsed, and
    /// [`EngineError::Asset`] if it exists but cannot be read.
    pub fn load() -> Result<Self, EngineError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_from(&path)
    }

    /// Loads the configuration from `path`, falling back to defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, EngineError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("No configuration at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(EngineError::Asset {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::from_json(&contents).map_err(|source| EngineError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration from {}", path.display());

        Ok(config)
    }

    /// Parses a configuration document.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Path of a shader source file.
    pub fn shader_path(&self, file_name: &str) -> PathBuf {
        self.assets_path.join("shaders").join(file_name)
    }

    /// Path of a texture file.
    pub fn texture_path(&self, file_name: &str) -> PathBuf {
        self.assets_path.join("textures").join(file_name)
    }

    /// Reads a shader source file.
    pub fn read_shader(&self, file_name: &str) -> Result<String, EngineError> {
        let path = self.shader_path(file_name);
        std::fs::read_to_string(&path).map_err(|source| EngineError::Asset { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let config =
            EngineConfig::from_json(r#"{ "movement_speed": 8.0, "tap_threshold_ms": 250 }"#)
                .unwrap();

        assert_eq!(config.movement_speed, 8.0);
        assert_eq!(config.tap_threshold_ms, 250);
        assert_eq!(config.touch_sensitivity, 15.0);
        assert_eq!(config.camera_start, [127.5, 127.5, 124.0]);
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(EngineConfig::from_json(r#"{ "movement_speed": "fast" }"#).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("blockfield-config-that-does-not-exist.json");
        let config = EngineConfig::load_from(&path).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn asset_paths_are_rooted_at_assets_directory() {
        let config = EngineConfig::default();
        assert_eq!(
            config.texture_path("stone.png"),
            Path::new("assets").join("textures").join("stone.png")
        );
        assert_eq!(
            config.shader_path("cube.wgsl"),
            Path::new("assets").join("shaders").join("cube.wgsl")
        );
    }
}
