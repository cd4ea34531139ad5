//! Configuration loading from `config.toml`.
//!
//! Every field has a default, so the renderer runs without a config file.
//! Parsing failures are reported as [`Error::Config`] so the caller can decide
//! whether to fall back to defaults.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Root configuration structure.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub graphics: GraphicsConfig,
    pub debug: DebugConfig,
}

/// Window settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Hello Vulkan".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Graphics settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    /// Prefer FIFO (vsync) over MAILBOX when both are available.
    pub vsync: bool,
    /// Enable multisampling at the highest sample count the device supports.
    pub msaa: bool,
    /// Sleep-based frame cap in frames per second; 0 disables the cap.
    pub max_fps: u32,
    /// OBJ model to load, relative to the working directory.
    pub model_path: String,
    /// Texture image sampled by the fragment shader.
    pub texture_path: String,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            vsync: false,
            msaa: true,
            max_fps: 0,
            model_path: "assets/models/cube.obj".to_string(),
            texture_path: "assets/textures/checker.png".to_string(),
        }
    }
}

/// Debug settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Request the Khronos validation layer (only honored in debug builds).
    pub validation_layers: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: true,
        }
    }
}

impl Config {
    /// Load configuration from `config.toml`, falling back to defaults if the
    /// file is missing or malformed.
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            warn!("Failed to load config.toml: {}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file is not an error; it yields the default configuration.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {:?}: {}", path, e)))?;

        info!("Loaded configuration from {:?}", path);
        debug!("Config: {:?}", config);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.window.title, "Hello Vulkan");
        assert!(!config.graphics.vsync);
        assert!(config.graphics.msaa);
        assert_eq!(config.graphics.max_fps, 0);
        assert!(config.debug.validation_layers);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load_from_path("does/not/exist.toml").unwrap();
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn test_partial_config_parses() {
        let config: Config = toml::from_str(
            r#"
            [window]
            width = 800
            height = 600

            [graphics]
            vsync = true
            max_fps = 144
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        // Unspecified fields keep their defaults
        assert_eq!(config.window.title, "Hello Vulkan");
        assert!(config.graphics.vsync);
        assert_eq!(config.graphics.max_fps, 144);
        assert!(config.graphics.msaa);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let result: std::result::Result<Config, _> = toml::from_str("window = 3");
        assert!(result.is_err());
    }
}
