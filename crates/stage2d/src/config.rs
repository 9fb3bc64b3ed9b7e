//! Configuration loading and saving
//!
//! Any `Serialize + Deserialize + Default` type becomes loadable by marking
//! it with the [`Config`] trait. The file format is picked by extension,
//! TOML for hand-edited settings and RON when configs are written out by
//! tools. Missing files are not fatal when loaded through
//! [`Config::load_or_default`]; the defaults apply and a warning is logged.

use std::fs;
use std::path::Path;

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or saving configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    /// The file contents did not parse as the expected format
    #[error("config parse error: {0}")]
    Parse(String),

    /// The value could not be serialized
    #[error("config serialize error: {0}")]
    Serialize(String),

    /// The path's extension is not a recognized config format
    #[error("unsupported config format: .{0}")]
    UnsupportedFormat(String),
}

/// Marker trait adding file loading and saving to serializable settings
/// types
pub trait Config: Serialize + DeserializeOwned + Default {
    /// Load a value from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match extension(path) {
            "toml" => toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string())),
            "ron" => ron::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string())),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Save the value to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = match extension(path) {
            "toml" => toml::to_string_pretty(self)
                .map_err(|err| ConfigError::Serialize(err.to_string()))?,
            "ron" => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|err| ConfigError::Serialize(err.to_string()))?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        fs::write(path, text)?;
        Ok(())
    }

    /// Load a value, falling back to defaults if the file is missing or
    /// malformed
    fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Ok(value) => value,
            Err(err) => {
                warn!("config: using defaults, could not load {}: {err}", path.display());
                Self::default()
            }
        }
    }
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|ext| ext.to_str()).unwrap_or("")
}

/// Engine-level settings read at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window extent in pixels, width then height
    pub window_size: [u32; 2],
    /// Target frames per second for the run loop
    pub fps: u32,
    /// Whether to log frame timing statistics while running
    pub log_frame_stats: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: [800, 600],
            fps: 60,
            log_frame_stats: false,
        }
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_file_round_trip() {
        let path = std::env::temp_dir().join(format!("stage2d_cfg_{}.toml", std::process::id()));
        let config = EngineConfig {
            window_size: [1280, 720],
            fps: 144,
            log_frame_stats: true,
        };
        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str("fps = 30").unwrap();
        assert_eq!(config.fps, 30);
        assert_eq!(config.window_size, EngineConfig::default().window_size);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = EngineConfig::default()
            .save_to_file("settings.yaml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "yaml"));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = EngineConfig::load_or_default("does_not_exist.toml");
        assert_eq!(config, EngineConfig::default());
    }
}
