//! Configuration for the GX converter
//!
//! Supports JSON and TOML files, chosen by extension. Sections:
//! - Header constants written into every container
//! - Preview request size and encoder window
//! - Output file type

use gxwriter_core::{HeaderConstants, PreviewOptions, Window, GX_MIME_NAME, GX_SUFFIX};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsResult};

/// Preview settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Width requested from the renderer
    pub width: u32,
    /// Height requested from the renderer
    pub height: u32,
    /// Region of the rendered image to encode
    pub window: Window,
    /// Write the encoded M4010 preview commands next to the output file
    pub write_commands: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        let defaults = PreviewOptions::default();
        Self {
            width: defaults.width,
            height: defaults.height,
            window: defaults.window,
            write_commands: false,
        }
    }
}

impl PreviewSettings {
    pub fn options(&self) -> PreviewOptions {
        PreviewOptions {
            width: self.width,
            height: self.height,
            window: self.window,
        }
    }
}

/// Output file type settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Suffix given to converted files
    pub suffix: String,
    /// MIME type name of converted files
    pub mime_name: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            suffix: GX_SUFFIX.to_string(),
            mime_name: GX_MIME_NAME.to_string(),
        }
    }
}

/// Complete converter configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Constant header fields
    pub header: HeaderConstants,
    /// Preview settings
    pub preview: PreviewSettings,
    /// Output settings
    pub output: OutputSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location: `<config dir>/gxwriter/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string())
        })?;
        Ok(dir.join("gxwriter").join("config.toml"))
    }

    /// Load `path` if given, else the default file if it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Ok(path) if path.is_file() => Self::load_from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview.width == 0 || self.preview.height == 0 {
            return Err(out_of_range(
                "preview.size",
                format!("{}x{}", self.preview.width, self.preview.height),
            ));
        }

        let window = &self.preview.window;
        if window.start_x > window.end_x || window.start_y > window.end_y {
            return Err(out_of_range("preview.window", format!("{:?}", window)));
        }

        if self.header.print_speed == 0 {
            return Err(out_of_range("header.print_speed", "0".to_string()));
        }

        if self.output.suffix.is_empty() {
            return Err(out_of_range("output.suffix", String::new()));
        }

        Ok(())
    }
}

fn out_of_range(key: &str, value: String) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value,
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.preview.options(), PreviewOptions::default());
        assert_eq!(config.output.suffix, "gx");
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let mut config = Config::default();
        config.preview.window = Window::new(50, 0, 10, 60);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange { key, .. }) if key == "preview.window"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_preview() {
        let mut config = Config::default();
        config.preview.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_extension() {
        assert!(matches!(
            Format::of(Path::new("config.yaml")),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
    }
}
