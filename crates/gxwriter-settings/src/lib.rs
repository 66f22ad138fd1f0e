//! GXWriter Settings Crate
//!
//! Handles converter configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{Config, OutputSettings, PreviewSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
