//! GCodeMacro Settings Crate
//!
//! Handles application configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{Config, LoggingSettings, MacroSettings, UiSettings, CONFIG_FILE_NAME};
pub use error::{ConfigError, SettingsError, SettingsResult};
