//! Configuration management for `Keywarden`
//!
//! This module provides the `ConfigManager` for loading and saving
//! configuration files in TOML format.

mod manager;
pub mod settings;

pub use manager::ConfigManager;
pub use settings::{
    AppSettings, DEFAULT_NAMESPACE, DEFAULT_PRESENCE_COMMAND, DEFAULT_USERNAME,
    DEFAULT_VERIFICATION_MESSAGE, LoggingSettings, PresenceSettings, StoreSettings, VaultSettings,
};
