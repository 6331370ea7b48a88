//! # solace-settings
//!
//! Layered configuration for the Solace server.
//!
//! Settings are resolved from three layers, lowest priority first:
//! 1. **Compiled defaults**: [`SolaceSettings::default()`]
//! 2. **User file**: `~/.solace/settings.json` or an explicit path, deep-merged
//!    over the defaults
//! 3. **Environment**: `SOLACE_*` variables

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, load_settings, load_settings_from_path,
    settings_path,
};
pub use types::{ChatSettings, LoggingSettings, ServerSettings, SolaceSettings};
