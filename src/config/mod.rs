//! Configuration module - engine settings and user preferences
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, FocusConfig, etc.)
//! - `loader` - File system loading and saving
//!
//! A [`Config`] is always passed explicitly to the components that need it;
//! nothing in the crate reads settings from a global.

mod defaults;
mod loader;
mod types;

pub use defaults::*;

pub use types::{
    CaptureConfig, CategoryWeights, Config, DedupeConfig, FocusConfig, HistoryConfig,
    LanguageIde, PersistenceConfig, SecretSafeConfig,
};

pub use loader::{default_config_path, default_database_path, load_config, save_config};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
