//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and loading
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup checks that serde can't express

mod defaults;
mod types;
mod validation;

pub use types::{
    BotConfig, Config, ConfigError, DatabaseConfig, LoggingConfig, PermissionsConfig,
    ServerDefaults,
};
pub use validation::{ValidationError, validate};
