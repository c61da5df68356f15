//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::defaults::*;
use super::validation::{ValidationError, validate};
use crate::casemap::Casemapping;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<ValidationError>),
}

/// Bot configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    /// Values assumed until the server announces its own.
    #[serde(default)]
    pub server: ServerDefaults,
    #[serde(default)]
    pub permissions: PermissionsConfig,
    /// Persistent storage. Absent means rosters live in memory only.
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// Bot identity.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Namespace for this bot's stored rosters and meetings.
    #[serde(default = "default_bot_name")]
    pub name: String,
    /// Nickname the bot registers with. Defaults to `name`.
    pub nick: Option<String>,
}

impl BotConfig {
    pub fn nick(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.name)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            nick: None,
        }
    }
}

/// ISUPPORT values assumed before the server's 005 arrives.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerDefaults {
    #[serde(default)]
    pub casemapping: Casemapping,
    /// `PREFIX` value, e.g. `(ov)@+`.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// `CHANTYPES` value, e.g. `#&`.
    #[serde(default = "default_chantypes")]
    pub chantypes: String,
}

impl Default for ServerDefaults {
    fn default() -> Self {
        Self {
            casemapping: Casemapping::default(),
            prefix: default_prefix(),
            chantypes: default_chantypes(),
        }
    }
}

/// Who counts as an admin or a voter.
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionsConfig {
    /// Prefix symbols tried in order; the first one the server has becomes
    /// the lowest admin rank.
    #[serde(default = "default_admin_markers")]
    pub admin_markers: Vec<char>,
    /// Mode letter of the voice rank.
    #[serde(default = "default_voice_mode")]
    pub voice_mode: char,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            admin_markers: default_admin_markers(),
            voice_mode: default_voice_mode(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file, or `:memory:`.
    pub path: String,
}

/// Logging configuration. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
