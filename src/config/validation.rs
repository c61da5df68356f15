//! Configuration validation.
//!
//! Catches settings serde accepts but the engine can't use.

use super::Config;
use crate::isupport::PrefixSpec;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bot.name is required")]
    MissingBotName,
    #[error("server.prefix is not a valid PREFIX value: {0:?}")]
    InvalidPrefix(String),
    #[error("server.chantypes must not be empty")]
    EmptyChantypes,
    #[error("permissions.admin_markers must not be empty")]
    NoAdminMarkers,
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bot.name.is_empty() {
        errors.push(ValidationError::MissingBotName);
    }

    if PrefixSpec::parse(&config.server.prefix).is_none() {
        errors.push(ValidationError::InvalidPrefix(config.server.prefix.clone()));
    }
    if config.server.chantypes.is_empty() {
        errors.push(ValidationError::EmptyChantypes);
    }

    if config.permissions.admin_markers.is_empty() {
        errors.push(ValidationError::NoAdminMarkers);
    }

    if let Some(ref db) = config.database
        && db.path != ":memory:"
    {
        let db_path = Path::new(&db.path);
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ValidationError::DatabasePathInvalid(db.path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_bad_prefix_fails() {
        let config: Config = toml::from_str("[server]\nprefix = \"(ov\"\n").unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidPrefix(_))));
    }

    #[test]
    fn test_empty_markers_fail() {
        let config: Config = toml::from_str("[permissions]\nadmin_markers = []\n").unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::NoAdminMarkers)));
    }

    #[test]
    fn test_missing_database_dir_fails() {
        let config: Config =
            toml::from_str("[database]\npath = \"/nonexistent/dir/motions.db\"\n").unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DatabasePathInvalid(_))));
    }

    #[test]
    fn test_collects_every_error() {
        let config: Config = toml::from_str(
            "[bot]\nname = \"\"\n[server]\nchantypes = \"\"\n[permissions]\nadmin_markers = []\n",
        )
        .unwrap();
        assert_eq!(validate(&config).unwrap_err().len(), 3);
    }
}
