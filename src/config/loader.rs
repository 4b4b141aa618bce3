//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::EdgeConfig;
use crate::config::validation::{join_errors, validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<EdgeConfig, ConfigError> {
    parse_config_with(content, |_| {})
}

/// Parse configuration from TOML text, apply `overrides`, then validate.
pub fn parse_config_with(
    content: &str,
    overrides: impl FnOnce(&mut EdgeConfig),
) -> Result<EdgeConfig, ConfigError> {
    let mut config: EdgeConfig = toml::from_str(content)?;
    overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<EdgeConfig, ConfigError> {
    load_config_with(path, |_| {})
}

/// Load configuration from a TOML file, apply `overrides` (command line,
/// environment), then validate the result.
pub fn load_config_with(
    path: &Path,
    overrides: impl FnOnce(&mut EdgeConfig),
) -> Result<EdgeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_with(&content, overrides)
}

/// Read the not-found page override, if one is configured.
pub fn load_not_found_page(config: &EdgeConfig) -> Result<Option<String>, ConfigError> {
    match &config.not_found_page {
        Some(path) => fs::read_to_string(path)
            .map(Some)
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            }),
        None => Ok(None),
    }
}
