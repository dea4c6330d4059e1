//! Config file resolution.
//!
//! Precedence: explicit CLI path → `ET_CONFIG` → XDG config dir → defaults.
//! The first candidate that is set wins; an explicitly named file that does
//! not exist is an error, a missing XDG file is not.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::EngineConfig;
use crate::request::DatasetRequest;
use crate::validate::ValidationResult;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "ET_CONFIG";

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "eurostat_tables";

/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config {path}: {result}")]
    Invalid {
        path: PathBuf,
        result: ValidationResult,
    },
}

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli(PathBuf),
    Env(PathBuf),
    Xdg(PathBuf),
    Defaults,
}

/// Candidate config locations, in precedence order.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub cli: Option<PathBuf>,
    pub env: Option<PathBuf>,
    pub xdg: Option<PathBuf>,
}

impl ConfigPaths {
    /// Fill the env and XDG candidates from the running process.
    pub fn discover(cli: Option<PathBuf>) -> Self {
        let env = std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let xdg = dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
        Self { cli, env, xdg }
    }
}

/// Resolve and load the effective engine config.
pub fn resolve_config(paths: &ConfigPaths) -> Result<(EngineConfig, ConfigSource), ConfigError> {
    if let Some(path) = &paths.cli {
        return Ok((load_config_file(path)?, ConfigSource::Cli(path.clone())));
    }
    if let Some(path) = &paths.env {
        return Ok((load_config_file(path)?, ConfigSource::Env(path.clone())));
    }
    if let Some(path) = &paths.xdg {
        if path.is_file() {
            return Ok((load_config_file(path)?, ConfigSource::Xdg(path.clone())));
        }
    }
    Ok((EngineConfig::default(), ConfigSource::Defaults))
}

/// Load an engine config or a dataset request file from `path`.
///
/// A file with a top-level `dataset` key is read as a [`DatasetRequest`] and
/// overlaid onto the defaults.
pub fn load_config_file(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_err = |source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let raw: serde_json::Value = serde_json::from_str(&content).map_err(parse_err)?;

    let mut result = ValidationResult::default();
    let config = if raw.get("dataset").is_some() {
        let request: DatasetRequest = serde_json::from_value(raw).map_err(parse_err)?;
        result.merge(request.validate());
        request.apply_to(EngineConfig::default())
    } else {
        serde_json::from_value::<EngineConfig>(raw).map_err(parse_err)?
    };
    result.merge(config.validate());

    if !result.is_valid() {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            result,
        });
    }
    Ok(config)
}
