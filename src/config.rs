use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".coffee-catalog";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "coffee.sqlite";
const LOG_FILE_NAME: &str = "coffee-catalog.log";
const DEFAULT_LOG_FILTER: &str = "info";

/// User settings, read from `~/.coffee-catalog/config.toml`. Every key is
/// optional; a missing file means "all defaults".
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Override for the SQLite file location.
    pub database_path: Option<PathBuf>,
    /// `tracing` filter directive, e.g. `"debug"` or `"coffee_catalog=trace"`.
    pub log_filter: Option<String>,
}

impl Config {
    /// Load the config from the default location inside the data directory.
    pub fn load() -> Result<Self> {
        Self::load_from(&data_dir()?.join(CONFIG_FILE_NAME))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(DB_FILE_NAME)),
        }
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        Ok(data_dir()?.join(LOG_FILE_NAME))
    }
}

/// Resolve `~/.coffee-catalog`.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
