//! CLI command implementations.

pub mod chat;
pub mod config;
pub mod leaderboard;
pub mod report;
pub mod task;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use focushive_core::{HiveConfig, JsonFileStore, Result};

/// Opens the document store, honouring `--data-dir`.
pub(crate) fn open_store(data_dir: Option<&Path>) -> Result<Arc<JsonFileStore>> {
    let store = match data_dir {
        Some(dir) => JsonFileStore::open(dir)?,
        None => JsonFileStore::open_default()?,
    };
    Ok(Arc::new(store))
}

/// Where the config file lives, honouring `--data-dir`.
pub(crate) fn config_path(data_dir: Option<&Path>) -> Result<PathBuf> {
    match data_dir {
        Some(dir) => Ok(dir.join("config.toml")),
        None => Ok(HiveConfig::default_path()?),
    }
}

/// Loads the configuration, writing the default file on first run.
pub(crate) fn load_config(data_dir: Option<&Path>) -> Result<HiveConfig> {
    Ok(HiveConfig::load_from(&config_path(data_dir)?)?)
}
