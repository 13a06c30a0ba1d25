// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file and return the raw, unvalidated model.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load, validate, and resolve a relative `[watch].root` against the
/// directory containing the config file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let mut config = ConfigFile::try_from(raw_config)?;

    if config.root.is_relative() {
        if let Some(dir) = config_dir(path) {
            config.root = dir.join(&config.root);
        }
    }

    Ok(config)
}

/// Config file picked up from the working directory when `--config` is not
/// given.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Treewatch.toml")
}

/// Directory holding the config file, or `None` for a bare file name.
fn config_dir(config_path: &Path) -> Option<&Path> {
    config_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}
