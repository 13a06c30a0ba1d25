// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TreewatchError};
use crate::types::parse_duration;
use crate::watch::patterns::{PatternFilter, PatternSpec};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TreewatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let debounce = section_duration("[watch].debounce", &raw.watch.debounce)?;
        let idle_interval = section_duration("[watch].idle_interval", &raw.watch.idle_interval)?;
        validate_idle_interval(idle_interval)?;

        let root = raw.watch.root.unwrap_or_else(|| PathBuf::from("."));
        let patterns = PatternSpec::from(raw.filter);
        validate_patterns(&root, &patterns)?;

        Ok(ConfigFile::new_unchecked(
            root,
            debounce,
            idle_interval,
            raw.watch.on_close,
            patterns,
        ))
    }
}

fn section_duration(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value).map_err(|e| TreewatchError::ConfigError(format!("{field}: {e}")))
}

pub fn validate_idle_interval(interval: Duration) -> Result<()> {
    if interval.is_zero() {
        return Err(TreewatchError::ConfigError(
            "[watch].idle_interval must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Compile the globs once so broken patterns surface at load time.
pub fn validate_patterns(root: &std::path::Path, patterns: &PatternSpec) -> Result<()> {
    PatternFilter::new(root, patterns)?;
    Ok(())
}
