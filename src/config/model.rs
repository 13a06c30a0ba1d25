// src/config/model.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::Result;
use crate::logging::WatchLog;
use crate::types::ClosePolicy;
use crate::watch::event::ChangeKind;
use crate::watch::options::WatchOptions;
use crate::watch::patterns::{PatternFilter, PatternSpec};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [watch]
/// root = "src"
/// debounce = "100ms"
/// idle_interval = "2s"
/// on_close = "flush"
///
/// [filter]
/// include = ["**/*.rs"]
/// exclude = ["generated/**"]
/// kinds = ["create", "write"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub filter: FilterSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Directory tree to watch. Relative paths are resolved against the
    /// directory holding the config file. Defaults to that directory.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Debounce quiet period, e.g. `"100ms"`. `"0ms"` disables debouncing
    /// and delivers every raw event.
    #[serde(default = "default_debounce")]
    pub debounce: String,

    /// How long without activity before an idle line is logged.
    #[serde(default = "default_idle_interval")]
    pub idle_interval: String,

    /// `"discard"` (default) or `"flush"`: what to do with pending debounced
    /// events when watching stops.
    #[serde(default)]
    pub on_close: ClosePolicy,
}

fn default_debounce() -> String {
    "100ms".to_string()
}

fn default_idle_interval() -> String {
    "2s".to_string()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            root: None,
            debounce: default_debounce(),
            idle_interval: default_idle_interval(),
            on_close: ClosePolicy::default(),
        }
    }
}

/// `[filter]` section. Empty lists mean "no restriction".
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FilterSection {
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub kinds: Vec<ChangeKind>,
}

impl From<FilterSection> for PatternSpec {
    fn from(section: FilterSection) -> Self {
        PatternSpec {
            include: section.include,
            exclude: section.exclude,
            kinds: section.kinds,
        }
    }
}

/// Validated configuration.
///
/// Obtained through `ConfigFile::try_from(RawConfigFile)` or
/// [`crate::config::load_and_validate`]. Fields stay public so command-line
/// flags can override them afterwards.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub root: PathBuf,
    pub debounce: Duration,
    pub idle_interval: Duration,
    pub on_close: ClosePolicy,
    pub patterns: PatternSpec,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            debounce: crate::watch::options::DEFAULT_DEBOUNCE,
            idle_interval: crate::watch::options::DEFAULT_IDLE_INTERVAL,
            on_close: ClosePolicy::default(),
            patterns: PatternSpec::default(),
        }
    }
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        root: PathBuf,
        debounce: Duration,
        idle_interval: Duration,
        on_close: ClosePolicy,
        patterns: PatternSpec,
    ) -> Self {
        Self {
            root,
            debounce,
            idle_interval,
            on_close,
            patterns,
        }
    }

    /// Whether events go through the debouncer.
    pub fn is_debounced(&self) -> bool {
        !self.debounce.is_zero()
    }

    /// Compile the `[filter]` patterns. `None` when nothing is restricted.
    pub fn pattern_filter(&self) -> Result<Option<PatternFilter>> {
        if self.patterns.is_empty() {
            return Ok(None);
        }
        PatternFilter::new(&self.root, &self.patterns).map(Some)
    }

    /// Build the options the watch loop runs with.
    pub fn watch_options(&self, log: Arc<dyn WatchLog>) -> Result<WatchOptions> {
        let mut options = WatchOptions::default()
            .with_debounce(self.debounce)
            .with_idle_interval(self.idle_interval)
            .with_on_close(self.on_close)
            .with_log(log);
        if let Some(filter) = self.pattern_filter()? {
            options = options.with_filter(filter.into_event_filter());
        }
        Ok(options)
    }
}
