#![allow(dead_code)]

use std::path::PathBuf;

use treewatch::config::{ConfigFile, FilterSection, RawConfigFile, WatchSection};
use treewatch::types::ClosePolicy;
use treewatch::watch::ChangeKind;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                watch: WatchSection::default(),
                filter: FilterSection::default(),
            },
        }
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.watch.root = Some(root.into());
        self
    }

    pub fn debounce(mut self, value: &str) -> Self {
        self.config.watch.debounce = value.to_string();
        self
    }

    pub fn idle_interval(mut self, value: &str) -> Self {
        self.config.watch.idle_interval = value.to_string();
        self
    }

    pub fn on_close(mut self, policy: ClosePolicy) -> Self {
        self.config.watch.on_close = policy;
        self
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.config.filter.include.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.filter.exclude.push(pattern.to_string());
        self
    }

    pub fn kind(mut self, kind: ChangeKind) -> Self {
        self.config.filter.kinds.push(kind);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
