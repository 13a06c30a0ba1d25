// src/watch/patterns.rs

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::Result;
use crate::watch::event::{ChangeKind, RawEvent};
use crate::watch::filter::EventFilter;
use crate::watch::path_utils::relative_str;

/// Uncompiled include/exclude/kind lists, as they come from the
/// config file or the command line.
///
/// ```toml
/// [filter]
/// include = ["src/**/*.rs"]
/// exclude = ["src/generated/**"]
/// kinds = ["create", "write"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSpec {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub kinds: Vec<ChangeKind>,
}

impl PatternSpec {
    /// True when nothing is restricted.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty() && self.kinds.is_empty()
    }
}

/// Compiled glob + kind filter.
///
/// Globs are evaluated against the event path relative to `root`, using
/// forward slashes (e.g. `"src/main.rs"`).
///
/// - An empty include list accepts every path, including paths outside root.
/// - A non-empty include list only accepts paths under root that match it.
/// - Exclude patterns always win over include patterns.
/// - An empty kind list accepts every kind.
#[derive(Clone)]
pub struct PatternFilter {
    root: PathBuf,
    include_set: Option<GlobSet>,
    exclude_set: Option<GlobSet>,
    kinds: Option<HashSet<ChangeKind>>,
}

impl fmt::Debug for PatternFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternFilter")
            .field("root", &self.root)
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

impl PatternFilter {
    pub fn new(root: impl Into<PathBuf>, spec: &PatternSpec) -> Result<Self> {
        let include_set = optional_globset(&spec.include)?;
        let exclude_set = optional_globset(&spec.exclude)?;
        let kinds = if spec.kinds.is_empty() {
            None
        } else {
            Some(spec.kinds.iter().copied().collect())
        };

        Ok(Self {
            root: root.into(),
            include_set,
            exclude_set,
            kinds,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn matches(&self, event: &RawEvent) -> bool {
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&event.kind) {
                return false;
            }
        }

        let rel = relative_str(&self.root, &event.path);

        if let Some(exclude) = &self.exclude_set {
            if rel.as_deref().is_some_and(|r| exclude.is_match(r)) {
                return false;
            }
        }

        match (&self.include_set, rel) {
            (None, _) => true,
            (Some(include), Some(rel)) => include.is_match(&rel),
            (Some(_), None) => false,
        }
    }

    /// Wrap this filter into an [`EventFilter`] for the dispatch loop.
    pub fn into_event_filter(self) -> EventFilter {
        EventFilter::new(move |event| self.matches(event))
    }
}

fn optional_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(Some(builder.build()?))
}
