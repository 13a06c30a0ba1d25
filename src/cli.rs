// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::types::parse_duration;
use crate::watch::event::ChangeKind;

/// Command-line arguments for `treewatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "treewatch",
    version,
    about = "Watch a directory tree and print one line per changed path.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory tree to watch. Overrides `[watch].root`.
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Path to a config file (TOML).
    ///
    /// Default: `Treewatch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debounce quiet period per path, e.g. `250ms`. `0ms` prints every raw
    /// event.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub debounce: Option<Duration>,

    /// Log an idle line after this long without activity.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub idle_interval: Option<Duration>,

    /// Only report paths matching this glob (relative to ROOT). Repeatable.
    #[arg(long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Never report paths matching this glob (relative to ROOT). Repeatable.
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Only report these change kinds (create, write, remove, rename, chmod,
    /// access, other). Repeatable.
    #[arg(long = "kind", value_name = "KIND", value_parser = ChangeKind::from_str)]
    pub kinds: Vec<ChangeKind>,

    /// On shutdown, report paths whose quiet period has not elapsed yet
    /// instead of dropping them.
    #[arg(long)]
    pub flush_on_close: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TREEWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the effective configuration, but don't watch.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
