// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_and_validate};
use crate::config::model::ConfigFile;
use crate::config::validate::{validate_idle_interval, validate_patterns};
use crate::logging::TracingLog;
use crate::types::ClosePolicy;
use crate::watch::{RawEvent, Watcher, dispatch};

/// How long Ctrl-C waits for the watch loop to wind down (and flush, if
/// configured) before giving up on it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + command-line overrides
/// - the notify-backed watcher and recursive registration
/// - plain or debounced dispatch, printing each event to stdout
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = resolve_config(&args)?;
    apply_overrides(&mut cfg, &args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let options = cfg.watch_options(Arc::new(TracingLog))?;
    let mut watcher = Watcher::new(options)?;
    let registered = watcher
        .add_recursive(&cfg.root)
        .with_context(|| format!("registering {:?}", cfg.root))?;
    info!(root = ?cfg.root, registered, debounce = ?cfg.debounce, "treewatch started");

    // Keep the source here so Ctrl-C can close the streams by dropping it.
    let (source, streams, options) = watcher.into_parts();
    let debounced = cfg.is_debounced();
    let mut loop_task = tokio::spawn(async move {
        if debounced {
            dispatch::watch_dedup(streams, &options, print_event).await
        } else {
            dispatch::watch(streams, &options, print_event).await
        }
    });

    tokio::select! {
        res = &mut loop_task => {
            let end = res.context("watch loop panicked")?;
            info!(?end, "watch loop ended");
        }
        res = tokio::signal::ctrl_c() => {
            res.context("listening for Ctrl+C")?;
            info!("Ctrl+C received; stopping watcher");
            drop(source);
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut loop_task).await {
                Ok(res) => {
                    let end = res.context("watch loop panicked")?;
                    debug!(?end, "watch loop stopped");
                }
                Err(_) => {
                    warn!("watch loop did not stop in time; aborting");
                    loop_task.abort();
                }
            }
        }
    }

    Ok(())
}

fn print_event(event: RawEvent) {
    println!("{event}");
}

/// Use `--config` if given, else `Treewatch.toml` if it exists, else
/// built-in defaults.
fn resolve_config(args: &CliArgs) -> Result<ConfigFile> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => {
            let default = default_config_path();
            if !default.exists() {
                debug!("no config file; using defaults");
                return Ok(ConfigFile::default());
            }
            default
        }
    };

    load_and_validate(&path).with_context(|| format!("loading config {:?}", path))
}

/// Command-line flags win over the config file.
fn apply_overrides(cfg: &mut ConfigFile, args: &CliArgs) -> Result<()> {
    if let Some(root) = &args.root {
        cfg.root = root.clone();
    }
    if let Some(debounce) = args.debounce {
        cfg.debounce = debounce;
    }
    if let Some(interval) = args.idle_interval {
        validate_idle_interval(interval)?;
        cfg.idle_interval = interval;
    }
    if !args.include.is_empty() {
        cfg.patterns.include = args.include.clone();
    }
    if !args.exclude.is_empty() {
        cfg.patterns.exclude = args.exclude.clone();
    }
    if !args.kinds.is_empty() {
        cfg.patterns.kinds = args.kinds.clone();
    }
    if args.flush_on_close {
        cfg.on_close = ClosePolicy::Flush;
    }

    // Root may have moved, and patterns may have been replaced.
    cfg.root = absolute_root(&cfg.root);
    validate_patterns(&cfg.root, &cfg.patterns)?;
    Ok(())
}

/// Canonicalize once so event paths and glob matching share a base.
fn absolute_root(root: &Path) -> PathBuf {
    root.canonicalize().unwrap_or_else(|_| root.to_path_buf())
}

/// Simple dry-run output: print the effective configuration.
fn print_dry_run(cfg: &ConfigFile) {
    println!("treewatch dry-run");
    println!("  root = {}", cfg.root.display());
    if cfg.is_debounced() {
        println!("  debounce = {:?}", cfg.debounce);
    } else {
        println!("  debounce = off");
    }
    println!("  idle_interval = {:?}", cfg.idle_interval);
    println!("  on_close = {:?}", cfg.on_close);
    if !cfg.patterns.include.is_empty() {
        println!("  include: {:?}", cfg.patterns.include);
    }
    if !cfg.patterns.exclude.is_empty() {
        println!("  exclude: {:?}", cfg.patterns.exclude);
    }
    if !cfg.patterns.kinds.is_empty() {
        let kinds: Vec<&str> = cfg.patterns.kinds.iter().map(|k| k.as_str()).collect();
        println!("  kinds: {kinds:?}");
    }

    debug!("dry-run complete (no watching)");
}
