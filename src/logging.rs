//! Tracing subscriber setup for the binary.
//!
//! Filter comes from `LEETMATE_LOG`, then `RUST_LOG`, then the verbosity
//! default. Logs go to stderr (stdout carries rendered output) and, when a
//! file is given, also to that file through a non-blocking writer.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

pub const LOG_ENV: &str = "LEETMATE_LOG";

/// Filter directive used when no env override is set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "leetmate_render=debug,warn"
    } else {
        "warn"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    let from_env = dotenvy::var(LOG_ENV)
        .ok()
        .or_else(|| dotenvy::var("RUST_LOG").ok())
        .and_then(|s| EnvFilter::try_new(s).ok());
    from_env.unwrap_or_else(|| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered file output is flushed.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}
