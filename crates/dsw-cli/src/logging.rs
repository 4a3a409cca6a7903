//! Logging bootstrap.
//!
//! The gateway logs JSON lines to stdout and to a daily-rotated file
//! `<log_dir>/<adapter>-mcp.log.<date>`. Other subcommands log plain text
//! to stderr so their stdout stays machine-readable.

use std::fs;

use anyhow::Context;
use dsw_core::AdapterConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the filter: `--verbose` wins, then `RUST_LOG`, then the configured level.
fn filter(verbose: bool, level: &str) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the gateway subscriber. Keep the returned guard alive for the
/// life of the process or buffered file output is lost.
pub fn init_server(config: &AdapterConfig, verbose: bool) -> anyhow::Result<WorkerGuard> {
    fs::create_dir_all(&config.log_dir).with_context(|| {
        format!(
            "Failed to create log directory {}",
            config.log_dir.display()
        )
    })?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.log_file_name())
        .build(&config.log_dir)
        .context("Failed to create log file appender")?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = fmt::layer().json().with_writer(std::io::stdout);
    let file_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(filter(verbose, &config.log_level))
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        adapter = %config.kind,
        log_dir = %config.log_dir.display(),
        level = %config.log_level,
        "Logger initialized"
    );
    Ok(guard)
}

/// Plain stderr logging for the non-server subcommands.
pub fn init_cli(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose, "warn"))
        .with_writer(std::io::stderr)
        .init();
}
