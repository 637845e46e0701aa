use std::fs;
use std::path::Path;

use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::shared::config::{CONFIG, LoggingConfig};

const LOG_FILE_PREFIX: &str = "vertica_native.log";

/// Stdout and file levels, in that order.
pub fn level_filters(cfg: &LoggingConfig) -> anyhow::Result<(LevelFilter, LevelFilter)> {
    let stdout = cfg
        .stdout_level
        .parse::<LevelFilter>()
        .map_err(|e| anyhow::anyhow!("logging.stdout_level '{}': {e}", cfg.stdout_level))?;
    let file = cfg
        .file_level
        .parse::<LevelFilter>()
        .map_err(|e| anyhow::anyhow!("logging.file_level '{}': {e}", cfg.file_level))?;
    Ok((stdout, file))
}

/// Creates the log directory if it is missing.
pub fn prepare_log_dir(cfg: &LoggingConfig) -> anyhow::Result<&Path> {
    let dir = Path::new(&cfg.log_dir);
    fs::create_dir_all(dir).map_err(|e| anyhow::anyhow!("log directory {}: {e}", dir.display()))?;
    Ok(dir)
}

pub fn init() -> anyhow::Result<()> {
    init_with(&CONFIG.logging)
}

/// Installs the global subscriber: a terse stdout layer and a daily rolling
/// file that also records thread names, so worker lines can be told apart
/// from the producer's.
pub fn init_with(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let (stdout_filter, file_filter) = level_filters(cfg)?;
    let dir = prepare_log_dir(cfg)?;

    let stdout_layer = fmt::layer()
        .with_ansi(true)
        .with_target(false)
        .with_filter(stdout_filter);

    let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(file_appender)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    info!(
        target: "logging::init",
        log_dir = %dir.display(),
        stdout_level = %stdout_filter,
        file_level = %file_filter,
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
pub fn init_for_tests() {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive("vertica_native=debug".parse().unwrap());

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .with_test_writer()
            .init();
    });
}

#[cfg(test)]
#[path = "logging_test.rs"]
mod logging_test;
