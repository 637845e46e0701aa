use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub load: LoadConfig,
    pub target: TargetConfig,
    pub logging: LoggingConfig,
    pub time: Option<crate::shared::datetime::time::TimeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadConfig {
    /// Rows buffered by the encoder between pushes into the pipe
    #[serde(default = "default_rows_per_flush")]
    pub rows_per_flush: usize,
    /// Bytes the pipe holds before the producer blocks
    #[serde(default = "default_pipe_capacity")]
    pub pipe_capacity: usize,
    #[serde(default)]
    pub abort_on_error: bool,
    /// Upper bound for joining the load worker after a stop request
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
    /// Log a progress line every N rows (0 = never)
    #[serde(default)]
    pub feedback_size: u64,
    pub exceptions_file: Option<String>,
    pub rejected_file: Option<String>,
    #[serde(default)]
    pub direct: bool,
    pub stream_name: Option<String>,
}

fn default_rows_per_flush() -> usize {
    500
}

fn default_pipe_capacity() -> usize {
    64 * 1024
}

fn default_stop_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub schema: Option<String>,
    pub table: String,
    pub columns: Vec<TargetColumnConfig>,
    /// Explicit stream field -> table column pairs; empty maps the whole row
    #[serde(default)]
    pub fields: Vec<FieldPairConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetColumnConfig {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub length: i32,
    #[serde(default)]
    pub precision: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldPairConfig {
    pub stream: String,
    pub column: String,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("VERTICA_NATIVE_CONFIG").unwrap_or_else(|_| "config".to_string());
    load_settings_from(&config_path)
}

pub fn load_settings_from(config_path: &str) -> Result<Settings, config::ConfigError> {
    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(config_path))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
