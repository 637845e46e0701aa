use std::io;
use thiserror::Error;
use tracing::{debug, error};

use crate::engine::native::ColumnType;
use crate::engine::types::ValueKind;

/// Errors raised while turning target-table metadata into column specs.
/// All of them are fatal: the load never starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Column type {0} not supported")]
    UnsupportedType(String),

    #[error("Invalid byte size {0} for Integer type")]
    InvalidIntegerWidth(u8),

    #[error("Invalid width {width} for {type_name} column")]
    InvalidWidth { type_name: &'static str, width: usize },

    #[error("Field {field} must be a Date compatible type to match target column {column}")]
    TemporalSourceRequired { field: String, column: String },

    #[error("Input field {0} not found in incoming row")]
    FieldNotFound(String),

    #[error("Target column {0} not found in table metadata")]
    ColumnNotFound(String),

    #[error("No columns to load")]
    EmptyColumns,

    #[error("{count} columns exceed the NATIVE limit of {max}")]
    TooManyColumns { count: usize, max: usize },

    #[error("Row max size {row_max_size} exceeds buffer ceiling {ceiling}")]
    RowTooLarge { row_max_size: usize, ceiling: usize },
}

/// A single value could not be encoded for its column.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    #[error("{expected} column cannot accept a {found} value")]
    TypeMismatch {
        expected: ColumnType,
        found: ValueKind,
    },

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Value of {actual} bytes exceeds column limit of {limit} bytes")]
    TooLong { limit: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Column {column}: {source}")]
    Value {
        column: usize,
        #[source]
        source: ValueError,
    },

    #[error("Invalid incoming row for given column spec: expected {expected} values, got {actual}")]
    RowTooShort { expected: usize, actual: usize },

    #[error("Header already written")]
    HeaderAlreadyWritten,

    #[error("Header must be written before rows")]
    HeaderMissing,

    #[error("Encoder already closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl EncodeError {
    /// Per-row failures: the row is dropped (or the load aborted by policy)
    /// but the stream itself stays consistent.
    pub fn is_row_level(&self) -> bool {
        matches!(self, EncodeError::Value { .. })
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Stream cancelled")]
    Cancelled,

    #[error("Load rejected by sink: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SinkError {
    pub fn is_cancellation(&self) -> bool {
        match self {
            SinkError::Cancelled => true,
            SinkError::Io(e) => crate::engine::pipe::is_cancellation(e),
            SinkError::Rejected(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Load worker failed: {0}")]
    WorkerFailed(String),

    #[error("Failed to spawn load worker: {0}")]
    Spawn(io::Error),

    #[error("Load stopped")]
    Stopped,

    #[error("Rejection log error: {0}")]
    RejectionLog(io::Error),

    #[error("Invalid input row: {0}")]
    Input(String),
}

impl LoadError {
    pub fn log_error(&self) {
        match self {
            LoadError::Config(e) => {
                error!("Load configuration failed: {}", e);
                debug!("Configuration error details: {:?}", e);
            }
            LoadError::Encode(e) => {
                error!("Because of an error, this load can't continue: {}", e);
                debug!("Encode error details: {:?}", e);
            }
            LoadError::Sink(e) => {
                error!("Bulk load sink failed: {}", e);
                debug!("Sink error details: {:?}", e);
            }
            LoadError::WorkerFailed(e) => {
                error!("Load worker failed: {}", e);
            }
            LoadError::Spawn(e) => {
                error!("Failed to spawn load worker: {}", e);
                debug!("Spawn error details: {:?}", e);
            }
            LoadError::Stopped => {
                debug!("Load stopped on request");
            }
            LoadError::RejectionLog(e) => {
                error!("Rejection log write failed: {}", e);
            }
            LoadError::Input(e) => {
                error!("Unreadable input row: {}", e);
            }
        }
    }
}
