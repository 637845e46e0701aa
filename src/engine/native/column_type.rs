use std::fmt;

use crate::engine::errors::ConfigError;

pub const MAX_CHAR_LENGTH: usize = 65_000;
pub const MAX_LONG_LENGTH: usize = 32_000_000;
pub const MAX_NUMERIC_PRECISION: usize = 1_024;

const DEFAULT_CHAR_LENGTH: usize = 1;
const DEFAULT_VARCHAR_LENGTH: usize = 80;
const DEFAULT_LONG_LENGTH: usize = 1_048_576;
const DEFAULT_NUMERIC_PRECISION: usize = 37;
const DEFAULT_NUMERIC_SCALE: u32 = 15;

/// Target column types the NATIVE format can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Signed integer stored in 1, 2, 4 or 8 bytes
    Integer(u8),
    Boolean,
    Float64,
    /// Fixed byte width, space padded
    Char(usize),
    /// Variable width with a maximum byte length
    Varchar(usize),
    Date,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
    Interval,
    /// Fixed byte width, zero padded
    Binary(usize),
    Varbinary(usize),
    /// Shipped as decimal text and cast on the server side
    Numeric { precision: usize, scale: u32 },
}

impl ColumnType {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Integer(_) => "INTEGER",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Float64 => "FLOAT",
            ColumnType::Char(_) => "CHAR",
            ColumnType::Varchar(_) => "VARCHAR",
            ColumnType::Date => "DATE",
            ColumnType::Time => "TIME",
            ColumnType::TimeTz => "TIMETZ",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::TimestampTz => "TIMESTAMPTZ",
            ColumnType::Interval => "INTERVAL",
            ColumnType::Binary(_) => "BINARY",
            ColumnType::Varbinary(_) => "VARBINARY",
            ColumnType::Numeric { .. } => "NUMERIC",
        }
    }

    /// Columns that only accept date/time source values.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ColumnType::Date
                | ColumnType::Time
                | ColumnType::TimeTz
                | ColumnType::Timestamp
                | ColumnType::TimestampTz
        )
    }

    /// Maps a target column's declared type to a column type.
    ///
    /// `length` and `precision` are the column metadata as reported by the
    /// database; non-positive values fall back to the server defaults.
    pub fn from_target(type_name: &str, length: i32, precision: i32) -> Result<Self, ConfigError> {
        let normalized = type_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        let len_or = |default: usize| usize::try_from(length).ok().filter(|l| *l > 0).unwrap_or(default);

        let column_type = match normalized.as_str() {
            "INTEGER" | "INT" | "BIGINT" | "SMALLINT" | "TINYINT" | "INT8" => ColumnType::Integer(8),
            "BOOLEAN" => ColumnType::Boolean,
            "FLOAT" | "FLOAT8" | "REAL" | "DOUBLE PRECISION" => ColumnType::Float64,
            "CHAR" => ColumnType::Char(len_or(DEFAULT_CHAR_LENGTH)),
            "VARCHAR" => ColumnType::Varchar(len_or(DEFAULT_VARCHAR_LENGTH)),
            "LONG VARCHAR" => ColumnType::Varchar(len_or(DEFAULT_LONG_LENGTH)),
            "DATE" => ColumnType::Date,
            "TIME" => ColumnType::Time,
            "TIMETZ" => ColumnType::TimeTz,
            "TIMESTAMP" => ColumnType::Timestamp,
            "TIMESTAMPTZ" => ColumnType::TimestampTz,
            "INTERVAL" | "INTERVAL DAY TO SECOND" => ColumnType::Interval,
            "BINARY" => ColumnType::Binary(len_or(DEFAULT_CHAR_LENGTH)),
            "VARBINARY" => ColumnType::Varbinary(len_or(DEFAULT_VARCHAR_LENGTH)),
            "LONG VARBINARY" => ColumnType::Varbinary(len_or(DEFAULT_LONG_LENGTH)),
            "NUMERIC" | "DECIMAL" => ColumnType::Numeric {
                precision: len_or(DEFAULT_NUMERIC_PRECISION),
                scale: u32::try_from(precision)
                    .ok()
                    .filter(|_| length > 0)
                    .unwrap_or(DEFAULT_NUMERIC_SCALE),
            },
            _ => return Err(ConfigError::UnsupportedType(type_name.to_string())),
        };
        Ok(column_type)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer(width) => write!(f, "INTEGER({width} bytes)"),
            ColumnType::Char(n) | ColumnType::Varchar(n) | ColumnType::Binary(n) | ColumnType::Varbinary(n) => {
                write!(f, "{}({n})", self.name())
            }
            ColumnType::Numeric { precision, scale } => write!(f, "NUMERIC({precision},{scale})"),
            other => f.write_str(other.name()),
        }
    }
}
