use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::engine::errors::{ConfigError, ValueError};
use crate::engine::native::column_type::{
    ColumnType, MAX_CHAR_LENGTH, MAX_LONG_LENGTH, MAX_NUMERIC_PRECISION,
};
use crate::engine::types::FieldValue;
use crate::shared::datetime::epoch::{
    EPOCH_DAY_NUMBER, MICROS_PER_DAY, days_since_epoch, micros_since_epoch,
    micros_since_midnight, pack_time_tz,
};
use crate::shared::datetime::time::TimeParser;

const BYTE_SPACE: u8 = 0x20;
const LENGTH_PREFIX: usize = 4;

/// Binary encoding descriptor of one target column.
///
/// Built once per column when the stream opens. `declared_width` is what the
/// stream header announces for the column (-1 for variable width) and
/// `max_length` bounds the payload for buffer planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    column_type: ColumnType,
    declared_width: i32,
    max_length: usize,
    scale: u32,
}

impl ColumnSpec {
    pub const VARIABLE_WIDTH: i32 = -1;

    pub fn new(column_type: ColumnType) -> Result<Self, ConfigError> {
        let (declared_width, max_length, scale) = match column_type {
            ColumnType::Integer(width) => {
                if !matches!(width, 1 | 2 | 4 | 8) {
                    return Err(ConfigError::InvalidIntegerWidth(width));
                }
                (i32::from(width), usize::from(width), 0)
            }
            ColumnType::Boolean => (1, 1, 0),
            ColumnType::Float64
            | ColumnType::Date
            | ColumnType::Time
            | ColumnType::TimeTz
            | ColumnType::Timestamp
            | ColumnType::TimestampTz
            | ColumnType::Interval => (8, 8, 0),
            ColumnType::Char(width) | ColumnType::Binary(width) => {
                if width == 0 || width > MAX_CHAR_LENGTH {
                    return Err(ConfigError::InvalidWidth {
                        type_name: column_type.name(),
                        width,
                    });
                }
                (width as i32, width, 0)
            }
            ColumnType::Varchar(max) | ColumnType::Varbinary(max) => {
                if max > MAX_LONG_LENGTH {
                    return Err(ConfigError::InvalidWidth {
                        type_name: column_type.name(),
                        width: max,
                    });
                }
                (Self::VARIABLE_WIDTH, max, 0)
            }
            ColumnType::Numeric { precision, scale } => {
                if precision == 0 || precision > MAX_NUMERIC_PRECISION || scale as usize > precision {
                    return Err(ConfigError::InvalidWidth {
                        type_name: column_type.name(),
                        width: precision,
                    });
                }
                // Digits plus sign and decimal point.
                (Self::VARIABLE_WIDTH, precision + 2, scale)
            }
        };

        Ok(Self {
            column_type,
            declared_width,
            max_length,
            scale,
        })
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn declared_width(&self) -> i32 {
        self.declared_width
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_variable(&self) -> bool {
        self.declared_width == Self::VARIABLE_WIDTH
    }

    /// Worst-case bytes this column adds to a row.
    pub fn max_encoded_len(&self) -> usize {
        if self.is_variable() {
            LENGTH_PREFIX + self.max_length
        } else {
            self.max_length
        }
    }

    /// Appends the encoding of `value` to `out` and returns the bytes
    /// written. Null writes nothing; the caller records it in the row's null
    /// bitmap instead. On error nothing has been appended.
    pub fn encode(&self, value: &FieldValue, out: &mut Vec<u8>, zone: &Tz) -> Result<usize, ValueError> {
        if value.is_null() {
            return Ok(0);
        }
        if self.column_type.is_temporal() && !value.kind().is_temporal() {
            return Err(ValueError::TypeMismatch {
                expected: self.column_type,
                found: value.kind(),
            });
        }

        let start = out.len();
        match self.column_type {
            ColumnType::Integer(width) => {
                let v = value.as_integer()?;
                write_integer(out, v, width)?;
            }
            ColumnType::Boolean => out.push(u8::from(value.as_boolean()?)),
            ColumnType::Float64 => out.extend_from_slice(&value.as_number()?.to_le_bytes()),
            ColumnType::Char(width) => {
                let text = value.as_text();
                let bytes = check_len(text.as_bytes(), width)?;
                out.extend_from_slice(bytes);
                out.resize(start + width, BYTE_SPACE);
            }
            ColumnType::Binary(width) => {
                let raw = value.as_bytes();
                let bytes = check_len(&raw, width)?;
                out.extend_from_slice(bytes);
                out.resize(start + width, 0);
            }
            ColumnType::Varchar(_) | ColumnType::Numeric { .. } => {
                let text = value.as_text();
                write_prefixed(out, check_len(text.as_bytes(), self.max_length)?);
            }
            ColumnType::Varbinary(_) => {
                let raw = value.as_bytes();
                write_prefixed(out, check_len(&raw, self.max_length)?);
            }
            ColumnType::Date => {
                let local = local_of(value, zone)?;
                out.extend_from_slice(&days_since_epoch(local.date()).to_le_bytes());
            }
            ColumnType::Time => {
                // Local wall clock, not UTC.
                let local = local_of(value, zone)?;
                out.extend_from_slice(&micros_since_midnight(local.time()).to_le_bytes());
            }
            ColumnType::TimeTz => {
                let instant = instant_of(value, zone)?;
                let offset = zone
                    .offset_from_utc_datetime(&instant.naive_utc())
                    .fix()
                    .local_minus_utc();
                out.extend_from_slice(&pack_time_tz(instant.time(), offset).to_le_bytes());
            }
            ColumnType::Timestamp => {
                let local = local_of(value, zone)?;
                let micros = micros_since_epoch(local).ok_or_else(|| out_of_range(value))?;
                out.extend_from_slice(&micros.to_le_bytes());
            }
            ColumnType::TimestampTz => {
                let instant = instant_of(value, zone)?;
                let micros = micros_since_epoch(instant.naive_utc()).ok_or_else(|| out_of_range(value))?;
                out.extend_from_slice(&micros.to_le_bytes());
            }
            ColumnType::Interval => out.extend_from_slice(&value.as_integer()?.to_le_bytes()),
        }
        Ok(out.len() - start)
    }

    /// Turns a column payload back into a value. Variable-width payloads are
    /// passed without their length prefix. CHAR loses its space padding;
    /// TIME, TIMETZ and INTERVAL come back as their raw integer encoding.
    pub fn decode(&self, payload: &[u8], zone: &Tz) -> Result<FieldValue, ValueError> {
        if !self.is_variable() && payload.len() != self.max_length {
            return Err(ValueError::Conversion(format!(
                "{} payload has {} bytes, expected {}",
                self.column_type,
                payload.len(),
                self.max_length
            )));
        }

        let value = match self.column_type {
            ColumnType::Integer(1) => FieldValue::Integer(i64::from(payload[0] as i8)),
            ColumnType::Integer(2) => FieldValue::Integer(i64::from(i16::from_le_bytes(fixed(payload)))),
            ColumnType::Integer(4) => FieldValue::Integer(i64::from(i32::from_le_bytes(fixed(payload)))),
            ColumnType::Integer(_) => FieldValue::Integer(i64::from_le_bytes(fixed(payload))),
            ColumnType::Boolean => FieldValue::Boolean(payload[0] != 0),
            ColumnType::Float64 => FieldValue::Number(f64::from_le_bytes(fixed(payload))),
            ColumnType::Char(_) => {
                let end = payload.iter().rposition(|b| *b != BYTE_SPACE).map_or(0, |p| p + 1);
                FieldValue::String(utf8(&payload[..end])?)
            }
            ColumnType::Varchar(_) | ColumnType::Numeric { .. } => FieldValue::String(utf8(payload)?),
            ColumnType::Binary(_) | ColumnType::Varbinary(_) => FieldValue::Binary(payload.to_vec()),
            ColumnType::Date => {
                let days = i64::from_le_bytes(fixed(payload));
                let date = i32::try_from(days)
                    .ok()
                    .and_then(|d| d.checked_add(EPOCH_DAY_NUMBER))
                    .and_then(NaiveDate::from_num_days_from_ce_opt)
                    .ok_or_else(|| ValueError::Conversion(format!("Date offset {days} out of range")))?;
                FieldValue::Date(date)
            }
            ColumnType::Time | ColumnType::TimeTz | ColumnType::Interval => {
                FieldValue::Integer(i64::from_le_bytes(fixed(payload)))
            }
            ColumnType::Timestamp => {
                let local = epoch_plus_micros(i64::from_le_bytes(fixed(payload)))?;
                let instant = TimeParser::resolve_local(&local, zone).ok_or_else(|| {
                    ValueError::Conversion(format!("Local time {local} does not exist in {zone}"))
                })?;
                FieldValue::Timestamp(instant)
            }
            ColumnType::TimestampTz => {
                let utc = epoch_plus_micros(i64::from_le_bytes(fixed(payload)))?;
                FieldValue::Timestamp(DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc))
            }
        };
        Ok(value)
    }
}

fn write_integer(out: &mut Vec<u8>, v: i64, width: u8) -> Result<(), ValueError> {
    let range = || ValueError::Conversion(format!("Value {v} out of range for {width}-byte integer"));
    match width {
        1 => out.extend_from_slice(&i8::try_from(v).map_err(|_| range())?.to_le_bytes()),
        2 => out.extend_from_slice(&i16::try_from(v).map_err(|_| range())?.to_le_bytes()),
        4 => out.extend_from_slice(&i32::try_from(v).map_err(|_| range())?.to_le_bytes()),
        _ => out.extend_from_slice(&v.to_le_bytes()),
    }
    Ok(())
}

fn check_len(bytes: &[u8], limit: usize) -> Result<&[u8], ValueError> {
    if bytes.len() > limit {
        return Err(ValueError::TooLong {
            limit,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

fn write_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    let size_position = out.len();
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(bytes);
    let data_length = (out.len() - size_position - LENGTH_PREFIX) as u32;
    out[size_position..size_position + LENGTH_PREFIX].copy_from_slice(&data_length.to_le_bytes());
}

fn local_of(value: &FieldValue, zone: &Tz) -> Result<NaiveDateTime, ValueError> {
    value
        .to_local(zone)
        .ok_or_else(|| ValueError::Conversion(format!("{} is not a date/time value", value.kind())))
}

fn instant_of(value: &FieldValue, zone: &Tz) -> Result<DateTime<Utc>, ValueError> {
    value.to_instant(zone).ok_or_else(|| {
        ValueError::Conversion(format!("{value} has no unambiguous instant in {zone}"))
    })
}

fn out_of_range(value: &FieldValue) -> ValueError {
    ValueError::Conversion(format!("{value} is out of range for a 64-bit microsecond offset"))
}

fn epoch_plus_micros(micros: i64) -> Result<NaiveDateTime, ValueError> {
    let days = micros.div_euclid(MICROS_PER_DAY);
    let rest = micros.rem_euclid(MICROS_PER_DAY);
    i32::try_from(days)
        .ok()
        .and_then(|d| d.checked_add(EPOCH_DAY_NUMBER))
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight + Duration::microseconds(rest))
        .ok_or_else(|| ValueError::Conversion(format!("Microsecond offset {micros} out of range")))
}

fn fixed<const N: usize>(payload: &[u8]) -> [u8; N] {
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&payload[..N]);
    bytes
}

fn utf8(bytes: &[u8]) -> Result<String, ValueError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| ValueError::Conversion(format!("Invalid UTF-8: {e}")))
}
