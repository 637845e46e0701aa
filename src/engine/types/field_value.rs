use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::engine::errors::ValueError;
use crate::shared::datetime::time::TimeParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Null,
    Integer,
    Number,
    String,
    Boolean,
    Binary,
    Date,
    Timestamp,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "Null",
            ValueKind::Integer => "Integer",
            ValueKind::Number => "Number",
            ValueKind::String => "String",
            ValueKind::Boolean => "Boolean",
            ValueKind::Binary => "Binary",
            ValueKind::Date => "Date",
            ValueKind::Timestamp => "Timestamp",
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ValueKind::Date | ValueKind::Timestamp)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Integer" => Ok(ValueKind::Integer),
            "Number" | "Float" => Ok(ValueKind::Number),
            "String" => Ok(ValueKind::String),
            "Boolean" => Ok(ValueKind::Boolean),
            "Binary" => Ok(ValueKind::Binary),
            "Date" => Ok(ValueKind::Date),
            "Timestamp" => Ok(ValueKind::Timestamp),
            "Null" => Ok(ValueKind::Null),
            _ => Err(()),
        }
    }
}

/// One typed field of an incoming row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Number(f64),
    String(String),
    Boolean(bool),
    Binary(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Null => ValueKind::Null,
            FieldValue::Integer(_) => ValueKind::Integer,
            FieldValue::Number(_) => ValueKind::Number,
            FieldValue::String(_) => ValueKind::String,
            FieldValue::Boolean(_) => ValueKind::Boolean,
            FieldValue::Binary(_) => ValueKind::Binary,
            FieldValue::Date(_) => ValueKind::Date,
            FieldValue::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_integer(&self) -> Result<i64, ValueError> {
        match self {
            FieldValue::Integer(i) => Ok(*i),
            FieldValue::Number(f) => {
                let rounded = f.round();
                if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
                    Ok(rounded as i64)
                } else {
                    Err(conversion(self, "an Integer"))
                }
            }
            FieldValue::Boolean(b) => Ok(i64::from(*b)),
            FieldValue::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| conversion(self, "an Integer")),
            FieldValue::Timestamp(ts) => Ok(ts.timestamp_millis()),
            FieldValue::Null | FieldValue::Binary(_) | FieldValue::Date(_) => {
                Err(conversion(self, "an Integer"))
            }
        }
    }

    pub fn as_number(&self) -> Result<f64, ValueError> {
        match self {
            FieldValue::Number(f) => Ok(*f),
            FieldValue::Integer(i) => Ok(*i as f64),
            FieldValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            FieldValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| conversion(self, "a Number")),
            FieldValue::Timestamp(ts) => Ok(ts.timestamp_millis() as f64),
            FieldValue::Null | FieldValue::Binary(_) | FieldValue::Date(_) => {
                Err(conversion(self, "a Number"))
            }
        }
    }

    pub fn as_boolean(&self) -> Result<bool, ValueError> {
        match self {
            FieldValue::Boolean(b) => Ok(*b),
            FieldValue::Integer(i) => Ok(*i != 0),
            FieldValue::Number(f) => Ok(*f != 0.0),
            FieldValue::String(s) => Ok(matches!(
                s.trim().to_ascii_uppercase().as_str(),
                "Y" | "YES" | "TRUE" | "1"
            )),
            FieldValue::Null
            | FieldValue::Binary(_)
            | FieldValue::Date(_)
            | FieldValue::Timestamp(_) => Err(conversion(self, "a Boolean")),
        }
    }

    /// Text rendering used for CHAR, VARCHAR and NUMERIC columns.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Null => Cow::Borrowed(""),
            FieldValue::String(s) => Cow::Borrowed(s.as_str()),
            FieldValue::Integer(i) => Cow::Owned(itoa::Buffer::new().format(*i).to_string()),
            FieldValue::Number(f) => Cow::Owned(f.to_string()),
            FieldValue::Boolean(b) => Cow::Borrowed(if *b { "Y" } else { "N" }),
            FieldValue::Binary(bytes) => String::from_utf8_lossy(bytes),
            FieldValue::Date(d) => Cow::Owned(d.format("%Y/%m/%d").to_string()),
            FieldValue::Timestamp(ts) => {
                Cow::Owned(ts.format("%Y/%m/%d %H:%M:%S%.3f").to_string())
            }
        }
    }

    /// Raw bytes used for BINARY and VARBINARY columns.
    pub fn as_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            FieldValue::Binary(bytes) => Cow::Borrowed(bytes.as_slice()),
            FieldValue::String(s) => Cow::Borrowed(s.as_bytes()),
            other => match other.as_text() {
                Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
                Cow::Owned(s) => Cow::Owned(s.into_bytes()),
            },
        }
    }

    /// Wall-clock reading of a temporal value in `zone`. None for
    /// non-temporal values.
    pub fn to_local(&self, zone: &Tz) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Date(d) => Some(d.and_time(NaiveTime::MIN)),
            FieldValue::Timestamp(ts) => Some(ts.with_timezone(zone).naive_local()),
            _ => None,
        }
    }

    /// Absolute instant of a temporal value. Dates are taken as local
    /// midnight in `zone`; None when that midnight does not exist there.
    pub fn to_instant(&self, zone: &Tz) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            FieldValue::Date(d) => TimeParser::resolve_local(&d.and_time(NaiveTime::MIN), zone),
            _ => None,
        }
    }

    /// Builds a value from a JSON input field, steered by the declared
    /// input kind. Temporal kinds parse strings in `zone`; integers given
    /// for a timestamp are epoch milliseconds.
    pub fn from_json(value: &JsonValue, kind: ValueKind, zone: &Tz) -> Result<Self, ValueError> {
        match (kind, value) {
            (_, JsonValue::Null) => Ok(FieldValue::Null),
            (ValueKind::Date, JsonValue::String(s)) => TimeParser::parse_date(s)
                .or_else(|| {
                    TimeParser::parse_instant(s, zone)
                        .map(|ts| ts.with_timezone(zone).date_naive())
                })
                .map(FieldValue::Date)
                .ok_or_else(|| ValueError::Conversion(format!("Invalid date string: '{s}'"))),
            (ValueKind::Timestamp, JsonValue::String(s)) => TimeParser::parse_instant(s, zone)
                .map(FieldValue::Timestamp)
                .ok_or_else(|| ValueError::Conversion(format!("Invalid timestamp string: '{s}'"))),
            (ValueKind::Timestamp, JsonValue::Number(n)) => n
                .as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(FieldValue::Timestamp)
                .ok_or_else(|| ValueError::Conversion(format!("Invalid epoch milliseconds: {n}"))),
            (ValueKind::Binary, JsonValue::Array(items)) => items
                .iter()
                .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(FieldValue::Binary)
                .ok_or_else(|| ValueError::Conversion("Binary arrays must hold bytes".to_string())),
            (_, JsonValue::Bool(b)) => Ok(FieldValue::Boolean(*b)),
            // Keeps the literal digits for decimal text columns.
            (ValueKind::String, JsonValue::Number(n)) => Ok(FieldValue::String(n.to_string())),
            (_, JsonValue::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    Ok(FieldValue::Integer(i))
                } else {
                    n.as_f64()
                        .map(FieldValue::Number)
                        .ok_or_else(|| ValueError::Conversion(format!("Unsupported number: {n}")))
                }
            }
            (_, JsonValue::String(s)) => Ok(FieldValue::String(s.clone())),
            (_, other) => Ok(FieldValue::String(other.to_string())),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            other => f.write_str(&other.as_text()),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

fn conversion(value: &FieldValue, target: &str) -> ValueError {
    ValueError::Conversion(format!(
        "Unexpected conversion error while converting {} [{}] to {}",
        value.kind(),
        value,
        target
    ))
}
