use std::collections::VecDeque;
use std::io::BufRead;

use chrono_tz::Tz;
use serde_json::Value as JsonValue;

use crate::engine::errors::LoadError;
use crate::engine::types::{FieldValue, RowMeta};

/// Upstream supplier of rows. `Ok(None)` is the end of input.
pub trait RowSource {
    fn meta(&self) -> &RowMeta;

    fn next_row(&mut self) -> Result<Option<Vec<FieldValue>>, LoadError>;
}

/// Rows held in memory.
#[derive(Debug, Clone)]
pub struct VecRowSource {
    meta: RowMeta,
    rows: VecDeque<Vec<FieldValue>>,
}

impl VecRowSource {
    pub fn new(meta: RowMeta, rows: Vec<Vec<FieldValue>>) -> Self {
        Self {
            meta,
            rows: rows.into(),
        }
    }
}

impl RowSource for VecRowSource {
    fn meta(&self) -> &RowMeta {
        &self.meta
    }

    fn next_row(&mut self) -> Result<Option<Vec<FieldValue>>, LoadError> {
        Ok(self.rows.pop_front())
    }
}

/// One JSON object per line. Fields are picked by name from `meta` and
/// converted according to their declared kind; absent fields are null.
pub struct JsonLinesSource<R: BufRead> {
    meta: RowMeta,
    lines: std::io::Lines<R>,
    zone: Tz,
    line_no: u64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(meta: RowMeta, input: R, zone: Tz) -> Self {
        Self {
            meta,
            lines: input.lines(),
            zone,
            line_no: 0,
        }
    }

    fn parse(&self, line: &str) -> Result<Vec<FieldValue>, LoadError> {
        let json: JsonValue =
            serde_json::from_str(line).map_err(|e| LoadError::Input(format!("line {}: {e}", self.line_no)))?;
        let JsonValue::Object(object) = json else {
            return Err(LoadError::Input(format!("line {}: expected a JSON object", self.line_no)));
        };

        self.meta
            .fields()
            .iter()
            .map(|field| {
                let value = object.get(&field.name).unwrap_or(&JsonValue::Null);
                FieldValue::from_json(value, field.kind, &self.zone)
                    .map_err(|e| LoadError::Input(format!("line {}, field {}: {e}", self.line_no, field.name)))
            })
            .collect()
    }
}

impl<R: BufRead> RowSource for JsonLinesSource<R> {
    fn meta(&self) -> &RowMeta {
        &self.meta
    }

    fn next_row(&mut self) -> Result<Option<Vec<FieldValue>>, LoadError> {
        while let Some(line) = self.lines.next() {
            let line = line.map_err(|e| LoadError::Input(e.to_string()))?;
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return self.parse(&line).map(Some);
        }
        Ok(None)
    }
}
