use std::io::{self, Read};

use chrono_tz::Tz;

use crate::engine::errors::ValueError;
use crate::engine::native::{ColumnSpec, NativeHeader, NullBitmap};
use crate::engine::types::FieldValue;

/// One row as it sits on the wire: payloads without interpretation.
/// Variable-width payloads are stored without their length prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub data_size: usize,
    pub nulls: NullBitmap,
    pub fields: Vec<Option<Vec<u8>>>,
}

impl RawRow {
    pub fn is_null(&self, column: usize) -> bool {
        self.nulls.is_set(column)
    }

    pub fn decode(&self, specs: &[ColumnSpec], zone: &Tz) -> Result<Vec<FieldValue>, ValueError> {
        self.fields
            .iter()
            .zip(specs)
            .map(|(field, spec)| match field {
                Some(payload) => spec.decode(payload, zone),
                None => Ok(FieldValue::Null),
            })
            .collect()
    }
}

/// Reads a NATIVE stream back row by row.
pub struct NativeReader<R: Read> {
    inner: R,
    header: NativeHeader,
    rows_read: u64,
}

impl<R: Read> NativeReader<R> {
    /// Consumes and validates the stream header.
    pub fn new(mut inner: R) -> io::Result<Self> {
        let header = NativeHeader::read_from(&mut inner)?;
        Ok(Self {
            inner,
            header,
            rows_read: 0,
        })
    }

    pub fn header(&self) -> &NativeHeader {
        &self.header
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Next row, or None at a clean end of stream. A stream that ends inside
    /// a row is an `UnexpectedEof` error.
    pub fn next_row(&mut self) -> io::Result<Option<RawRow>> {
        let mut size = [0u8; 4];
        if !self.read_or_eof(&mut size)? {
            return Ok(None);
        }
        let data_size = i32::from_le_bytes(size);
        if data_size < 0 {
            return Err(invalid(format!("negative row data size {data_size}")));
        }
        let data_size = data_size as usize;

        let columns = self.header.column_count();
        let mut bitmap = vec![0u8; NullBitmap::byte_len(columns)];
        self.inner.read_exact(&mut bitmap)?;
        let nulls = NullBitmap::from_bytes(&bitmap, columns);

        let mut fields = Vec::with_capacity(columns);
        let mut consumed = 0usize;
        for (index, width) in self.header.column_widths().iter().copied().enumerate() {
            if nulls.is_set(index) {
                fields.push(None);
                continue;
            }
            let len = if width == ColumnSpec::VARIABLE_WIDTH {
                let mut prefix = [0u8; 4];
                self.inner.read_exact(&mut prefix)?;
                consumed += prefix.len();
                u32::from_le_bytes(prefix) as usize
            } else if width >= 0 {
                width as usize
            } else {
                return Err(invalid(format!("invalid column width {width}")));
            };

            consumed += len;
            if consumed > data_size {
                return Err(invalid(format!(
                    "column {index} overruns row data size {data_size}"
                )));
            }
            let mut payload = vec![0u8; len];
            self.inner.read_exact(&mut payload)?;
            fields.push(Some(payload));
        }

        if consumed != data_size {
            return Err(invalid(format!(
                "row declares {data_size} data bytes but columns hold {consumed}"
            )));
        }

        self.rows_read += 1;
        Ok(Some(RawRow {
            data_size,
            nulls,
            fields,
        }))
    }

    fn read_or_eof(&mut self, buf: &mut [u8]) -> io::Result<bool> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(false),
                Ok(0) => return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated row size")),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
