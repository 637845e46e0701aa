use std::io::Write;

use chrono_tz::Tz;
use tracing::{debug, info, trace};

use crate::engine::errors::{ConfigError, EncodeError};
use crate::engine::native::header::MAX_COLUMNS;
use crate::engine::native::{ColumnSpec, NativeHeader, NullBitmap};
use crate::engine::types::FieldValue;
use crate::shared::config::LoadConfig;
use crate::shared::datetime::time::TimeConfig;

/// Rows a full buffer is planned to hold.
pub const ROWS_PER_FLUSH: usize = 500;

/// Largest buffer the encoder will plan for.
pub const MAX_BUFFER_SIZE: usize = i32::MAX as usize - 8;

const ROW_SIZE_FIELD: usize = 4;
const INITIAL_ALLOCATION: usize = 1 << 20;

/// `row_max_size * rows_per_flush`, computed without overflow and clamped
/// to [`MAX_BUFFER_SIZE`].
pub fn buffer_capacity(row_max_size: usize, rows_per_flush: usize) -> usize {
    let planned = (row_max_size as u64).saturating_mul(rows_per_flush.max(1) as u64);
    planned.min(MAX_BUFFER_SIZE as u64) as usize
}

#[derive(Debug, Clone)]
pub struct EncoderOptions {
    pub rows_per_flush: usize,
    /// Zone whose wall clock DATE, TIME and TIMESTAMP columns record.
    pub zone: Tz,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            rows_per_flush: ROWS_PER_FLUSH,
            zone: Tz::UTC,
        }
    }
}

impl EncoderOptions {
    pub fn from_config(config: &LoadConfig, time: &TimeConfig) -> Self {
        Self {
            rows_per_flush: config.rows_per_flush,
            zone: time.zone(),
        }
    }
}

/// Encodes rows into the NATIVE format and hands full buffers to `sink`.
///
/// The buffer only ever holds complete rows: a row that fails to encode is
/// cut back to where it started before the error is returned. Closing the
/// encoder flushes what is left and drops the sink, which is how a pipe
/// writer signals end of data.
pub struct RowEncoder<W: Write> {
    columns: Vec<ColumnSpec>,
    sink: Option<W>,
    buffer: Vec<u8>,
    capacity: usize,
    row_max_size: usize,
    nulls: NullBitmap,
    zone: Tz,
    header_written: bool,
    rows_written: u64,
    bytes_flushed: u64,
}

impl<W: Write> RowEncoder<W> {
    pub fn open(columns: Vec<ColumnSpec>, sink: W, options: &EncoderOptions) -> Result<Self, ConfigError> {
        if columns.is_empty() {
            return Err(ConfigError::EmptyColumns);
        }
        if columns.len() > MAX_COLUMNS {
            return Err(ConfigError::TooManyColumns {
                count: columns.len(),
                max: MAX_COLUMNS,
            });
        }

        let row_max_size = ROW_SIZE_FIELD
            + NullBitmap::byte_len(columns.len())
            + columns.iter().map(ColumnSpec::max_encoded_len).sum::<usize>();
        if row_max_size > MAX_BUFFER_SIZE {
            return Err(ConfigError::RowTooLarge {
                row_max_size,
                ceiling: MAX_BUFFER_SIZE,
            });
        }

        let header_len = NativeHeader::from_columns(&columns).encoded_len();
        let capacity = buffer_capacity(row_max_size, options.rows_per_flush).max(header_len);

        debug!(
            target: "row_encoder::open",
            columns = columns.len(),
            row_max_size,
            capacity,
            "Opened row encoder"
        );

        Ok(Self {
            nulls: NullBitmap::new(columns.len()),
            columns,
            sink: Some(sink),
            buffer: Vec::with_capacity(capacity.min(INITIAL_ALLOCATION)),
            capacity,
            row_max_size,
            zone: options.zone,
            header_written: false,
            rows_written: 0,
            bytes_flushed: 0,
        })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn row_max_size(&self) -> usize {
        self.row_max_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current write position inside the buffer.
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn bytes_flushed(&self) -> u64 {
        self.bytes_flushed
    }

    pub fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    pub fn write_header(&mut self) -> Result<(), EncodeError> {
        if self.sink.is_none() {
            return Err(EncodeError::Closed);
        }
        if self.header_written {
            return Err(EncodeError::HeaderAlreadyWritten);
        }
        NativeHeader::from_columns(&self.columns).write_to(&mut self.buffer)?;
        self.header_written = true;
        Ok(())
    }

    /// Encodes one row. `None` marks the end of input: the buffer is flushed
    /// and the sink closed instead.
    ///
    /// Values beyond the column count are ignored. On a per-column failure
    /// the buffer is restored to its position before the row and the error
    /// names the failing column.
    pub fn write_row(&mut self, row: Option<&[FieldValue]>) -> Result<(), EncodeError> {
        let Some(values) = row else {
            return self.close();
        };
        if self.sink.is_none() {
            return Err(EncodeError::Closed);
        }
        if !self.header_written {
            return Err(EncodeError::HeaderMissing);
        }
        if values.len() < self.columns.len() {
            return Err(EncodeError::RowTooShort {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }

        self.nulls.clear();
        if self.buffer.len() + self.row_max_size > self.capacity {
            self.flush()?;
        }

        let mark = self.buffer.len();
        let bitmap_len = NullBitmap::byte_len(self.columns.len());
        self.buffer.extend_from_slice(&0i32.to_le_bytes());
        self.buffer.resize(mark + ROW_SIZE_FIELD + bitmap_len, 0);

        let mut row_data_size = 0usize;
        for (index, (spec, value)) in self.columns.iter().zip(values).enumerate() {
            if value.is_null() {
                self.nulls.set(index);
                continue;
            }
            match spec.encode(value, &mut self.buffer, &self.zone) {
                Ok(written) => row_data_size += written,
                Err(source) => {
                    self.buffer.truncate(mark);
                    return Err(EncodeError::Value { column: index, source });
                }
            }
        }

        self.buffer[mark..mark + ROW_SIZE_FIELD].copy_from_slice(&(row_data_size as i32).to_le_bytes());
        let bitmap_start = mark + ROW_SIZE_FIELD;
        self.buffer[bitmap_start..bitmap_start + bitmap_len].copy_from_slice(self.nulls.as_bytes());

        self.rows_written += 1;
        trace!(
            target: "row_encoder::write_row",
            row = self.rows_written,
            row_data_size,
            "Encoded row"
        );
        Ok(())
    }

    /// Writes the buffered bytes to the sink and rewinds the buffer.
    pub fn flush(&mut self) -> Result<(), EncodeError> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(EncodeError::Closed);
        };
        if self.buffer.is_empty() {
            return Ok(());
        }

        sink.write_all(&self.buffer)?;
        sink.flush()?;
        self.bytes_flushed += self.buffer.len() as u64;
        debug!(
            target: "row_encoder::flush",
            bytes = self.buffer.len(),
            total = self.bytes_flushed,
            "Flushed buffer"
        );
        self.buffer.clear();
        Ok(())
    }

    /// Final flush, then drops the sink. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), EncodeError> {
        if self.sink.is_none() {
            return Ok(());
        }
        let flushed = self.flush();
        self.sink = None;
        flushed?;

        info!(
            target: "row_encoder::close",
            rows = self.rows_written,
            bytes = self.bytes_flushed,
            "Closed row encoder"
        );
        Ok(())
    }
}
