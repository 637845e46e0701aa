//! Vertica NATIVE binary row format.
//!
//! Stream layout: a fixed header declaring per-column widths, followed by
//! row records (`int32` payload size, MSB-first null bitmap, then the
//! encoded payload of every non-null column in column order). All integers
//! are little-endian.

pub mod column_spec;
pub mod column_type;
pub mod header;
pub mod null_bitmap;
pub mod reader;
pub mod row_encoder;

pub use column_spec::ColumnSpec;
pub use column_type::ColumnType;
pub use header::NativeHeader;
pub use null_bitmap::NullBitmap;
pub use reader::{NativeReader, RawRow};
pub use row_encoder::{EncoderOptions, MAX_BUFFER_SIZE, ROWS_PER_FLUSH, RowEncoder, buffer_capacity};

#[cfg(test)]
mod null_bitmap_test;
#[cfg(test)]
mod reader_test;
