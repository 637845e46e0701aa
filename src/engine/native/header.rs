use std::io::{self, Read};

use crate::engine::native::ColumnSpec;

pub const NATIVE_SIGNATURE: [u8; 11] = *b"NATIVE\n\xff\r\n\x00";
pub const NATIVE_VERSION: u16 = 1;

/// Bytes covered by the header-length field besides the width table:
/// version (2), filler (1) and column count (2).
const FIXED_AREA_LEN: u32 = 5;

/// The column count is a u16 on the wire.
pub const MAX_COLUMNS: usize = u16::MAX as usize;

/// Stream header: signature, header length, version, filler byte, column
/// count and one declared width per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeHeader {
    column_widths: Vec<i32>,
}

impl NativeHeader {
    pub const PREFIX_LEN: usize = NATIVE_SIGNATURE.len() + 4;

    pub fn new(column_widths: Vec<i32>) -> Self {
        Self { column_widths }
    }

    pub fn from_columns(columns: &[ColumnSpec]) -> Self {
        Self::new(columns.iter().map(ColumnSpec::declared_width).collect())
    }

    pub fn column_widths(&self) -> &[i32] {
        &self.column_widths
    }

    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }

    /// Value of the header-length field: everything after it.
    pub fn header_length(&self) -> u32 {
        FIXED_AREA_LEN + 4 * self.column_widths.len() as u32
    }

    /// Total bytes this header occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        Self::PREFIX_LEN + self.header_length() as usize
    }

    pub fn write_to(&self, out: &mut Vec<u8>) -> io::Result<()> {
        let count = u16::try_from(self.column_widths.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} columns exceed the NATIVE limit of {MAX_COLUMNS}", self.column_widths.len()),
            )
        })?;
        out.extend_from_slice(&NATIVE_SIGNATURE);
        out.extend_from_slice(&self.header_length().to_le_bytes());
        out.extend_from_slice(&NATIVE_VERSION.to_le_bytes());
        out.push(0);
        out.extend_from_slice(&count.to_le_bytes());
        for width in &self.column_widths {
            out.extend_from_slice(&width.to_le_bytes());
        }
        Ok(())
    }

    pub fn read_from<R: Read>(mut r: R) -> io::Result<Self> {
        let mut signature = [0u8; 11];
        r.read_exact(&mut signature)?;
        if signature != NATIVE_SIGNATURE {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "invalid NATIVE signature"));
        }

        let mut l = [0u8; 4];
        r.read_exact(&mut l)?;
        let header_length = u32::from_le_bytes(l);

        let mut v = [0u8; 2];
        r.read_exact(&mut v)?;
        if u16::from_le_bytes(v) != NATIVE_VERSION {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "unsupported NATIVE version"));
        }

        let mut filler = [0u8; 1];
        r.read_exact(&mut filler)?;

        let mut c = [0u8; 2];
        r.read_exact(&mut c)?;
        let count = u16::from_le_bytes(c) as usize;

        let mut column_widths = Vec::with_capacity(count);
        let mut w = [0u8; 4];
        for _ in 0..count {
            r.read_exact(&mut w)?;
            column_widths.push(i32::from_le_bytes(w));
        }

        let header = Self { column_widths };
        if header.header_length() != header_length {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "header length does not match column count",
            ));
        }
        Ok(header)
    }
}
