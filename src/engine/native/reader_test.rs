use std::io::{Cursor, ErrorKind};

use chrono_tz::Tz;

use crate::engine::native::{ColumnType, EncoderOptions, NativeReader, RowEncoder};
use crate::engine::types::FieldValue;
use crate::test_helpers::factories::ColumnSpecFactory;

fn encoded(rows: &[Vec<FieldValue>]) -> Vec<u8> {
    let columns = ColumnSpecFactory::many(&[ColumnType::Integer(4), ColumnType::Varchar(8)]);
    let mut out = Vec::new();
    let mut encoder = RowEncoder::open(columns, &mut out, &EncoderOptions::default()).unwrap();
    encoder.write_header().unwrap();
    for row in rows {
        encoder.write_row(Some(row)).unwrap();
    }
    encoder.close().unwrap();
    out
}

#[test]
fn empty_stream_has_only_header() {
    let mut reader = NativeReader::new(Cursor::new(encoded(&[]))).unwrap();
    assert_eq!(reader.header().column_widths(), &[4, -1]);
    assert!(reader.next_row().unwrap().is_none());
}

#[test]
fn exposes_raw_payloads() {
    let bytes = encoded(&[vec![FieldValue::Integer(7), FieldValue::Null]]);
    let mut reader = NativeReader::new(Cursor::new(bytes)).unwrap();

    let row = reader.next_row().unwrap().unwrap();
    assert_eq!(row.data_size, 4);
    assert!(row.is_null(1));
    assert_eq!(row.fields, vec![Some(vec![7, 0, 0, 0]), None]);

    let columns = ColumnSpecFactory::many(&[ColumnType::Integer(4), ColumnType::Varchar(8)]);
    assert_eq!(
        row.decode(&columns, &Tz::UTC).unwrap(),
        vec![FieldValue::Integer(7), FieldValue::Null]
    );
}

#[test]
fn truncated_row_is_an_error() {
    let mut bytes = encoded(&[vec![FieldValue::Integer(7), "abcdef".into()]]);
    bytes.truncate(bytes.len() - 2);

    let mut reader = NativeReader::new(Cursor::new(bytes)).unwrap();
    let err = reader.next_row().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}

#[test]
fn inconsistent_row_size_is_invalid() {
    let mut bytes = encoded(&[vec![FieldValue::Integer(7), FieldValue::Null]]);
    let header_len = bytes.len() - 4 - 1 - 4;
    bytes[header_len..header_len + 4].copy_from_slice(&9i32.to_le_bytes());

    let mut reader = NativeReader::new(Cursor::new(bytes)).unwrap();
    let err = reader.next_row().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}
