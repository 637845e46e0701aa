
use std::fs;
use std::io::{BufReader, Cursor};

use chrono_tz::Tz;
use tempfile::tempdir;
use vertica_native::engine::load::{
    BulkLoader, FieldPair, FieldSelection, JsonLinesSource, LoaderSettings, RejectionLog, TargetColumn,
    TargetTable,
};
use vertica_native::engine::native::{ColumnSpec, NativeReader};
use vertica_native::engine::sink::NativeFileSink;
use vertica_native::engine::types::FieldValue;

fn orders_table() -> TargetTable {
    TargetTable {
        schema: Some("shop".to_string()),
        table: "orders".to_string(),
        columns: vec![
            TargetColumn::new("id", "INTEGER"),
            TargetColumn::new("customer", "VARCHAR").with_length(16),
            TargetColumn::new("paid", "BOOLEAN"),
            TargetColumn::new("placed", "DATE"),
        ],
    }
}

const ORDERS: &str = r#"{"id": 1, "customer": "ada", "paid": true, "placed": "2024-03-01"}
{"id": 2, "customer": "grace", "paid": false, "placed": "2024-03-02"}
{"id": "three", "customer": "linus", "paid": true, "placed": "2024-03-03"}
{"id": 4, "customer": null, "paid": true, "placed": "2024-03-04"}
"#;

#[test]
fn json_lines_load_into_native_file() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("orders.native");
    let rejected = dir.path().join("orders.rejected");

    let table = orders_table();
    let selection = FieldSelection::AllFields;
    let meta = table.input_meta(&selection).unwrap();
    let mut source = JsonLinesSource::new(meta, Cursor::new(ORDERS), Tz::UTC);

    let rejections = RejectionLog::open(None, Some(&rejected)).unwrap();
    let mut loader = BulkLoader::new(
        table.clone(),
        selection,
        Box::new(NativeFileSink::new(&output)),
        Box::new(rejections),
        LoaderSettings::default(),
    );
    let summary = loader.run(&mut source).unwrap();

    assert_eq!(summary.rows_read, 4);
    assert_eq!(summary.rows_sent, 3);
    assert_eq!(summary.rows_rejected, 1);
    assert_eq!(summary.accepted, 3);

    let specs: Vec<ColumnSpec> = table
        .columns
        .iter()
        .map(|c| ColumnSpec::new(c.column_type().unwrap()).unwrap())
        .collect();
    let mut reader = NativeReader::new(BufReader::new(fs::File::open(&output).unwrap())).unwrap();
    assert_eq!(reader.header().column_widths(), &[8, -1, 1, 8]);

    let mut ids = Vec::new();
    while let Some(row) = reader.next_row().unwrap() {
        let values = row.decode(&specs, &Tz::UTC).unwrap();
        ids.push(values[0].clone());
        if values[0] == FieldValue::Integer(4) {
            assert_eq!(values[1], FieldValue::Null);
        }
    }
    assert_eq!(ids, vec![FieldValue::Integer(1), FieldValue::Integer(2), FieldValue::Integer(4)]);

    let rejected_text = fs::read_to_string(&rejected).unwrap();
    assert!(rejected_text.trim_end().ends_with("Row rejected: three | linus | Y | 2024/03/03"));
}

#[test]
fn specified_fields_load_a_subset() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("subset.native");

    let table = orders_table();
    let selection = FieldSelection::Specified(vec![
        FieldPair::new("placed", "placed"),
        FieldPair::new("id", "id"),
    ]);
    let meta = table.input_meta(&selection).unwrap();
    let input = "{\"id\": 9, \"placed\": \"2024-01-31\"}\n";
    let mut source = JsonLinesSource::new(meta, Cursor::new(input), Tz::UTC);

    let mut loader = BulkLoader::new(
        table,
        selection,
        Box::new(NativeFileSink::new(&output)),
        Box::new(RejectionLog::disabled()),
        LoaderSettings::default(),
    );
    let summary = loader.run(&mut source).unwrap();
    assert_eq!(summary.accepted, 1);

    let mut reader = NativeReader::new(fs::File::open(&output).unwrap()).unwrap();
    assert_eq!(reader.header().column_widths(), &[8, 8]);
    assert!(reader.next_row().unwrap().is_some());
    assert!(reader.next_row().unwrap().is_none());
}
