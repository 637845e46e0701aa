use std::io::Cursor;

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::engine::errors::LoadError;
use crate::engine::load::{JsonLinesSource, RowSource, VecRowSource};
use crate::engine::types::{FieldValue, ValueKind};
use crate::test_helpers::factories::RowMetaFactory;
use crate::test_helpers::factory::Factory;

#[test]
fn vec_source_yields_rows_in_order() {
    let meta = Factory::row_meta().create();
    let rows = vec![vec![FieldValue::Integer(1)], vec![FieldValue::Integer(2)]];
    let mut source = VecRowSource::new(meta.clone(), rows);

    assert_eq!(source.meta(), &meta);
    assert_eq!(source.next_row().unwrap(), Some(vec![FieldValue::Integer(1)]));
    assert_eq!(source.next_row().unwrap(), Some(vec![FieldValue::Integer(2)]));
    assert_eq!(source.next_row().unwrap(), None);
}

#[test]
fn json_lines_follow_declared_kinds() {
    let meta = RowMetaFactory::empty()
        .with_field("id", ValueKind::Integer)
        .with_field("day", ValueKind::Date)
        .with_field("at", ValueKind::Timestamp)
        .with_field("label", ValueKind::String)
        .create();
    let input = concat!(
        r#"{"id": 1, "day": "2015-03-20", "at": "2015-03-20T10:00:00Z", "label": "a"}"#,
        "\n",
        "\n",
        r#"{"id": 2, "at": 1426845600000}"#,
        "\n",
    );
    let mut source = JsonLinesSource::new(meta, Cursor::new(input), Tz::UTC);

    let first = source.next_row().unwrap().unwrap();
    assert_eq!(
        first,
        vec![
            FieldValue::Integer(1),
            FieldValue::Date(NaiveDate::from_ymd_opt(2015, 3, 20).unwrap()),
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2015, 3, 20, 10, 0, 0).unwrap()),
            FieldValue::from("a"),
        ]
    );

    let second = source.next_row().unwrap().unwrap();
    assert_eq!(second[0], FieldValue::Integer(2));
    assert_eq!(second[1], FieldValue::Null);
    assert_eq!(
        second[2],
        FieldValue::Timestamp(Utc.with_ymd_and_hms(2015, 3, 20, 10, 0, 0).unwrap())
    );
    assert_eq!(second[3], FieldValue::Null);

    assert_eq!(source.next_row().unwrap(), None);
}

#[test]
fn malformed_line_reports_its_number() {
    let meta = RowMetaFactory::empty().with_field("id", ValueKind::Integer).create();
    let input = "{\"id\": 1}\n{not json}\n";
    let mut source = JsonLinesSource::new(meta, Cursor::new(input), Tz::UTC);

    assert!(source.next_row().unwrap().is_some());
    match source.next_row() {
        Err(LoadError::Input(message)) => assert!(message.starts_with("line 2:"), "{message}"),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn non_object_line_is_rejected() {
    let meta = RowMetaFactory::empty().with_field("id", ValueKind::Integer).create();
    let mut source = JsonLinesSource::new(meta, Cursor::new("[1, 2]\n"), Tz::UTC);

    assert!(matches!(source.next_row(), Err(LoadError::Input(m)) if m.contains("expected a JSON object")));
}

#[test]
fn bad_temporal_value_names_the_field() {
    let meta = RowMetaFactory::empty().with_field("day", ValueKind::Date).create();
    let mut source = JsonLinesSource::new(meta, Cursor::new("{\"day\": \"someday\"}\n"), Tz::UTC);

    assert!(matches!(source.next_row(), Err(LoadError::Input(m)) if m.contains("field day")));
}
