use crate::engine::types::ValueKind;
use crate::test_helpers::factory::Factory;

#[test]
fn test_row_meta_factory() {
    let meta = Factory::row_meta().create();
    assert_eq!(meta.len(), 3);
    assert_eq!(meta.index_of("created"), Some(2));

    let custom = Factory::row_meta()
        .with_field("score", ValueKind::Number)
        .create();
    assert_eq!(custom.len(), 4);
    assert_eq!(custom.field(3).unwrap().kind, ValueKind::Number);
}

#[test]
fn test_row_meta_factory_empty() {
    let meta = crate::test_helpers::factories::RowMetaFactory::empty()
        .with_field("only", ValueKind::Boolean)
        .create();
    assert_eq!(meta.len(), 1);
    assert_eq!(meta.field(0).unwrap().name, "only");
}
