use crate::engine::load::TargetColumn;
use crate::test_helpers::factory::Factory;

#[test]
fn test_target_table_factory() {
    let table = Factory::target_table().create();
    assert_eq!(table.schema.as_deref(), Some("public"));
    assert_eq!(table.table, "events");
    let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "created"]);
    assert_eq!(table.columns[1].length, 32);
}

#[test]
fn test_target_table_factory_overrides() {
    let table = Factory::target_table()
        .with_schema(None)
        .with_table("scores")
        .with_columns(vec![TargetColumn::new("value", "FLOAT")])
        .with_column(TargetColumn::new("flag", "BOOLEAN"))
        .create();

    assert_eq!(table.schema, None);
    assert_eq!(table.table, "scores");
    assert_eq!(table.columns.len(), 2);
    assert_eq!(table.columns[1].type_name, "BOOLEAN");
}
