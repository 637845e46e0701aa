use crate::engine::native::{ColumnSpec, ColumnType};
use crate::test_helpers::factories::ColumnSpecFactory;
use crate::test_helpers::factory::Factory;

#[test]
fn builds_column_spec_with_defaults_and_helpers() {
    let c1 = Factory::column_spec().create();
    assert_eq!(c1.column_type(), ColumnType::Varchar(80));
    assert_eq!(c1.declared_width(), ColumnSpec::VARIABLE_WIDTH);

    let c2 = ColumnSpecFactory::new().with_type(ColumnType::Char(3)).create();
    assert_eq!(c2.declared_width(), 3);

    assert_eq!(ColumnSpecFactory::integer().declared_width(), 8);
    assert_eq!(ColumnSpecFactory::varchar(12).max_length(), 12);
    assert_eq!(ColumnSpecFactory::timestamp().column_type(), ColumnType::Timestamp);
}

#[test]
fn builds_many_in_order() {
    let specs = ColumnSpecFactory::many(&[ColumnType::Boolean, ColumnType::Date]);
    let types: Vec<_> = specs.iter().map(ColumnSpec::column_type).collect();
    assert_eq!(types, vec![ColumnType::Boolean, ColumnType::Date]);
}
