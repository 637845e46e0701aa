pub use super::factories::{ColumnSpecFactory, RowMetaFactory, TargetTableFactory};

pub struct Factory;

impl Factory {
    pub fn column_spec() -> ColumnSpecFactory {
        ColumnSpecFactory::new()
    }

    pub fn row_meta() -> RowMetaFactory {
        RowMetaFactory::new()
    }

    pub fn target_table() -> TargetTableFactory {
        TargetTableFactory::new()
    }
}
