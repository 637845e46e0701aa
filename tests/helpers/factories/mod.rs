pub mod column_spec_factory;
pub mod row_meta_factory;
pub mod target_table_factory;

pub use column_spec_factory::ColumnSpecFactory;
pub use row_meta_factory::RowMetaFactory;
pub use target_table_factory::TargetTableFactory;

#[cfg(test)]
mod column_spec_factory_test;
#[cfg(test)]
mod row_meta_factory_test;
#[cfg(test)]
mod target_table_factory_test;
