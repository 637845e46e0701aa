use crate::engine::native::{ColumnSpec, ColumnType};

pub struct ColumnSpecFactory {
    column_type: ColumnType,
}

impl ColumnSpecFactory {
    pub fn new() -> Self {
        Self {
            column_type: ColumnType::Varchar(80),
        }
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    pub fn integer() -> ColumnSpec {
        Self::new().with_type(ColumnType::Integer(8)).create()
    }

    pub fn varchar(max: usize) -> ColumnSpec {
        Self::new().with_type(ColumnType::Varchar(max)).create()
    }

    pub fn timestamp() -> ColumnSpec {
        Self::new().with_type(ColumnType::Timestamp).create()
    }

    pub fn many(types: &[ColumnType]) -> Vec<ColumnSpec> {
        types
            .iter()
            .map(|t| Self::new().with_type(*t).create())
            .collect()
    }

    pub fn create(self) -> ColumnSpec {
        ColumnSpec::new(self.column_type).unwrap()
    }
}
