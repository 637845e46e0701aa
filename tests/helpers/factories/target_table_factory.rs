use crate::engine::load::{TargetColumn, TargetTable};

pub struct TargetTableFactory {
    schema: Option<String>,
    table: String,
    columns: Vec<TargetColumn>,
}

impl TargetTableFactory {
    /// `public.events (id INTEGER, name VARCHAR(32), created TIMESTAMP)`
    pub fn new() -> Self {
        Self {
            schema: Some("public".to_string()),
            table: "events".to_string(),
            columns: vec![
                TargetColumn::new("id", "INTEGER"),
                TargetColumn::new("name", "VARCHAR").with_length(32),
                TargetColumn::new("created", "TIMESTAMP"),
            ],
        }
    }

    pub fn with_schema(mut self, schema: Option<&str>) -> Self {
        self.schema = schema.map(str::to_string);
        self
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn with_columns(mut self, columns: Vec<TargetColumn>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_column(mut self, column: TargetColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn create(self) -> TargetTable {
        TargetTable {
            schema: self.schema,
            table: self.table,
            columns: self.columns,
        }
    }
}
