use std::fmt::Write as _;

use crate::engine::native::ColumnType;
use crate::shared::config::LoadConfig;

/// Load options that change the COPY statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyOptions {
    pub exceptions_file: Option<String>,
    pub rejected_file: Option<String>,
    pub abort_on_error: bool,
    pub direct: bool,
    pub stream_name: Option<String>,
}

impl From<&LoadConfig> for CopyOptions {
    fn from(config: &LoadConfig) -> Self {
        Self {
            exceptions_file: config.exceptions_file.clone(),
            rejected_file: config.rejected_file.clone(),
            abort_on_error: config.abort_on_error,
            direct: config.direct,
            stream_name: config.stream_name.clone(),
        }
    }
}

/// `COPY ... FROM STDIN NATIVE` for a target table.
#[derive(Debug, Clone)]
pub struct CopyStatement {
    schema: Option<String>,
    table: String,
    columns: Vec<(String, ColumnType)>,
    options: CopyOptions,
}

impl CopyStatement {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
            columns: Vec::new(),
            options: CopyOptions::default(),
        }
    }

    pub fn with_schema(mut self, schema: Option<String>) -> Self {
        self.schema = schema.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push((name.into(), column_type));
        self
    }

    pub fn with_options(mut self, options: CopyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn render(&self) -> String {
        let mut sql = String::with_capacity(150);
        sql.push_str("COPY ");
        if let Some(schema) = &self.schema {
            sql.push_str(&quote_identifier(schema));
            sql.push('.');
        }
        sql.push_str(&quote_identifier(&self.table));

        sql.push_str(" (");
        for (i, (name, column_type)) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            if matches!(column_type, ColumnType::Numeric { .. }) {
                // Numeric text goes through a filler column and a server-side cast.
                let _ = write!(
                    sql,
                    "TMPFILLERCOL{i} FILLER VARCHAR(1000), {} AS CAST(TMPFILLERCOL{i} AS NUMERIC)",
                    quote_identifier(name)
                );
            } else {
                sql.push_str(&quote_identifier(name));
            }
        }
        sql.push(')');

        sql.push_str(" FROM STDIN NATIVE ");
        if let Some(file) = &self.options.exceptions_file {
            let _ = write!(sql, "EXCEPTIONS E'{}' ", escape_literal(file));
        }
        if let Some(file) = &self.options.rejected_file {
            let _ = write!(sql, "REJECTED DATA E'{}' ", escape_literal(file));
        }
        sql.push_str("ENFORCELENGTH ");
        if self.options.abort_on_error {
            sql.push_str("ABORT ON ERROR ");
        }
        if self.options.direct {
            sql.push_str("DIRECT ");
        }
        if let Some(name) = self.options.stream_name.as_deref().filter(|n| !n.is_empty()) {
            let _ = write!(sql, "STREAM NAME E'{}' ", escape_literal(name));
        }
        sql
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "\\'")
}
