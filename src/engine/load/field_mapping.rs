use std::borrow::Cow;

use tracing::info;

use crate::engine::errors::{ConfigError, EncodeError};
use crate::engine::native::{ColumnSpec, ColumnType};
use crate::engine::sink::{CopyOptions, CopyStatement};
use crate::engine::types::{FieldValue, InputField, RowMeta, ValueKind};
use crate::shared::config::TargetConfig;

/// Column of the target table as reported by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetColumn {
    pub name: String,
    pub type_name: String,
    pub length: i32,
    pub precision: i32,
}

impl TargetColumn {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            length: 0,
            precision: 0,
        }
    }

    pub fn with_length(mut self, length: i32) -> Self {
        self.length = length;
        self
    }

    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = precision;
        self
    }

    pub fn column_type(&self) -> Result<ColumnType, ConfigError> {
        ColumnType::from_target(&self.type_name, self.length, self.precision)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTable {
    pub schema: Option<String>,
    pub table: String,
    pub columns: Vec<TargetColumn>,
}

impl TargetTable {
    pub fn from_config(config: &TargetConfig) -> Self {
        Self {
            schema: config.schema.clone(),
            table: config.table.clone(),
            columns: config
                .columns
                .iter()
                .map(|c| TargetColumn {
                    name: c.name.clone(),
                    type_name: c.type_name.clone(),
                    length: c.length,
                    precision: c.precision,
                })
                .collect(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&TargetColumn> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Input layout that feeds this table under `selection`, each field
    /// typed with the natural value kind of its target column.
    pub fn input_meta(&self, selection: &FieldSelection) -> Result<RowMeta, ConfigError> {
        let fields = match selection {
            FieldSelection::AllFields => self
                .columns
                .iter()
                .map(|c| Ok(InputField::new(c.name.clone(), natural_kind(c.column_type()?))))
                .collect::<Result<Vec<_>, ConfigError>>()?,
            FieldSelection::Specified(pairs) => pairs
                .iter()
                .map(|pair| {
                    let column = self
                        .column(&pair.column)
                        .ok_or_else(|| ConfigError::ColumnNotFound(pair.column.clone()))?;
                    Ok(InputField::new(pair.stream.clone(), natural_kind(column.column_type()?)))
                })
                .collect::<Result<Vec<_>, ConfigError>>()?,
        };
        Ok(RowMeta::new(fields))
    }
}

/// Value kind a source field naturally has for a column type.
pub fn natural_kind(column_type: ColumnType) -> ValueKind {
    match column_type {
        ColumnType::Integer(_) | ColumnType::Interval => ValueKind::Integer,
        ColumnType::Boolean => ValueKind::Boolean,
        ColumnType::Float64 => ValueKind::Number,
        // Decimal text keeps every digit; a float would not.
        ColumnType::Char(_) | ColumnType::Varchar(_) | ColumnType::Numeric { .. } => ValueKind::String,
        ColumnType::Binary(_) | ColumnType::Varbinary(_) => ValueKind::Binary,
        ColumnType::Date => ValueKind::Date,
        ColumnType::Time | ColumnType::TimeTz | ColumnType::Timestamp | ColumnType::TimestampTz => {
            ValueKind::Timestamp
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPair {
    pub stream: String,
    pub column: String,
}

impl FieldPair {
    pub fn new(stream: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            column: column.into(),
        }
    }
}

/// Which input fields go to which table columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelection {
    /// The whole input row, positionally onto the table columns
    AllFields,
    /// Explicit stream field to table column pairs, in load order
    Specified(Vec<FieldPair>),
}

impl FieldSelection {
    pub fn from_config(config: &TargetConfig) -> Self {
        if config.fields.is_empty() {
            FieldSelection::AllFields
        } else {
            FieldSelection::Specified(
                config
                    .fields
                    .iter()
                    .map(|f| FieldPair::new(f.stream.clone(), f.column.clone()))
                    .collect(),
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
    pub input_index: usize,
    pub name: String,
    pub column_type: ColumnType,
}

/// Resolved mapping from input rows to encoded columns.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    columns: Vec<MappedColumn>,
    specs: Vec<ColumnSpec>,
    input_len: usize,
    identity: bool,
}

impl FieldMapping {
    pub fn resolve(input: &RowMeta, table: &TargetTable, selection: &FieldSelection) -> Result<Self, ConfigError> {
        let mut columns = Vec::new();
        let mut specs = Vec::new();

        match selection {
            FieldSelection::AllFields => {
                for (index, field) in input.fields().iter().enumerate() {
                    let target = table
                        .columns
                        .get(index)
                        .ok_or_else(|| ConfigError::ColumnNotFound(field.name.clone()))?;
                    specs.push(spec_for(field, target)?);
                    columns.push(MappedColumn {
                        input_index: index,
                        name: target.name.clone(),
                        column_type: target.column_type()?,
                    });
                }
            }
            FieldSelection::Specified(pairs) => {
                for pair in pairs {
                    let index = input
                        .index_of(&pair.stream)
                        .ok_or_else(|| ConfigError::FieldNotFound(pair.stream.clone()))?;
                    let target = table
                        .column(&pair.column)
                        .ok_or_else(|| ConfigError::ColumnNotFound(pair.column.clone()))?;
                    let field = &input.fields()[index];
                    specs.push(spec_for(field, target)?);
                    columns.push(MappedColumn {
                        input_index: index,
                        name: target.name.clone(),
                        column_type: target.column_type()?,
                    });
                }
            }
        }

        if columns.is_empty() {
            return Err(ConfigError::EmptyColumns);
        }
        let identity = columns.len() == input.len() && columns.iter().enumerate().all(|(i, c)| c.input_index == i);
        Ok(Self {
            columns,
            specs,
            input_len: input.len(),
            identity,
        })
    }

    pub fn specs(&self) -> &[ColumnSpec] {
        &self.specs
    }

    pub fn columns(&self) -> &[MappedColumn] {
        &self.columns
    }

    /// Values to encode, in column order. A row shorter than the input
    /// layout is an error whichever fields are selected.
    pub fn select<'a>(&self, row: &'a [FieldValue]) -> Result<Cow<'a, [FieldValue]>, EncodeError> {
        if row.len() < self.input_len {
            return Err(EncodeError::RowTooShort {
                expected: self.input_len,
                actual: row.len(),
            });
        }
        if self.identity {
            return Ok(Cow::Borrowed(row));
        }
        Ok(Cow::Owned(
            self.columns
                .iter()
                .map(|c| row[c.input_index].clone())
                .collect(),
        ))
    }

    pub fn copy_statement(&self, table: &TargetTable, options: CopyOptions) -> CopyStatement {
        self.columns.iter().fold(
            CopyStatement::new(table.table.clone())
                .with_schema(table.schema.clone())
                .with_options(options),
            |statement, c| statement.with_column(c.name.clone(), c.column_type),
        )
    }
}

fn spec_for(field: &InputField, target: &TargetColumn) -> Result<ColumnSpec, ConfigError> {
    info!(
        target: "field_mapping::resolve",
        "Mapping input field {} ({}) to target column {} ({})",
        field.name,
        field.kind,
        target.name,
        target.type_name
    );

    let column_type = target.column_type()?;
    if column_type.is_temporal() && !field.kind.is_temporal() {
        return Err(ConfigError::TemporalSourceRequired {
            field: field.name.clone(),
            column: target.name.clone(),
        });
    }
    ColumnSpec::new(column_type)
}
