use crate::engine::types::{InputField, RowMeta, ValueKind};

pub struct RowMetaFactory {
    fields: Vec<InputField>,
}

impl RowMetaFactory {
    /// Defaults to `id`, `name` and `created`, matching [`TargetTableFactory`].
    ///
    /// [`TargetTableFactory`]: super::TargetTableFactory
    pub fn new() -> Self {
        Self {
            fields: vec![
                InputField::new("id", ValueKind::Integer),
                InputField::new("name", ValueKind::String),
                InputField::new("created", ValueKind::Timestamp),
            ],
        }
    }

    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with_field(mut self, name: &str, kind: ValueKind) -> Self {
        self.fields.push(InputField::new(name, kind));
        self
    }

    pub fn create(self) -> RowMeta {
        RowMeta::new(self.fields)
    }
}
