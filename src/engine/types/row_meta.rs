use crate::engine::types::ValueKind;

#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub name: String,
    pub kind: ValueKind,
}

impl InputField {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Layout of the rows delivered by the upstream row source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMeta {
    fields: Vec<InputField>,
}

impl RowMeta {
    pub fn new(fields: Vec<InputField>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&InputField> {
        self.fields.get(index)
    }

    pub fn fields(&self) -> &[InputField] {
        &self.fields
    }

    /// Position of a field by name, ignoring ASCII case.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }
}
