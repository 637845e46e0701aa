pub mod field_value;
pub mod row_meta;

pub use field_value::{FieldValue, ValueKind};
pub use row_meta::{InputField, RowMeta};
