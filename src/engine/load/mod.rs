pub mod bulk_loader;
pub mod field_mapping;
pub mod rejection_log;
pub mod row_source;

pub use bulk_loader::{BulkLoader, LoadSummary, LoaderSettings, RowDisposition};
pub use field_mapping::{FieldMapping, FieldPair, FieldSelection, TargetColumn, TargetTable};
pub use rejection_log::{RejectionEvent, RejectionLog, RejectionSink};
pub use row_source::{JsonLinesSource, RowSource, VecRowSource};

#[cfg(test)]
mod row_source_test;
