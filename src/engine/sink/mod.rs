pub mod bulk_load_sink;
pub mod copy_statement;
pub mod native_file_sink;

pub use bulk_load_sink::{BulkLoadSink, LoadOutcome};
pub use copy_statement::{CopyOptions, CopyStatement};
pub use native_file_sink::NativeFileSink;
