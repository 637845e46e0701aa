use std::io::Read;

use serde::Serialize;

use crate::engine::errors::SinkError;

/// Row counts reported by a sink once the stream is fully consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadOutcome {
    pub accepted: u64,
    pub rejected: u64,
}

/// Destination of an encoded NATIVE stream.
///
/// `copy_stream` blocks until `stream` reports end of data (or fails) and
/// runs on the load worker thread. A stream that fails with a cancellation
/// error was stopped on purpose.
pub trait BulkLoadSink: Send {
    fn copy_stream(&mut self, statement: &str, stream: &mut dyn Read) -> Result<LoadOutcome, SinkError>;

    /// Discards whatever the last `copy_stream` call made visible.
    fn rollback(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: BulkLoadSink + ?Sized> BulkLoadSink for Box<S> {
    fn copy_stream(&mut self, statement: &str, stream: &mut dyn Read) -> Result<LoadOutcome, SinkError> {
        (**self).copy_stream(statement, stream)
    }

    fn rollback(&mut self) -> Result<(), SinkError> {
        (**self).rollback()
    }
}
