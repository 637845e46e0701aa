use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::Receiver;
use parking_lot::Mutex;

use crate::engine::errors::SinkError;
use crate::engine::native::NativeReader;
use crate::engine::sink::{BulkLoadSink, LoadOutcome};

#[derive(Debug, Default)]
pub struct MemorySinkState {
    pub received: Vec<u8>,
    pub statements: Vec<String>,
    pub rolled_back: bool,
}

/// In-memory bulk load sink. Clones share state, so a test keeps one clone
/// while the load worker owns the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemorySinkState>>,
    reject_with: Option<String>,
    accept_override: Option<u64>,
    gate: Option<Receiver<()>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every stream immediately without reading it.
    pub fn rejecting(mut self, message: &str) -> Self {
        self.reject_with = Some(message.to_string());
        self
    }

    /// Reports `accepted` rows regardless of what arrived.
    pub fn accepting(mut self, accepted: u64) -> Self {
        self.accept_override = Some(accepted);
        self
    }

    /// Holds every stream unread until `gate` fires or its sender drops,
    /// for at most five seconds.
    pub fn stalled_until(mut self, gate: Receiver<()>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn received(&self) -> Vec<u8> {
        self.state.lock().received.clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.state.lock().statements.clone()
    }

    pub fn rolled_back(&self) -> bool {
        self.state.lock().rolled_back
    }

    /// Rows in the received stream, counted by decoding its framing.
    pub fn row_count(&self) -> u64 {
        let bytes = self.received();
        let Ok(mut reader) = NativeReader::new(Cursor::new(bytes)) else {
            return 0;
        };
        while let Ok(Some(_)) = reader.next_row() {}
        reader.rows_read()
    }
}

impl BulkLoadSink for MemorySink {
    fn copy_stream(&mut self, statement: &str, stream: &mut dyn Read) -> Result<LoadOutcome, SinkError> {
        self.state.lock().statements.push(statement.to_string());
        if let Some(message) = &self.reject_with {
            return Err(SinkError::Rejected(message.clone()));
        }
        if let Some(gate) = &self.gate {
            let _ = gate.recv_timeout(Duration::from_secs(5));
        }

        let mut chunk = [0u8; 256];
        loop {
            let n = stream.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            self.state.lock().received.extend_from_slice(&chunk[..n]);
        }

        let accepted = match self.accept_override {
            Some(accepted) => accepted,
            None => self.row_count(),
        };
        Ok(LoadOutcome { accepted, rejected: 0 })
    }

    fn rollback(&mut self) -> Result<(), SinkError> {
        self.state.lock().rolled_back = true;
        Ok(())
    }
}
