use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::load::{RejectionEvent, RejectionSink};

/// Collects rejection events in memory; clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryRejections {
    events: Arc<Mutex<Vec<RejectionEvent>>>,
    closed: Arc<Mutex<bool>>,
}

impl MemoryRejections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RejectionEvent> {
        self.events.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock()
    }
}

impl RejectionSink for MemoryRejections {
    fn record(&mut self, event: &RejectionEvent) -> io::Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        *self.closed.lock() = true;
        Ok(())
    }
}
