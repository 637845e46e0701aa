use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::engine::pipe::PipeInterrupter;

/// Counters shared between the producing thread and the load worker.
///
/// Also the stop handle: [`LoadProgress::stop`] may be called from any
/// thread and interrupts the attached pipe, waking a producer blocked on a
/// full pipe and a worker blocked on an empty one.
#[derive(Debug, Default)]
pub struct LoadProgress {
    stopped: AtomicBool,
    errors: AtomicU64,
    rows_sent: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    failure: Mutex<Option<String>>,
    interrupter: Mutex<Option<PipeInterrupter>>,
}

impl LoadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(interrupter) = self.interrupter.lock().as_ref() {
            interrupter.interrupt();
        }
    }

    /// Registers the pipe a later stop interrupts. A stop that already
    /// happened interrupts it right away.
    pub fn attach_interrupter(&self, interrupter: PipeInterrupter) {
        let mut slot = self.interrupter.lock();
        if self.is_stopped() {
            interrupter.interrupt();
        }
        *slot = Some(interrupter);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn add_error(&self) -> u64 {
        self.errors.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Counts an error and keeps `message` if it is the first failure.
    pub fn record_failure(&self, message: impl Into<String>) {
        self.add_error();
        let mut failure = self.failure.lock();
        if failure.is_none() {
            *failure = Some(message.into());
        }
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    pub fn failure(&self) -> Option<String> {
        self.failure.lock().clone()
    }

    pub fn row_sent(&self) -> u64 {
        self.rows_sent.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn rows_sent(&self) -> u64 {
        self.rows_sent.load(Ordering::SeqCst)
    }

    pub fn set_outcome(&self, accepted: u64, rejected: u64) {
        self.accepted.store(accepted, Ordering::SeqCst);
        self.rejected.store(rejected, Ordering::SeqCst);
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::SeqCst)
    }
}
