use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use tracing::{debug, error, info, warn};

use crate::engine::errors::LoadError;
use crate::engine::pipe::{LoadProgress, PipeInterrupter, PipeReader};
use crate::engine::sink::BulkLoadSink;

/// Background thread that feeds the read end of the pipe into a sink.
///
/// Spawning waits until the thread is running so the producer never fills
/// the pipe with nobody draining it. Failures reach the producer through
/// [`LoadProgress`]; cancellation is not counted as an error.
pub struct LoadWorker {
    handle: Option<JoinHandle<()>>,
    done_rx: Receiver<()>,
    interrupter: PipeInterrupter,
    progress: Arc<LoadProgress>,
}

impl LoadWorker {
    pub fn spawn(
        mut sink: Box<dyn BulkLoadSink>,
        statement: String,
        reader: PipeReader,
        progress: Arc<LoadProgress>,
    ) -> Result<Self, LoadError> {
        let (started_tx, started_rx) = channel::bounded::<()>(1);
        let (done_tx, done_rx) = channel::bounded::<()>(1);
        let interrupter = reader.interrupter();
        let worker_progress = Arc::clone(&progress);

        let handle = thread::Builder::new()
            .name("vertica-load-worker".to_string())
            .spawn(move || {
                let _ = started_tx.send(());
                run(sink.as_mut(), &statement, reader, &worker_progress);
                let _ = done_tx.send(());
            })
            .map_err(LoadError::Spawn)?;

        started_rx
            .recv()
            .map_err(|_| LoadError::WorkerFailed("load worker exited before starting".to_string()))?;
        debug!(target: "load_worker::spawn", "Load worker started");

        Ok(Self {
            handle: Some(handle),
            done_rx,
            interrupter,
            progress,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Marks the load stopped, interrupts the pipe and waits at most
    /// `timeout` for the worker to exit. Returns whether it was joined.
    pub fn stop(&mut self, timeout: Duration) -> Result<bool, LoadError> {
        self.progress.stop();
        self.interrupter.interrupt();

        match self.done_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                self.join()?;
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    target: "load_worker::stop",
                    timeout_ms = timeout.as_millis() as u64,
                    "Load worker did not exit in time"
                );
                Ok(false)
            }
        }
    }

    /// Waits for the worker without a bound. Joining twice is a no-op.
    pub fn join(&mut self) -> Result<(), LoadError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        handle
            .join()
            .map_err(|_| LoadError::WorkerFailed("load worker panicked".to_string()))
    }
}

fn run(sink: &mut dyn BulkLoadSink, statement: &str, mut reader: PipeReader, progress: &LoadProgress) {
    info!(target: "load_worker::run", "Starting bulk load stream");
    let result = sink.copy_stream(statement, &mut reader);

    match result {
        Ok(outcome) => {
            progress.set_outcome(outcome.accepted, outcome.rejected);
            let sent = progress.rows_sent();
            if outcome.accepted != sent {
                warn!(
                    target: "load_worker::run",
                    accepted = outcome.accepted,
                    sent,
                    "{} records loaded out of {} records sent.",
                    outcome.accepted,
                    sent
                );
            }
            info!(
                target: "load_worker::run",
                accepted = outcome.accepted,
                rejected = outcome.rejected,
                "Bulk load stream finished"
            );
        }
        Err(e) if e.is_cancellation() => {
            info!(target: "load_worker::run", "Bulk load interrupted by stop request");
        }
        Err(e) => {
            error!(target: "load_worker::run", err = %e, "Bulk load stream failed");
            progress.record_failure(e.to_string());
        }
    }

    // Only after the failure is recorded: the producer reads it on BrokenPipe.
    drop(reader);

    if progress.has_errors() || progress.is_stopped() {
        match sink.rollback() {
            Ok(()) => info!(target: "load_worker::run", errors = progress.errors(), "Rolled back load"),
            Err(e) => error!(target: "load_worker::run", err = %e, "Rollback failed"),
        }
    }
}
