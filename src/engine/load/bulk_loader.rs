use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::engine::errors::{EncodeError, LoadError};
use crate::engine::load::{FieldMapping, FieldSelection, RejectionEvent, RejectionSink, RowSource, TargetTable};
use crate::engine::native::{EncoderOptions, RowEncoder};
use crate::engine::pipe::{LoadProgress, LoadWorker, PipeWriter, is_cancellation, pipe};
use crate::engine::sink::{BulkLoadSink, CopyOptions};
use crate::engine::types::{FieldValue, RowMeta};
use crate::shared::config::{CONFIG, LoadConfig};
use crate::shared::datetime::time::TimeConfig;

#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub abort_on_error: bool,
    pub pipe_capacity: usize,
    pub stop_timeout: Duration,
    /// Log a `linenr` line every this many rows; 0 disables it
    pub feedback_size: u64,
    pub encoder: EncoderOptions,
    pub copy: CopyOptions,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            abort_on_error: false,
            pipe_capacity: 64 * 1024,
            stop_timeout: Duration::from_secs(5),
            feedback_size: 0,
            encoder: EncoderOptions::default(),
            copy: CopyOptions::default(),
        }
    }
}

impl LoaderSettings {
    pub fn from_config(config: &LoadConfig, time: &TimeConfig) -> Self {
        Self {
            abort_on_error: config.abort_on_error,
            pipe_capacity: config.pipe_capacity,
            stop_timeout: Duration::from_millis(config.stop_timeout_ms),
            feedback_size: config.feedback_size,
            encoder: EncoderOptions::from_config(config, time),
            copy: CopyOptions::from(config),
        }
    }

    pub fn from_app_config() -> Self {
        Self::from_config(&CONFIG.load, &TimeConfig::from_app_config())
    }
}

/// What happened to one row handed to [`BulkLoader::process_row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDisposition {
    /// Encoded into the stream
    Forwarded,
    /// Dropped and reported to the rejection sink
    Rejected,
    /// End of input; the stream is closed
    Finished,
    /// The load was stopped; the row was not used
    Stopped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub rows_read: u64,
    pub rows_sent: u64,
    pub rows_rejected: u64,
    pub accepted: u64,
    pub rejected_by_sink: u64,
    pub errors: u64,
    pub stopped: bool,
    pub failure: Option<String>,
}

struct OpenStream {
    mapping: FieldMapping,
    encoder: RowEncoder<PipeWriter>,
}

/// Drives one bulk load: maps incoming rows onto the target columns,
/// encodes them and streams the result to the sink on a worker thread.
///
/// The stream is opened lazily on the first row. Encode failures of a
/// single row either drop the row (reporting it to the rejection sink) or
/// abort the load, depending on `abort_on_error`.
pub struct BulkLoader {
    settings: LoaderSettings,
    table: TargetTable,
    selection: FieldSelection,
    sink: Option<Box<dyn BulkLoadSink>>,
    rejections: Box<dyn RejectionSink>,
    progress: Arc<LoadProgress>,
    stream: Option<OpenStream>,
    worker: Option<LoadWorker>,
    rows_read: u64,
    rows_rejected: u64,
}

impl BulkLoader {
    pub fn new(
        table: TargetTable,
        selection: FieldSelection,
        sink: Box<dyn BulkLoadSink>,
        rejections: Box<dyn RejectionSink>,
        settings: LoaderSettings,
    ) -> Self {
        Self {
            settings,
            table,
            selection,
            sink: Some(sink),
            rejections,
            progress: Arc::new(LoadProgress::new()),
            stream: None,
            worker: None,
            rows_read: 0,
            rows_rejected: 0,
        }
    }

    pub fn progress(&self) -> Arc<LoadProgress> {
        Arc::clone(&self.progress)
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Handles one upstream row; `None` is the end of input.
    pub fn process_row(&mut self, meta: &RowMeta, row: Option<&[FieldValue]>) -> Result<RowDisposition, LoadError> {
        if self.progress.is_stopped() {
            self.stop_running()?;
            return Ok(RowDisposition::Stopped);
        }
        if let Some(failure) = self.progress.failure() {
            self.close_stream();
            return Err(LoadError::WorkerFailed(failure));
        }

        let Some(values) = row else {
            if let Some(stream) = self.stream.as_mut() {
                if let Err(e) = stream.encoder.write_row(None) {
                    return self.write_failed(e);
                }
            }
            debug!(target: "bulk_loader::process_row", rows = self.rows_read, "End of input");
            return Ok(RowDisposition::Finished);
        };

        if self.stream.is_none() {
            self.open(meta)?;
        }
        self.rows_read += 1;

        let disposition = self.write_row(values)?;

        if self.settings.feedback_size > 0 && self.rows_read % self.settings.feedback_size == 0 {
            info!(target: "bulk_loader::process_row", "linenr {}", self.rows_read);
        }
        Ok(disposition)
    }

    /// Pulls every row from `source`, then disposes the load.
    pub fn run(&mut self, source: &mut dyn RowSource) -> Result<LoadSummary, LoadError> {
        let driven = self.drive(source);
        let summary = self.dispose();
        driven?;
        let summary = summary?;
        match &summary.failure {
            Some(failure) => Err(LoadError::WorkerFailed(failure.clone())),
            None => Ok(summary),
        }
    }

    fn drive(&mut self, source: &mut dyn RowSource) -> Result<(), LoadError> {
        loop {
            let row = source.next_row()?;
            match self.process_row(source.meta(), row.as_deref())? {
                RowDisposition::Finished | RowDisposition::Stopped => return Ok(()),
                RowDisposition::Forwarded | RowDisposition::Rejected => {}
            }
        }
    }

    /// Requests a stop: flags the load, interrupts the worker and waits for
    /// it up to the configured timeout.
    pub fn stop_running(&mut self) -> Result<(), LoadError> {
        self.progress.stop();
        if let Some(worker) = self.worker.as_mut() {
            if !worker.stop(self.settings.stop_timeout)? {
                warn!(target: "bulk_loader::stop_running", "Load worker still running after stop");
            }
        }
        Ok(())
    }

    /// Closes the stream if it is still open, waits for the worker without a
    /// bound and reports the totals.
    pub fn dispose(&mut self) -> Result<LoadSummary, LoadError> {
        self.close_stream();

        let joined = match self.worker.as_mut() {
            Some(worker) => worker.join(),
            None => Ok(()),
        };
        if let Err(e) = self.rejections.close() {
            error!(target: "bulk_loader::dispose", err = %e, "Failed to close rejection logs");
        }
        joined?;

        let summary = LoadSummary {
            rows_read: self.rows_read,
            rows_sent: self.progress.rows_sent(),
            rows_rejected: self.rows_rejected,
            accepted: self.progress.accepted(),
            rejected_by_sink: self.progress.rejected(),
            errors: self.progress.errors(),
            stopped: self.progress.is_stopped(),
            failure: self.progress.failure(),
        };
        info!(
            target: "bulk_loader::dispose",
            rows_read = summary.rows_read,
            rows_sent = summary.rows_sent,
            rows_rejected = summary.rows_rejected,
            accepted = summary.accepted,
            errors = summary.errors,
            "Load finished"
        );
        Ok(summary)
    }

    fn open(&mut self, meta: &RowMeta) -> Result<(), LoadError> {
        let mapping = FieldMapping::resolve(meta, &self.table, &self.selection)?;
        let statement = mapping.copy_statement(&self.table, self.settings.copy.clone()).render();
        debug!(target: "bulk_loader::open", statement = %statement, "copy stmt");

        let sink = self
            .sink
            .take()
            .ok_or_else(|| LoadError::WorkerFailed("bulk load sink already consumed".to_string()))?;

        let (writer, reader) = pipe(self.settings.pipe_capacity);
        self.progress.attach_interrupter(writer.interrupter());
        let mut encoder = RowEncoder::open(mapping.specs().to_vec(), writer, &self.settings.encoder)?;
        // The worker must be draining before the first flush can block.
        self.worker = Some(LoadWorker::spawn(sink, statement, reader, Arc::clone(&self.progress))?);
        encoder.write_header()?;

        info!(
            target: "bulk_loader::open",
            table = %self.table.table,
            columns = mapping.specs().len(),
            row_max_size = encoder.row_max_size(),
            buffer = encoder.capacity(),
            "Opened bulk load stream"
        );
        self.stream = Some(OpenStream { mapping, encoder });
        Ok(())
    }

    fn write_row(&mut self, values: &[FieldValue]) -> Result<RowDisposition, LoadError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(LoadError::Stopped);
        };
        let selected = match stream.mapping.select(values) {
            Ok(selected) => selected,
            Err(e) => return self.write_failed(e),
        };

        match stream.encoder.write_row(Some(selected.as_ref())) {
            Ok(()) => {
                self.progress.row_sent();
                Ok(RowDisposition::Forwarded)
            }
            Err(e) if e.is_row_level() => self.reject(values, e),
            Err(e) => self.write_failed(e),
        }
    }

    /// Stream-level write failure: a stop in progress, a failed worker or a
    /// fatal error. A stop wakes the producer through the pipe; the worker
    /// then gets the bounded join.
    fn write_failed(&mut self, err: EncodeError) -> Result<RowDisposition, LoadError> {
        if let EncodeError::Io(e) = &err {
            if self.progress.is_stopped() || is_cancellation(e) {
                debug!(target: "bulk_loader::write_failed", err = %e, "Write interrupted by stop");
                self.stop_running()?;
                return Ok(RowDisposition::Stopped);
            }
        }

        // The worker already counted its own failure.
        if let Some(failure) = self.progress.failure() {
            return Err(LoadError::WorkerFailed(failure));
        }
        self.progress.add_error();
        error!(target: "bulk_loader::write_failed", err = %err, "Row write failed");
        Err(err.into())
    }

    fn reject(&mut self, values: &[FieldValue], err: EncodeError) -> Result<RowDisposition, LoadError> {
        let event = RejectionEvent::new(values.to_vec(), &err);
        error!(
            target: "bulk_loader::write_row",
            reason = %event.reason,
            "Row rejected: {}",
            event.row_text()
        );
        self.rows_rejected += 1;
        self.rejections.record(&event).map_err(LoadError::RejectionLog)?;

        if !self.settings.abort_on_error {
            return Ok(RowDisposition::Rejected);
        }

        // Errors first so the worker rolls back once the stream ends.
        self.progress.add_error();
        self.close_stream();
        Err(err.into())
    }

    fn close_stream(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };
        if stream.encoder.is_closed() {
            return;
        }
        if let Err(e) = stream.encoder.close() {
            if self.progress.is_stopped() {
                debug!(target: "bulk_loader::close_stream", err = %e, "Close after stop");
            } else {
                warn!(target: "bulk_loader::close_stream", err = %e, "Failed to close encoder");
            }
        }
    }
}
