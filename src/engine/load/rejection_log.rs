use std::error::Error as StdError;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Local};

use crate::engine::types::FieldValue;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// A row dropped by the encoder, with the reason it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectionEvent {
    pub timestamp: DateTime<Local>,
    pub row: Vec<FieldValue>,
    pub reason: String,
    /// Messages of the underlying errors, outermost first.
    pub causes: Vec<String>,
}

impl RejectionEvent {
    pub fn new(row: Vec<FieldValue>, err: &(dyn StdError + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        Self {
            timestamp: Local::now(),
            row,
            reason: err.to_string(),
            causes,
        }
    }

    /// Row values joined with `" | "`.
    pub fn row_text(&self) -> String {
        self.row.iter().map(ToString::to_string).collect::<Vec<_>>().join(" | ")
    }
}

/// Receives every row the loader drops.
pub trait RejectionSink: Send {
    fn record(&mut self, event: &RejectionEvent) -> io::Result<()>;

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Human readable exception and rejected-data logs, both optional and
/// opened in append mode. Every line starts with the event time.
#[derive(Debug, Default)]
pub struct RejectionLog {
    exceptions: Option<BufWriter<File>>,
    rejected: Option<BufWriter<File>>,
}

impl RejectionLog {
    pub fn open(exceptions: Option<&Path>, rejected: Option<&Path>) -> io::Result<Self> {
        Ok(Self {
            exceptions: exceptions.map(open_append).transpose()?,
            rejected: rejected.map(open_append).transpose()?,
        })
    }

    pub fn disabled() -> Self {
        Self::default()
    }
}

fn open_append(path: &Path) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

/// Prefixes every line of `message` with `prefix`.
fn prefixed(prefix: &str, message: &str) -> String {
    message
        .lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl RejectionSink for RejectionLog {
    fn record(&mut self, event: &RejectionEvent) -> io::Result<()> {
        let prefix = format!("{} - ", event.timestamp.format(TIMESTAMP_FORMAT));

        if let Some(out) = self.exceptions.as_mut() {
            writeln!(out, "{}", prefixed(&prefix, &event.reason))?;
            for cause in &event.causes {
                writeln!(out, "{}", prefixed(&prefix, &format!("Caused by: {cause}")))?;
            }
            out.flush()?;
        }
        if let Some(out) = self.rejected.as_mut() {
            writeln!(out, "{prefix}Row rejected: {}", event.row_text())?;
            out.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(mut out) = self.exceptions.take() {
            out.flush()?;
        }
        if let Some(mut out) = self.rejected.take() {
            out.flush()?;
        }
        Ok(())
    }
}
