use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::engine::errors::SinkError;
use crate::engine::native::NativeReader;
use crate::engine::pipe::is_cancellation;
use crate::engine::sink::{BulkLoadSink, LoadOutcome};

/// Persists a NATIVE stream to a file, checking its framing on the way.
/// Every complete row counts as accepted; a malformed stream is rejected.
/// Rolling back removes the file.
#[derive(Debug)]
pub struct NativeFileSink {
    path: PathBuf,
    statement: Option<String>,
}

impl NativeFileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            statement: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Statement of the last `copy_stream` call.
    pub fn statement(&self) -> Option<&str> {
        self.statement.as_deref()
    }
}

/// Copies everything read through it into `out`.
struct Tee<'a, R: Read + ?Sized, W: Write> {
    inner: &'a mut R,
    out: W,
}

impl<R: Read + ?Sized, W: Write> Read for Tee<'_, R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.out.write_all(&buf[..n])?;
        Ok(n)
    }
}

fn classify(err: io::Error) -> SinkError {
    match err.kind() {
        _ if is_cancellation(&err) => SinkError::Io(err),
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            SinkError::Rejected(format!("Malformed NATIVE stream: {err}"))
        }
        _ => SinkError::Io(err),
    }
}

impl BulkLoadSink for NativeFileSink {
    fn copy_stream(&mut self, statement: &str, stream: &mut dyn Read) -> Result<LoadOutcome, SinkError> {
        debug!(target: "native_file_sink::copy_stream", statement, "copy stmt");
        self.statement = Some(statement.to_string());

        let file = File::create(&self.path)?;
        let tee = Tee {
            inner: stream,
            out: BufWriter::new(file),
        };

        let mut reader = NativeReader::new(tee).map_err(classify)?;
        let columns = reader.header().column_count();
        while reader.next_row().map_err(classify)?.is_some() {}
        let accepted = reader.rows_read();

        let mut tee = reader.into_inner();
        tee.out.flush()?;

        info!(
            target: "native_file_sink::copy_stream",
            path = %self.path.display(),
            columns,
            rows = accepted,
            "Stream persisted"
        );
        Ok(LoadOutcome { accepted, rejected: 0 })
    }

    fn rollback(&mut self) -> Result<(), SinkError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                warn!(target: "native_file_sink::rollback", path = %self.path.display(), "Removed partial output");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SinkError::Io(e)),
        }
    }
}
