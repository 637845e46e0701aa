use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

/// Payload of the I/O error returned once a pipe has been interrupted.
#[derive(Debug, Error)]
#[error("Stream cancelled")]
pub struct StreamCancelled;

/// True when `err` came from an interrupted pipe.
pub fn is_cancellation(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::ConnectionAborted
        && err.get_ref().is_some_and(|inner| inner.is::<StreamCancelled>())
}

fn cancelled() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionAborted, StreamCancelled)
}

#[derive(Debug)]
struct PipeState {
    buf: VecDeque<u8>,
    capacity: usize,
    writer_closed: bool,
    reader_closed: bool,
    interrupted: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<PipeState>,
    readable: Condvar,
    writable: Condvar,
}

/// Creates a bounded in-memory byte channel holding at most `capacity`
/// bytes. Writes block while it is full, reads block while it is empty.
/// Dropping the writer is end of stream; dropping the reader makes further
/// writes fail with `BrokenPipe`.
pub fn pipe(capacity: usize) -> (PipeWriter, PipeReader) {
    let capacity = capacity.max(1);
    let shared = Arc::new(Shared {
        state: Mutex::new(PipeState {
            buf: VecDeque::with_capacity(capacity),
            capacity,
            writer_closed: false,
            reader_closed: false,
            interrupted: false,
        }),
        readable: Condvar::new(),
        writable: Condvar::new(),
    });
    (
        PipeWriter {
            shared: Arc::clone(&shared),
        },
        PipeReader { shared },
    )
}

#[derive(Debug)]
pub struct PipeWriter {
    shared: Arc<Shared>,
}

impl PipeWriter {
    pub fn interrupter(&self) -> PipeInterrupter {
        PipeInterrupter {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Write for PipeWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let mut state = self.shared.state.lock();
        loop {
            if state.interrupted {
                return Err(cancelled());
            }
            if state.reader_closed {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe reader closed"));
            }
            let free = state.capacity - state.buf.len();
            if free > 0 {
                let n = free.min(data.len());
                state.buf.extend(&data[..n]);
                self.shared.readable.notify_one();
                return Ok(n);
            }
            self.shared.writable.wait(&mut state);
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        self.shared.state.lock().writer_closed = true;
        self.shared.readable.notify_all();
    }
}

#[derive(Debug)]
pub struct PipeReader {
    shared: Arc<Shared>,
}

impl PipeReader {
    pub fn interrupter(&self) -> PipeInterrupter {
        PipeInterrupter {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        let mut state = self.shared.state.lock();
        loop {
            if state.interrupted {
                return Err(cancelled());
            }
            if !state.buf.is_empty() {
                let n = out.len().min(state.buf.len());
                for (slot, byte) in out.iter_mut().zip(state.buf.drain(..n)) {
                    *slot = byte;
                }
                self.shared.writable.notify_one();
                return Ok(n);
            }
            if state.writer_closed {
                return Ok(0);
            }
            self.shared.readable.wait(&mut state);
        }
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        self.shared.state.lock().reader_closed = true;
        self.shared.writable.notify_all();
    }
}

/// Wakes both ends of a pipe and makes every later read or write fail with
/// a cancellation error.
#[derive(Debug, Clone)]
pub struct PipeInterrupter {
    shared: Arc<Shared>,
}

impl PipeInterrupter {
    pub fn interrupt(&self) {
        self.shared.state.lock().interrupted = true;
        self.shared.readable.notify_all();
        self.shared.writable.notify_all();
    }

    pub fn is_interrupted(&self) -> bool {
        self.shared.state.lock().interrupted
    }
}
