pub mod byte_pipe;
pub mod load_worker;
pub mod progress;

pub use byte_pipe::{PipeInterrupter, PipeReader, PipeWriter, StreamCancelled, is_cancellation, pipe};
pub use load_worker::LoadWorker;
pub use progress::LoadProgress;
