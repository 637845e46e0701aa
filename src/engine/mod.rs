pub mod errors;
pub mod load;
pub mod native;
pub mod pipe;
pub mod sink;
pub mod types;

pub use errors::*;
