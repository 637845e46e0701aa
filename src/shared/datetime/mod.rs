pub mod epoch;
pub mod time;

#[cfg(test)]
mod epoch_test;
