pub mod factories;
pub mod factory;
pub mod memory_rejections;
pub mod memory_sink;
