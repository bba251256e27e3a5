//! Benchmarks for the blip buffer primitives.

mod buffer;
mod kernel;

pub use buffer::bench_buffer;
pub use kernel::bench_kernel;
