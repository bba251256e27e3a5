//! Real-world scenario benchmarks.
//!
//! Channels render full frames into a shared buffer, as the player does.

mod channels;

pub use channels::bench_channels;
