//! Benchmarks for band-limited synthesis and channel rendering.
//!
//! Run with: cargo bench
//!
//! Each iteration renders one block of output samples end to end, so the
//! numbers compare directly against the audio deadline at 44.1kHz:
//!   - 64 samples  = 1.45ms
//!   - 256 samples = 5.80ms
//!   - 735 samples = 16.67ms (one NTSC frame)
//!
//! Benchmark groups:
//!   - blip/*       Buffer and kernel primitives
//!   - scenarios/*  Channels rendering whole frames

use criterion::{criterion_group, criterion_main};

mod blip;
mod scenarios;

/// Output block sizes, in samples.
pub const BLOCK_SIZES: &[usize] = &[64, 256, 735];

pub const SAMPLE_RATE: u32 = 44_100;

criterion_group!(
    benches,
    blip::bench_kernel,
    blip::bench_buffer,
    scenarios::bench_channels,
);
criterion_main!(benches);
