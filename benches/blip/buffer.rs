//! Benchmarks for delta accumulation and sample integration.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use blip_dsp::blip::{BlipBuffer, NTSC_CLOCK_RATE};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// Deltas per output sample in the dense case (a busy square channel
/// emits well under one).
const DENSITY: usize = 4;

pub fn bench_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("blip/buffer");

    for &size in BLOCK_SIZES {
        let mut buffer = BlipBuffer::new();
        if buffer.configure(NTSC_CLOCK_RATE, SAMPLE_RATE, 100).is_err() {
            return;
        }
        let ticks = buffer.count_clocks(size);
        // One spare slot drains the sample that rounding occasionally adds
        let mut out = vec![0i16; size + 1];
        let deltas = size * DENSITY;
        let spacing = (ticks as usize / deltas).max(1) as u32;

        // Accumulate only, then discard the frame
        group.bench_with_input(BenchmarkId::new("add_delta", size), &size, |b, _| {
            b.iter(|| {
                let mut amp = 1000;
                for i in 0..deltas as u32 {
                    let _ = buffer.add_delta(black_box(i * spacing), amp);
                    amp = -amp;
                }
                let _ = buffer.end_frame(ticks);
                buffer.remove_samples(size + 1);
            })
        });

        // Integrate a frame holding a single step
        group.bench_with_input(BenchmarkId::new("read_samples", size), &size, |b, _| {
            b.iter(|| {
                let _ = buffer.add_delta(0, 1000);
                let _ = buffer.end_frame(ticks);
                buffer.read_samples(black_box(&mut out))
            })
        });
    }

    group.finish();
}
