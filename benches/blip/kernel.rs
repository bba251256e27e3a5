//! Benchmarks for the impulse table.

use std::hint::black_box;

use criterion::Criterion;
use blip_dsp::blip::{ImpulseKernel, PHASE_COUNT};

pub fn bench_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("blip/kernel");

    // Cold start cost paid once per process
    group.bench_function("build", |b| b.iter(|| black_box(ImpulseKernel::build())));

    let kernel = ImpulseKernel::shared();
    group.bench_function("row_lookup", |b| {
        b.iter(|| {
            let mut acc = 0i32;
            for phase in 0..PHASE_COUNT {
                acc = acc.wrapping_add(kernel.coefficients_for_phase(black_box(phase))[0]);
            }
            acc
        })
    });

    group.finish();
}
