use std::f64::consts::PI;
use std::sync::OnceLock;

use crate::blip::{HALF_WIDTH, KERNEL_BITS, KERNEL_WIDTH, PHASE_COUNT};

/// Lowpass corner in cycles per output sample (0.8 x Nyquist).
const CUTOFF: f64 = 0.4;
/// Midpoint quadrature steps per tap.
const QUADRATURE_STEPS: usize = 64;

static SHARED: OnceLock<ImpulseKernel> = OnceLock::new();

/// Band-limited step table, one row of [`KERNEL_WIDTH`] taps per phase.
///
/// Tap `k` of phase `p` is the amount the band-limited step, centred `p /
/// PHASE_COUNT` of a sample past the start of the row, rises across output
/// sample `k`. Adding a row into the accumulator and running a cumulative sum
/// therefore reproduces the step itself. Every row sums to exactly
/// `1 << KERNEL_BITS` so a step of magnitude `m` settles at exactly `m`.
///
/// The step is the integral of a Hann-windowed sinc spanning
/// `±HALF_WIDTH` samples.
pub struct ImpulseKernel {
    taps: Vec<i32>,
}

impl ImpulseKernel {
    /// The process-wide table, built on first use.
    pub fn shared() -> &'static ImpulseKernel {
        SHARED.get_or_init(ImpulseKernel::build)
    }

    /// Compute a fresh table. Callers normally want [`shared`](Self::shared).
    pub fn build() -> Self {
        let mut taps = Vec::with_capacity(PHASE_COUNT * KERNEL_WIDTH);
        let mut row = [0.0f64; KERNEL_WIDTH];

        for phase in 0..PHASE_COUNT {
            let frac = phase as f64 / PHASE_COUNT as f64;

            for (k, tap) in row.iter_mut().enumerate() {
                let start = k as f64 - HALF_WIDTH as f64 - frac;
                *tap = integrate(start, start + 1.0);
            }

            taps.extend_from_slice(&quantize(&row));
        }

        Self { taps }
    }

    /// Fixed-point taps for `phase`, `KERNEL_WIDTH` long.
    ///
    /// Panics if `phase >= PHASE_COUNT`.
    #[inline]
    pub fn coefficients_for_phase(&self, phase: usize) -> &[i32] {
        assert!(phase < PHASE_COUNT, "kernel phase {} out of range", phase);
        let start = phase * KERNEL_WIDTH;
        &self.taps[start..start + KERNEL_WIDTH]
    }
}

/// Hann-windowed sinc, unit area.
fn impulse(t: f64) -> f64 {
    let half = HALF_WIDTH as f64;
    if t.abs() >= half {
        return 0.0;
    }

    let window = 0.5 * (1.0 + (PI * t / half).cos());
    let x = 2.0 * CUTOFF * t;
    let sinc = if x.abs() < 1e-12 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    };

    2.0 * CUTOFF * sinc * window
}

fn integrate(from: f64, to: f64) -> f64 {
    let step = (to - from) / QUADRATURE_STEPS as f64;
    (0..QUADRATURE_STEPS)
        .map(|i| impulse(from + (i as f64 + 0.5) * step))
        .sum::<f64>()
        * step
}

/// Scale a row to `1 << KERNEL_BITS` and fold the rounding error into its
/// largest tap.
fn quantize(row: &[f64; KERNEL_WIDTH]) -> [i32; KERNEL_WIDTH] {
    let unit = (1i32 << KERNEL_BITS) as f64;
    let total: f64 = row.iter().sum();

    let mut out = [0i32; KERNEL_WIDTH];
    for (o, &v) in out.iter_mut().zip(row) {
        *o = (v * unit / total).round() as i32;
    }

    let error = (1i32 << KERNEL_BITS) - out.iter().sum::<i32>();
    let peak = out
        .iter()
        .enumerate()
        .max_by_key(|(_, v)| v.abs())
        .map(|(i, _)| i)
        .unwrap_or(HALF_WIDTH);
    out[peak] += error;

    out
}
