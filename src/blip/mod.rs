//! Band-limited step synthesis.
//!
//! Generators describe a waveform as a list of amplitude changes ("deltas")
//! stamped with the clock tick at which they happen. [`BlipBuffer`] places a
//! band-limited step at each of those positions and hands back finished PCM
//! at the output sample rate. The expensive convolution is baked into the
//! shared [`ImpulseKernel`] table, so synthesis is a handful of integer
//! multiply-adds per delta and extraction is a running sum.

/// Accumulator ring and sample extraction.
pub mod buffer;
/// Buffer configuration.
pub mod config;
pub mod error;
/// Precomputed windowed-sinc step table.
pub mod kernel;
/// Amplitude tracking with volume scaling.
pub mod synth;

pub use buffer::{BlipBuffer, BufferState};
pub use config::BlipConfig;
pub use error::BlipError;
pub use kernel::ImpulseKernel;
pub use synth::Synth;

/// Fractional bits of the fixed-point sample position.
pub const TIME_BITS: u32 = 32;
/// log2 of the number of kernel phases per output sample.
pub const PHASE_BITS: u32 = 8;
/// Number of sub-sample kernel phases.
pub const PHASE_COUNT: usize = 1 << PHASE_BITS;
/// Taps on either side of the step centre.
pub const HALF_WIDTH: usize = 12;
/// Taps per kernel phase.
pub const KERNEL_WIDTH: usize = HALF_WIDTH * 2;
/// Each kernel phase sums to `1 << KERNEL_BITS`.
pub const KERNEL_BITS: u32 = 15;
/// Longest buffer `configure` accepts, in output samples.
pub const MAX_LENGTH_SAMPLES: usize = 1 << 22;

/// NTSC NES CPU clock in Hz.
pub const NTSC_CLOCK_RATE: u32 = 1_789_773;
/// PAL NES CPU clock in Hz.
pub const PAL_CLOCK_RATE: u32 = 1_662_607;

/// Something that accepts band-limited amplitude steps.
///
/// `tick` is measured in clock-rate units from the start of the current
/// frame. Implementors decide what to do with steps they cannot place; the
/// buffer drops them and logs a diagnostic.
pub trait Generator {
    fn emit(&mut self, tick: u32, magnitude: i32);
}

impl<G: Generator + ?Sized> Generator for &mut G {
    fn emit(&mut self, tick: u32, magnitude: i32) {
        (**self).emit(tick, magnitude)
    }
}

/// Allow boxed generators to be used as generators (for dynamic dispatch)
impl Generator for Box<dyn Generator + Send> {
    fn emit(&mut self, tick: u32, magnitude: i32) {
        (**self).emit(tick, magnitude)
    }
}
