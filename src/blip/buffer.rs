use tracing::{debug, trace};

use crate::blip::{
    BlipConfig, BlipError, Generator, ImpulseKernel, KERNEL_BITS, KERNEL_WIDTH,
    MAX_LENGTH_SAMPLES, PHASE_BITS, PHASE_COUNT, TIME_BITS,
};

/// Where a buffer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Created but `configure` has not succeeded yet.
    Unconfigured,
    /// Configured and silent: nothing deposited or advanced since the last
    /// `configure`/`clear`.
    Configured,
    /// Deltas or frame advances are pending.
    Accumulating,
}

/// Band-limited synthesis buffer.
///
/// Deltas are added at clock-tick times relative to the start of the current
/// frame. `end_frame` moves the frame start forward, which makes every output
/// sample before it available to `read_samples`. Samples come out delayed by
/// [`BlipBuffer::output_latency`] relative to the deltas that produced them.
///
/// Accumulator cells live in a power-of-two ring and hold the first
/// difference of the output signal, so reading is a running sum. Cells and
/// the running sum use wrapping `i32` arithmetic: wrapped cells still
/// integrate to the right value while the reconstructed waveform stays
/// within ±65535. Output is saturated to `i16`.
///
/// A buffer has a single owner; if synthesis and playback run on different
/// threads, hand finished samples across with
/// [`SampleStream`](crate::io::stream::SampleStream) rather than sharing the
/// buffer.
pub struct BlipBuffer {
    kernel: &'static ImpulseKernel,
    cells: Vec<i32>,
    mask: usize,
    /// Ring index of the next unread cell.
    read_pos: usize,
    /// Frame start in 32.32 fixed-point samples past the read head.
    offset: u64,
    /// Output samples per clock tick in 32.32 fixed point.
    factor: u64,
    integrator: i32,
    length_samples: usize,
    clock_rate: u32,
    sample_rate: u32,
    bass_freq: Option<u32>,
    bass_shift: Option<u32>,
    write_cursor: u64,
    read_offset: u64,
    state: BufferState,
}

impl BlipBuffer {
    /// An unconfigured buffer. Call [`configure`](Self::configure) before
    /// synthesizing.
    pub fn new() -> Self {
        Self {
            kernel: ImpulseKernel::shared(),
            cells: Vec::new(),
            mask: 0,
            read_pos: 0,
            offset: 0,
            factor: 0,
            integrator: 0,
            length_samples: 0,
            clock_rate: 0,
            sample_rate: 0,
            bass_freq: None,
            bass_shift: None,
            write_cursor: 0,
            read_offset: 0,
            state: BufferState::Unconfigured,
        }
    }

    /// Heap-allocated unconfigured buffer for handle-style owners.
    pub fn boxed() -> Box<Self> {
        Box::new(Self::new())
    }

    /// Build and configure a buffer from `config`.
    pub fn with_config(config: &BlipConfig) -> Result<Self, BlipError> {
        let mut buffer = Self::new();
        buffer.configure(config.clock_rate, config.sample_rate, config.buffer_length_ms)?;
        buffer.set_bass_freq(config.bass_freq);
        Ok(buffer)
    }

    /// Set time bases and allocate room for `buffer_length_ms` of output.
    ///
    /// Resets all pending audio. On error the previous configuration, if
    /// any, is left untouched.
    pub fn configure(
        &mut self,
        clock_rate: u32,
        sample_rate: u32,
        buffer_length_ms: u32,
    ) -> Result<(), BlipError> {
        if clock_rate == 0 {
            return Err(BlipError::Config {
                reason: "clock rate must be positive",
            });
        }
        if sample_rate == 0 {
            return Err(BlipError::Config {
                reason: "sample rate must be positive",
            });
        }
        if sample_rate > clock_rate {
            return Err(BlipError::Config {
                reason: "sample rate must not exceed clock rate",
            });
        }

        let length = (sample_rate as u64 * buffer_length_ms as u64).div_ceil(1000);
        if length == 0 {
            return Err(BlipError::Config {
                reason: "buffer length is zero",
            });
        }
        if length > MAX_LENGTH_SAMPLES as u64 {
            return Err(BlipError::Config {
                reason: "buffer length is too long",
            });
        }

        let length_samples = length as usize;
        let capacity = (length_samples + KERNEL_WIDTH + 1).next_power_of_two();

        self.cells = vec![0; capacity];
        self.mask = capacity - 1;
        self.length_samples = length_samples;
        self.clock_rate = clock_rate;
        self.sample_rate = sample_rate;
        self.factor = ((((sample_rate as u128) << TIME_BITS) + clock_rate as u128 / 2)
            / clock_rate as u128) as u64;
        self.state = BufferState::Configured;
        self.set_bass_freq(self.bass_freq);
        self.clear();

        debug!(
            clock_rate,
            sample_rate,
            length_samples,
            capacity,
            "configured blip buffer"
        );

        Ok(())
    }

    /// Enable a one-pole DC-blocking filter at roughly `hz`, or disable it
    /// with `None`. Takes effect on the next read.
    pub fn set_bass_freq(&mut self, hz: Option<u32>) {
        self.bass_freq = hz;
        self.bass_shift = match hz {
            Some(freq) if freq > 0 && self.sample_rate > 0 => {
                let mut f = ((freq as u64) << 16) / self.sample_rate as u64;
                let mut shift = 13u32;
                loop {
                    f >>= 1;
                    if f == 0 || shift == 1 {
                        break;
                    }
                    shift -= 1;
                }
                Some(shift)
            }
            _ => None,
        };
    }

    /// Deposit a band-limited step of `amplitude` at `tick` clocks past the
    /// start of the current frame.
    ///
    /// Steps that would land outside the buffer are dropped; the error is
    /// informational and the buffer is unchanged.
    pub fn add_delta(&mut self, tick: u32, amplitude: i32) -> Result<(), BlipError> {
        if self.state == BufferState::Unconfigured {
            return Err(BlipError::NotConfigured);
        }

        let Some((index, phase)) = self.position(tick) else {
            debug!(tick, amplitude, "dropping delta outside writable window");
            return Err(BlipError::OutOfRange { tick });
        };

        if index > self.length_samples {
            debug!(
                tick,
                amplitude,
                index,
                length = self.length_samples,
                "dropping delta outside writable window"
            );
            return Err(BlipError::OutOfRange { tick });
        }

        let start = self.read_pos + index;
        for (k, &tap) in self.kernel.coefficients_for_phase(phase).iter().enumerate() {
            let cell = &mut self.cells[(start + k) & self.mask];
            *cell = cell.wrapping_add(tap.wrapping_mul(amplitude));
        }

        self.state = BufferState::Accumulating;
        Ok(())
    }

    /// Nearest kernel phase for `tick`, as (sample index past the read head,
    /// phase).
    #[inline]
    fn position(&self, tick: u32) -> Option<(usize, usize)> {
        let shift = TIME_BITS - PHASE_BITS;
        let pos = (tick as u64)
            .checked_mul(self.factor)?
            .checked_add(self.offset)?
            .checked_add(1 << (shift - 1))?;
        let phased = pos >> shift;

        Some((
            (phased >> PHASE_BITS) as usize,
            (phased as usize) & (PHASE_COUNT - 1),
        ))
    }

    /// Close the current frame `tick_count` clocks after its start.
    ///
    /// Output samples before the new frame start become available. Fails
    /// with [`BlipError::FrameOverflow`] if that would put more than the
    /// buffer length ahead of the read head; nothing changes in that case.
    pub fn end_frame(&mut self, tick_count: u32) -> Result<(), BlipError> {
        if self.state == BufferState::Unconfigured {
            return Err(BlipError::NotConfigured);
        }

        let limit = (self.length_samples as u64) << TIME_BITS;
        let next = (tick_count as u64)
            .checked_mul(self.factor)
            .and_then(|d| d.checked_add(self.offset))
            .filter(|&next| next <= limit);

        let Some(next) = next else {
            let available = self.clocks_remaining();
            debug!(tick_count, available, "frame overflow");
            return Err(BlipError::FrameOverflow {
                requested: tick_count,
                available,
            });
        };

        self.offset = next;
        self.write_cursor += tick_count as u64;
        self.state = BufferState::Accumulating;

        trace!(tick_count, avail = self.samples_avail(), "end frame");
        Ok(())
    }

    /// Largest `tick_count` that `end_frame` accepts right now.
    pub fn clocks_remaining(&self) -> u32 {
        if self.factor == 0 {
            return 0;
        }
        let limit = (self.length_samples as u64) << TIME_BITS;
        let room = limit.saturating_sub(self.offset) / self.factor;
        room.min(u32::MAX as u64) as u32
    }

    /// Clocks needed in `end_frame` to make `samples` more samples
    /// available. The answer may exceed [`clocks_remaining`](Self::clocks_remaining).
    pub fn count_clocks(&self, samples: usize) -> u32 {
        if self.factor == 0 {
            return 0;
        }
        let target = (self.samples_avail() as u128 + samples as u128) << TIME_BITS;
        let needed = target.saturating_sub(self.offset as u128);
        let ticks = needed.div_ceil(self.factor as u128);
        ticks.min(u32::MAX as u128) as u32
    }

    /// Samples that `end_frame(tick_count)` would make available.
    pub fn count_samples(&self, tick_count: u32) -> usize {
        let next = self.offset as u128 + tick_count as u128 * self.factor as u128;
        ((next >> TIME_BITS) - (self.offset as u128 >> TIME_BITS)) as usize
    }

    /// Finished samples waiting to be read.
    #[inline]
    pub fn samples_avail(&self) -> usize {
        (self.offset >> TIME_BITS) as usize
    }

    /// Read up to `out.len()` mono samples. Returns how many were written;
    /// never waits for more.
    pub fn read_samples(&mut self, out: &mut [i16]) -> usize {
        let count = out.len().min(self.samples_avail());
        self.integrate(count, |i, s| out[i] = s);
        count
    }

    /// Read into the even slots of an interleaved stereo slice, leaving the
    /// odd slots alone. Returns the number of frames written.
    pub fn read_samples_stereo(&mut self, out: &mut [i16]) -> usize {
        let count = (out.len() / 2).min(self.samples_avail());
        self.integrate(count, |i, s| out[i * 2] = s);
        count
    }

    /// Drop up to `count` available samples without producing output.
    pub fn remove_samples(&mut self, count: usize) -> usize {
        let count = count.min(self.samples_avail());
        self.integrate(count, |_, _| {});
        count
    }

    /// Run the integrator over the next `count` cells, zeroing them for
    /// reuse and advancing the read head.
    fn integrate(&mut self, count: usize, mut sink: impl FnMut(usize, i16)) {
        if count == 0 {
            return;
        }

        let mut sum = self.integrator;
        for i in 0..count {
            let cell = &mut self.cells[(self.read_pos + i) & self.mask];
            sum = sum.wrapping_add(*cell);
            *cell = 0;

            let s = sum >> KERNEL_BITS;
            sink(i, s.clamp(i16::MIN as i32, i16::MAX as i32) as i16);

            if let Some(shift) = self.bass_shift {
                sum = sum.wrapping_sub(sum >> shift);
            }
        }
        self.integrator = sum;

        self.read_pos = (self.read_pos + count) & self.mask;
        self.offset -= (count as u64) << TIME_BITS;
        self.read_offset += count as u64;
    }

    /// Back to silence: accumulators, cursors and the integrator are reset.
    /// Calling it again changes nothing.
    pub fn clear(&mut self) {
        self.cells.fill(0);
        self.read_pos = 0;
        self.offset = 0;
        self.integrator = 0;
        self.write_cursor = 0;
        self.read_offset = 0;
        if self.state != BufferState::Unconfigured {
            self.state = BufferState::Configured;
        }
    }

    /// Samples between a delta and the middle of its step in the output.
    pub const fn output_latency() -> usize {
        KERNEL_WIDTH / 2
    }

    pub fn state(&self) -> BufferState {
        self.state
    }

    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn length_samples(&self) -> usize {
        self.length_samples
    }

    /// Clocks advanced by `end_frame` since the last configure/clear.
    pub fn write_cursor(&self) -> u64 {
        self.write_cursor
    }

    /// Samples read or removed since the last configure/clear.
    pub fn read_offset(&self) -> u64 {
        self.read_offset
    }
}

impl Default for BlipBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for BlipBuffer {
    fn emit(&mut self, tick: u32, magnitude: i32) {
        // Out-of-range steps are dropped and already logged.
        let _ = self.add_delta(tick, magnitude);
    }
}
