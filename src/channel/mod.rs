//! Tone channels that drive a [`Generator`].
//!
//! Each channel steps a small waveform sequencer on a tick timer and reports
//! level changes through its own [`Synth`](crate::blip::Synth). Channels
//! only know about time within the current frame: render with
//! [`Channel::run`], then call [`Channel::end_frame`] with the same length
//! passed to the buffer's `end_frame`.

/// Pseudo-random noise from a 15-bit LFSR.
pub mod noise;
/// Pulse wave with selectable duty cycle.
pub mod square;
/// 32-step triangle wave.
pub mod triangle;

pub use noise::Noise;
pub use square::{Duty, Square};
pub use triangle::Triangle;

use crate::blip::Generator;

pub trait Channel: Send {
    /// Emit transitions for `[time, end_time)`. `time` is where this call
    /// takes over, e.g. the tick of a parameter change.
    fn run(&mut self, time: u32, end_time: u32, out: &mut dyn Generator);

    /// Rebase internal timers once the frame ending at `end_time` is closed.
    fn end_frame(&mut self, end_time: u32);
}

/// Allow boxed channels to be used as channels (for dynamic dispatch)
impl Channel for Box<dyn Channel> {
    fn run(&mut self, time: u32, end_time: u32, out: &mut dyn Generator) {
        (**self).run(time, end_time, out)
    }

    fn end_frame(&mut self, end_time: u32) {
        (**self).end_frame(end_time)
    }
}

/// Ticks per sequencer step for a waveform of `steps` steps at `freq_hz`.
pub fn period_for(freq_hz: f32, clock_rate: u32, steps: u32) -> u32 {
    if freq_hz <= 0.0 {
        return 0;
    }
    (clock_rate as f32 / (freq_hz * steps as f32)).round() as u32
}

/// Equal-tempered frequency of a MIDI note number, A4 = 440 Hz = note 69.
#[inline]
pub fn note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Advance a free-running sequencer past `end_time` without emitting.
/// Returns the number of steps taken.
#[inline]
pub(crate) fn skip_steps(next: &mut u32, period: u32, end_time: u32) -> u32 {
    if *next >= end_time || period == 0 {
        *next = (*next).max(end_time);
        return 0;
    }
    let count = (end_time - *next).div_ceil(period);
    *next += count * period;
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_for_a440() {
        // NTSC clock, 8-step pulse
        assert_eq!(period_for(440.0, 1_789_773, 8), 508);
        assert_eq!(period_for(0.0, 1_789_773, 8), 0);
    }

    #[test]
    fn test_note_to_freq() {
        assert!((note_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((note_to_freq(81) - 880.0).abs() < 1e-2);
        assert!((note_to_freq(60) - 261.63).abs() < 1e-2);
    }

    #[test]
    fn test_skip_steps_lands_past_end() {
        let mut next = 10;
        let steps = skip_steps(&mut next, 7, 30);
        assert_eq!(steps, 3);
        assert_eq!(next, 31);

        let mut next = 40;
        assert_eq!(skip_steps(&mut next, 7, 30), 0);
        assert_eq!(next, 40);
    }
}
