#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::blip::NTSC_CLOCK_RATE;

/// Time bases and size of a [`BlipBuffer`](super::BlipBuffer).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlipConfig {
    /// Input clock ticks per second.
    pub clock_rate: u32,
    /// Output samples per second.
    pub sample_rate: u32,
    /// Capacity in milliseconds of output audio.
    pub buffer_length_ms: u32,
    /// Corner frequency of the DC-blocking filter, `None` to disable.
    pub bass_freq: Option<u32>,
}

impl BlipConfig {
    pub fn new(clock_rate: u32, sample_rate: u32) -> Self {
        Self {
            clock_rate,
            sample_rate,
            ..Self::default()
        }
    }

    pub fn buffer_length_ms(mut self, ms: u32) -> Self {
        self.buffer_length_ms = ms;
        self
    }

    pub fn bass_freq(mut self, hz: Option<u32>) -> Self {
        self.bass_freq = hz;
        self
    }

    /// Clock ticks in one frame at `frames_per_second`.
    pub fn ticks_per_frame(&self, frames_per_second: u32) -> u32 {
        self.clock_rate / frames_per_second.max(1)
    }
}

impl Default for BlipConfig {
    fn default() -> Self {
        Self {
            clock_rate: NTSC_CLOCK_RATE,
            sample_rate: 44_100,
            buffer_length_ms: 100,
            bass_freq: None,
        }
    }
}
