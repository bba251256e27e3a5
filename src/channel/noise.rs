use crate::blip::{Generator, Synth};
use crate::channel::{skip_steps, Channel};

/// NTSC noise timer periods in ticks.
pub const NOISE_PERIODS: [u32; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

pub struct Noise {
    synth: Synth,
    period: u32,
    volume: u8,
    /// Tap bit 6 instead of bit 1 for the short, metallic sequence.
    short_mode: bool,
    lfsr: u16,
    next: u32,
}

impl Noise {
    pub fn new(master_volume: f32) -> Self {
        Self {
            synth: Synth::new(master_volume, 15),
            period: NOISE_PERIODS[0],
            volume: 0,
            short_mode: false,
            lfsr: 1,
            next: 0,
        }
    }

    /// Select one of the 16 NTSC timer periods.
    pub fn set_period_index(&mut self, index: usize) {
        self.period = NOISE_PERIODS[index & 0x0F];
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(15);
    }

    pub fn set_short_mode(&mut self, short_mode: bool) {
        self.short_mode = short_mode;
    }

    #[inline]
    fn clock_lfsr(&mut self) {
        let tap = if self.short_mode { 6 } else { 1 };
        let feedback = (self.lfsr ^ (self.lfsr >> tap)) & 1;
        self.lfsr = (self.lfsr >> 1) | (feedback << 14);
    }

    #[inline]
    fn level(&self) -> i32 {
        if self.lfsr & 1 == 0 {
            self.volume as i32
        } else {
            0
        }
    }
}

impl Channel for Noise {
    fn run(&mut self, time: u32, end_time: u32, out: &mut dyn Generator) {
        if self.volume == 0 {
            self.synth.update(out, time, 0);
            for _ in 0..skip_steps(&mut self.next, self.period, end_time) {
                self.clock_lfsr();
            }
            return;
        }

        self.synth.update(out, time, self.level());

        let mut t = self.next.max(time);
        while t < end_time {
            self.clock_lfsr();
            self.synth.update(out, t, self.level());
            t += self.period;
        }
        self.next = t;
    }

    fn end_frame(&mut self, end_time: u32) {
        self.next = self.next.saturating_sub(end_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<(u32, i32)>,
    }

    impl Generator for Recorder {
        fn emit(&mut self, tick: u32, magnitude: i32) {
            self.events.push((tick, magnitude));
        }
    }

    #[test]
    fn test_long_sequence_period() {
        let mut noise = Noise::new(1.0);
        let start = noise.lfsr;
        let mut n = 0;
        loop {
            noise.clock_lfsr();
            n += 1;
            if noise.lfsr == start {
                break;
            }
        }
        assert_eq!(n, 32_767);
    }

    #[test]
    fn test_short_mode_repeats_quickly() {
        let mut noise = Noise::new(1.0);
        noise.set_short_mode(true);
        let start = noise.lfsr;
        let mut n = 0;
        loop {
            noise.clock_lfsr();
            n += 1;
            if noise.lfsr == start || n > 32_767 {
                break;
            }
        }
        assert!(n < 100, "short sequence took {} steps", n);
    }

    #[test]
    fn test_noise_is_balanced() {
        let mut noise = Noise::new(1.0);
        noise.set_volume(15);
        noise.set_period_index(0);

        let mut rec = Recorder::default();
        noise.run(0, 4 * 32_767, &mut rec);
        noise.set_volume(0);
        noise.run(4 * 32_767, 4 * 32_767 + 1, &mut rec);

        let total: i32 = rec.events.iter().map(|&(_, d)| d).sum();
        assert_eq!(total, 0);
        assert!(rec.events.len() > 1000);
    }
}
