use crate::blip::{Generator, Synth};
use crate::channel::Channel;

const STEPS: u8 = 32;

/// 4-bit stepped triangle. When halted it holds its current level instead of
/// dropping to zero, which avoids a click.
pub struct Triangle {
    synth: Synth,
    period: u32,
    step: u8,
    halted: bool,
    next: u32,
}

impl Triangle {
    pub fn new(master_volume: f32) -> Self {
        Self {
            synth: Synth::new(master_volume, 15),
            period: 0,
            step: 0,
            halted: true,
            next: 0,
        }
    }

    pub fn set_period(&mut self, period: u32) {
        self.period = period;
    }

    /// NES-style 11-bit timer value: one step every `timer + 1` ticks.
    pub fn set_timer(&mut self, timer: u16) {
        self.period = (timer as u32 & 0x7FF) + 1;
    }

    pub fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }

    /// 15 down to 0, then 0 up to 15.
    #[inline]
    fn level(&self) -> i32 {
        let half = STEPS / 2;
        if self.step < half {
            (half - 1 - self.step) as i32
        } else {
            (self.step - half) as i32
        }
    }
}

impl Channel for Triangle {
    fn run(&mut self, time: u32, end_time: u32, out: &mut dyn Generator) {
        self.synth.update(out, time, self.level());

        if self.halted || self.period == 0 {
            self.next = self.next.max(end_time);
            return;
        }

        let mut t = self.next.max(time);
        while t < end_time {
            self.step = (self.step + 1) % STEPS;
            self.synth.update(out, t, self.level());
            t += self.period;
        }
        self.next = t;
    }

    fn end_frame(&mut self, end_time: u32) {
        self.next = self.next.saturating_sub(end_time);
    }
}
