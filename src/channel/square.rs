#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::blip::{Generator, Synth};
use crate::channel::{skip_steps, Channel};

/// Periods shorter than this are ultrasonic and get muted.
const MIN_PERIOD: u32 = 16;
const STEPS: u8 = 8;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duty {
    Eighth,
    Quarter,
    Half,
    ThreeQuarters,
}

impl Duty {
    /// High steps of the 8-step sequence, one bit per step.
    fn pattern(self) -> u8 {
        match self {
            Duty::Eighth => 0b0100_0000,
            Duty::Quarter => 0b0110_0000,
            Duty::Half => 0b0111_1000,
            Duty::ThreeQuarters => 0b1001_1111,
        }
    }
}

pub struct Square {
    synth: Synth,
    duty: Duty,
    /// Ticks per sequencer step.
    period: u32,
    volume: u8,
    step: u8,
    /// Tick of the next sequencer step, relative to the frame start.
    next: u32,
}

impl Square {
    pub fn new(master_volume: f32) -> Self {
        Self {
            synth: Synth::new(master_volume, 15),
            duty: Duty::Half,
            period: 0,
            volume: 0,
            step: 0,
            next: 0,
        }
    }

    pub fn set_duty(&mut self, duty: Duty) {
        self.duty = duty;
    }

    pub fn set_period(&mut self, period: u32) {
        self.period = period;
    }

    /// NES-style 11-bit timer value: one step every `(timer + 1) * 2` ticks.
    pub fn set_timer(&mut self, timer: u16) {
        self.period = (timer as u32 & 0x7FF) * 2 + 2;
    }

    /// 4-bit channel volume.
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(15);
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    fn audible(&self) -> bool {
        self.volume > 0 && self.period >= MIN_PERIOD
    }

    #[inline]
    fn level(&self) -> i32 {
        let high = self.duty.pattern() & (0x80 >> self.step) != 0;
        if high {
            self.volume as i32
        } else {
            0
        }
    }
}

impl Channel for Square {
    fn run(&mut self, time: u32, end_time: u32, out: &mut dyn Generator) {
        if !self.audible() {
            self.synth.update(out, time, 0);
            let steps = skip_steps(&mut self.next, self.period, end_time);
            self.step = ((self.step as u32 + steps) % STEPS as u32) as u8;
            return;
        }

        // Level can change mid-step after a volume or duty change.
        self.synth.update(out, time, self.level());

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
    fn test_half_duty_toggles_every_four_steps() {
        let mut sq = Square::new(1.0);
        sq.set_period(100);
        sq.set_volume(15);
        sq.set_duty(Duty::Half);

        let mut rec = Recorder::default();
        sq.run(0, 1600, &mut rec);

        let edges: Vec<u32> = rec.events.iter().map(|&(t, _)| t).collect();
        // One full cycle is 800 ticks with one rising and one falling edge.
        assert_eq!(edges, vec![0, 400, 800, 1200]);
        assert!(rec.events[0].1 > 0);
        assert!(rec.events[1].1 < 0);
    }

    #[test]
    fn test_muted_when_period_too_short() {
        let mut sq = Square::new(1.0);
        sq.set_timer(3);
        sq.set_volume(15);

        let mut rec = Recorder::default();
        sq.run(0, 10_000, &mut rec);
        assert!(rec.events.is_empty());
    }

    #[test]
    fn test_silencing_emits_falling_edge() {
        let mut sq = Square::new(1.0);
        sq.set_period(100);
        sq.set_volume(15);

        let mut rec = Recorder::default();
        sq.run(0, 50, &mut rec);
        sq.set_volume(0);
        sq.run(50, 1000, &mut rec);

        let total: i32 = rec.events.iter().map(|&(_, d)| d).sum();
        assert_eq!(total, 0);
        assert_eq!(rec.events.last().map(|&(t, _)| t), Some(50));
    }

    #[test]
    fn test_phase_continues_across_frames() {
        let mut sq = Square::new(1.0);
        sq.set_period(100);
        sq.set_volume(15);

        let mut rec = Recorder::default();
        sq.run(0, 450, &mut rec);
        sq.end_frame(450);
        sq.run(0, 450, &mut rec);

        // Falling edge at absolute tick 400, rising edge at 800 (= 350 in frame two).
        let edges: Vec<u32> = rec.events.iter().map(|&(t, _)| t).collect();
        assert_eq!(edges, vec![0, 400, 350]);
    }
}
