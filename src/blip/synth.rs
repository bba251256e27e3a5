use crate::blip::Generator;

/// Turns absolute amplitudes into scaled deltas.
///
/// Channels think in small integer levels (a 4-bit volume, a 7-bit DAC);
/// `Synth` maps `range` input steps onto `volume` of full-scale `i16` output
/// and emits only the change since the previous update. It tracks the scaled
/// level rather than the raw delta so rounding never accumulates into a DC
/// drift.
#[derive(Debug, Clone)]
pub struct Synth {
    /// Output units per input step, 16.16 fixed point.
    unit: i64,
    last_level: i32,
    last_amp: i32,
}

impl Synth {
    pub fn new(volume: f32, range: u32) -> Self {
        Self {
            unit: Self::unit_for(volume, range),
            last_level: 0,
            last_amp: 0,
        }
    }

    fn unit_for(volume: f32, range: u32) -> i64 {
        let scale = volume.clamp(0.0, 1.0) as f64 * i16::MAX as f64 / range.max(1) as f64;
        (scale * 65536.0).round() as i64
    }

    /// Change the volume. The next `update` moves to the newly scaled level.
    pub fn set_volume(&mut self, volume: f32, range: u32) {
        self.unit = Self::unit_for(volume, range);
    }

    #[inline]
    fn level(&self, amplitude: i32) -> i32 {
        ((amplitude as i64 * self.unit) >> 16) as i32
    }

    /// Move to `amplitude` at `tick`, emitting the scaled difference.
    #[inline]
    pub fn update<G: Generator + ?Sized>(&mut self, out: &mut G, tick: u32, amplitude: i32) {
        self.last_amp = amplitude;
        let level = self.level(amplitude);
        let delta = level - self.last_level;
        if delta != 0 {
            self.last_level = level;
            out.emit(tick, delta);
        }
    }

    /// Emit a scaled step of `delta` input units without touching the
    /// tracked amplitude.
    #[inline]
    pub fn offset<G: Generator + ?Sized>(&self, out: &mut G, tick: u32, delta: i32) {
        let scaled = self.level(delta);
        if scaled != 0 {
            out.emit(tick, scaled);
        }
    }

    /// Amplitude passed to the most recent `update`.
    pub fn last_amp(&self) -> i32 {
        self.last_amp
    }

    /// Forget the tracked amplitude, e.g. after the buffer was cleared.
    pub fn reset(&mut self) {
        self.last_level = 0;
        self.last_amp = 0;
    }
}
