//! Tune - frame-stepped demo song for the three channels

use blip_dsp::{
    channel::{note_to_freq, period_for, Channel, Duty, Noise, Square, Triangle},
    BlipBuffer, BlipError,
};

/// One row of the tune. `None` leaves the channel silent for the row.
#[derive(Clone, Copy)]
pub struct Row {
    pub lead: Option<u8>,
    pub bass: Option<u8>,
    pub hat: bool,
}

const fn row(lead: Option<u8>, bass: Option<u8>, hat: bool) -> Row {
    Row { lead, bass, hat }
}

/// The channels a tune plays on
pub struct Voices {
    pub lead: Square,
    pub bass: Triangle,
    pub hat: Noise,
}

impl Voices {
    pub fn new() -> Self {
        let mut lead = Square::new(0.35);
        lead.set_duty(Duty::Quarter);
        Self {
            lead,
            bass: Triangle::new(0.45),
            hat: Noise::new(0.2),
        }
    }
}

/// Looping row sequencer advanced once per emulated frame
pub struct Tune {
    rows: Vec<Row>,
    frames_per_row: u32,
    position: usize,
    frame: u32,
}

impl Tune {
    pub fn new(rows: Vec<Row>, frames_per_row: u32) -> Self {
        Self {
            rows,
            frames_per_row: frames_per_row.max(1),
            position: 0,
            frame: 0,
        }
    }

    /// A short arpeggio over a walking bass.
    pub fn demo() -> Self {
        const C4: u8 = 60;
        let arp = [0, 3, 7, 12, 7, 3, 0, 3];
        let bass = [36, 36, 43, 43, 41, 41, 43, 43];

        let rows = arp
            .iter()
            .cycle()
            .zip(bass.iter().cycle())
            .take(32)
            .enumerate()
            .map(|(i, (&a, &b))| {
                let lead = if i % 8 == 7 { None } else { Some(C4 + a) };
                row(lead, Some(b), i % 2 == 0)
            })
            .collect();

        Self::new(rows, 7)
    }

    /// Render one frame of `end_time` ticks into `buffer` and close it.
    pub fn render_frame(
        &mut self,
        voices: &mut Voices,
        buffer: &mut BlipBuffer,
        end_time: u32,
    ) -> Result<(), BlipError> {
        if self.rows.is_empty() {
            return buffer.end_frame(end_time);
        }

        let clock_rate = buffer.clock_rate();
        let current = self.rows[self.position];

        if self.frame == 0 {
            match current.lead {
                Some(note) => {
                    voices.lead.set_period(period_for(note_to_freq(note), clock_rate, 8));
                    voices.lead.set_volume(12);
                }
                None => voices.lead.set_volume(0),
            }
            match current.bass {
                Some(note) => {
                    voices.bass.set_period(period_for(note_to_freq(note), clock_rate, 32));
                    voices.bass.set_halted(false);
                }
                None => voices.bass.set_halted(true),
            }
            voices.hat.set_period_index(if current.hat { 3 } else { 12 });
            voices.hat.set_volume(if current.hat { 12 } else { 0 });
        } else if current.hat {
            // Quick decay
            voices.hat.set_volume(12u8.saturating_sub(self.frame as u8 * 4));
        }

        voices.lead.run(0, end_time, buffer);
        voices.bass.run(0, end_time, buffer);
        voices.hat.run(0, end_time, buffer);
        voices.lead.end_frame(end_time);
        voices.bass.end_frame(end_time);
        voices.hat.end_frame(end_time);
        buffer.end_frame(end_time)?;

        self.frame += 1;
        if self.frame == self.frames_per_row {
            self.frame = 0;
            self.position = (self.position + 1) % self.rows.len();
        }

        Ok(())
    }
}
