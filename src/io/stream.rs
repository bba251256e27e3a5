use rtrb::{Consumer, Producer, RingBuffer};

use crate::blip::BlipBuffer;
use crate::io::pcm_to_f32;

/// Producer half of a lock-free sample handoff.
///
/// The synthesis thread owns the [`BlipBuffer`] and calls [`pump`](Self::pump)
/// after each frame; the audio callback owns the matching `Consumer` and
/// drains it with [`drain_into`]. Neither side ever blocks.
pub struct SampleStream {
    tx: Producer<i16>,
}

impl SampleStream {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(capacity: usize) -> (SampleStream, Consumer<i16>) {
        let (tx, rx) = RingBuffer::new(capacity);
        (SampleStream { tx }, rx)
    }

    /// Move as many finished samples as fit into the ring. Returns how many
    /// were moved; the rest stay in the buffer for the next call.
    pub fn pump(&mut self, buffer: &mut BlipBuffer) -> usize {
        let n = self.tx.slots().min(buffer.samples_avail());
        if n == 0 {
            return 0;
        }

        let Ok(mut chunk) = self.tx.write_chunk(n) else {
            return 0;
        };
        let (first, second) = chunk.as_mut_slices();
        let mut moved = buffer.read_samples(first);
        moved += buffer.read_samples(second);
        chunk.commit(moved);

        moved
    }

    /// Free space in the ring.
    pub fn slots(&self) -> usize {
        self.tx.slots()
    }
}

/// Fill `out` from the ring as `f32`, padding with silence on underrun.
/// Returns the number of real samples written.
pub fn drain_into(rx: &mut Consumer<i16>, out: &mut [f32]) -> usize {
    let n = rx.slots().min(out.len());

    let mut written = 0;
    if let Ok(chunk) = rx.read_chunk(n) {
        let (first, second) = chunk.as_slices();
        for (o, &s) in out.iter_mut().zip(first.iter().chain(second)) {
            *o = pcm_to_f32(s);
            written += 1;
        }
        chunk.commit_all();
    }

    out[written..].fill(0.0);
    written
}
