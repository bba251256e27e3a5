//! Benchmarks for channel rendering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use blip_dsp::blip::{BlipBuffer, NTSC_CLOCK_RATE};
use blip_dsp::channel::{note_to_freq, period_for, Channel, Duty, Noise, Square, Triangle};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_channels(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/channels");

    for &size in BLOCK_SIZES {
        let mut buffer = BlipBuffer::new();
        if buffer.configure(NTSC_CLOCK_RATE, SAMPLE_RATE, 100).is_err() {
            return;
        }
        let ticks = buffer.count_clocks(size);
        // One spare slot drains the sample that rounding occasionally adds
        let mut out = vec![0i16; size + 1];

        // === SQUARE ===
        // A5 lead, 8 steps per cycle
        let mut square = Square::new(0.5);
        square.set_duty(Duty::Half);
        square.set_volume(15);
        square.set_period(period_for(note_to_freq(81), NTSC_CLOCK_RATE, 8));

        group.bench_with_input(BenchmarkId::new("square", size), &size, |b, _| {
            b.iter(|| {
                square.run(0, ticks, &mut buffer);
                square.end_frame(ticks);
                let _ = buffer.end_frame(ticks);
                buffer.read_samples(black_box(&mut out))
            })
        });

        // === NOISE ===
        // Fastest period: the worst case for delta count
        let mut noise = Noise::new(0.5);
        noise.set_period_index(0);
        noise.set_volume(15);

        group.bench_with_input(BenchmarkId::new("noise", size), &size, |b, _| {
            b.iter(|| {
                noise.run(0, ticks, &mut buffer);
                noise.end_frame(ticks);
                let _ = buffer.end_frame(ticks);
                buffer.read_samples(black_box(&mut out))
            })
        });

        // === FULL MIX ===
        // All three channels through dynamic dispatch
        let mut lead = Square::new(0.35);
        lead.set_volume(12);
        lead.set_period(period_for(note_to_freq(72), NTSC_CLOCK_RATE, 8));
        let mut bass = Triangle::new(0.45);
        bass.set_halted(false);
        bass.set_period(period_for(note_to_freq(36), NTSC_CLOCK_RATE, 32));
        let mut hat = Noise::new(0.2);
        hat.set_period_index(3);
        hat.set_volume(8);
        let mut channels: Vec<Box<dyn Channel>> = vec![Box::new(lead), Box::new(bass), Box::new(hat)];

        group.bench_with_input(BenchmarkId::new("mix", size), &size, |b, _| {
            b.iter(|| {
                for channel in channels.iter_mut() {
                    channel.run(0, ticks, &mut buffer);
                    channel.end_frame(ticks);
                }
                let _ = buffer.end_frame(ticks);
                buffer.read_samples(black_box(&mut out))
            })
        });
    }

    group.finish();
}
