//! BlipScope - application builder and runner

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use blip_dsp::{
    blip::NTSC_CLOCK_RATE,
    io::stream::{drain_into, SampleStream},
    BlipBuffer, BlipConfig, BlipError, MAX_BLOCK_SIZE,
};

use super::tune::{Tune, Voices};
use super::ui::{ScopeInfo, UiApp};

/// Samples of headroom between synthesis and the audio callback
const STREAM_CAPACITY: usize = 4096;
/// Samples forwarded to the scope
const VIS_CAPACITY: usize = 8192;

/// Main application builder
pub struct BlipScope {
    clock_rate: u32,
    frame_rate: u32,
    bass_freq: Option<u32>,
    tune: Tune,
}

impl BlipScope {
    pub fn new() -> Self {
        Self {
            clock_rate: NTSC_CLOCK_RATE,
            frame_rate: 60,
            bass_freq: None,
            tune: Tune::new(Vec::new(), 1),
        }
    }

    /// Emulated frames per second; one tune row step per frame
    pub fn frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate.max(1);
        self
    }

    pub fn bass_freq(mut self, hz: Option<u32>) -> Self {
        self.bass_freq = hz;
        self
    }

    pub fn tune(mut self, tune: Tune) -> Self {
        self.tune = tune;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        let blip_config = BlipConfig::new(self.clock_rate, sample_rate).bass_freq(self.bass_freq);
        let buffer =
            BlipBuffer::with_config(&blip_config).wrap_err("failed to configure blip buffer")?;
        let ticks_per_frame = blip_config.ticks_per_frame(self.frame_rate);

        let (stream, mut rx) = SampleStream::new(STREAM_CAPACITY);
        let (mut vis_tx, vis_rx) = RingBuffer::<f32>::new(VIS_CAPACITY);

        // Synthesis thread: render whole frames while the stream has room
        let running = Arc::new(AtomicBool::new(true));
        let synth_thread = thread::spawn({
            let running = running.clone();
            let tune = self.tune;
            move || synthesize(buffer, stream, tune, ticks_per_frame, &running)
        });

        let mut mono = vec![0.0f32; MAX_BLOCK_SIZE];
        let audio = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                for frame_block in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                    let frames = frame_block.len() / channels;
                    let block = &mut mono[..frames];
                    drain_into(&mut rx, block);

                    // Copy to output (mono to all channels)
                    for (out, &s) in frame_block.chunks_mut(channels).zip(block.iter()) {
                        out.fill(s);
                    }

                    for &s in block.iter() {
                        if vis_tx.push(s).is_err() {
                            break;
                        }
                    }
                }
            },
            |err| eprintln!("Audio error: {}", err),
            None,
        )?;
        audio.play()?;

        let info = ScopeInfo {
            sample_rate,
            clock_rate: self.clock_rate,
            frame_rate: self.frame_rate,
            latency: BlipBuffer::output_latency(),
        };

        let mut terminal = ratatui::init();
        let ui_result = UiApp::new(vis_rx, info).run(&mut terminal);
        ratatui::restore();

        running.store(false, Ordering::Relaxed);
        drop(audio);

        synth_thread
            .join()
            .map_err(|_| eyre!("synthesis thread panicked"))?
            .wrap_err("synthesis failed")?;

        ui_result
    }
}

impl Default for BlipScope {
    fn default() -> Self {
        Self::new()
    }
}

fn synthesize(
    mut buffer: BlipBuffer,
    mut stream: SampleStream,
    mut tune: Tune,
    ticks_per_frame: u32,
    running: &AtomicBool,
) -> Result<(), BlipError> {
    let mut voices = Voices::new();
    let frame_samples = buffer.count_samples(ticks_per_frame) + 1;

    while running.load(Ordering::Relaxed) {
        stream.pump(&mut buffer);

        if buffer.samples_avail() == 0 && stream.slots() >= frame_samples {
            tune.render_frame(&mut voices, &mut buffer, ticks_per_frame)?;
        } else {
            thread::sleep(Duration::from_millis(1));
        }
    }

    Ok(())
}
