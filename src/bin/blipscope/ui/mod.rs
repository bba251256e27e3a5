//! TUI module for blipscope
//!
//! Shows the synthesized output as a waveform and a spectrum.

mod spectrum;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::Duration;

use blip_dsp::analysis::SpectrumAnalyzer;

use spectrum::render_spectrum;
use waveform::render_waveform;

/// Audio visualization buffer size (also the FFT size)
const VIS_BUFFER_SIZE: usize = 1024;

/// Static facts shown in the header
#[derive(Clone, Copy, Debug)]
pub struct ScopeInfo {
    pub sample_rate: u32,
    pub clock_rate: u32,
    pub frame_rate: u32,
    pub latency: usize,
}

pub struct UiApp {
    /// Ring buffer receiver for audio samples
    audio_rx: Consumer<f32>,
    info: ScopeInfo,
    /// Most recent VIS_BUFFER_SIZE samples
    audio_buffer: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    frozen: bool,
    should_quit: bool,
}

impl UiApp {
    pub fn new(audio_rx: Consumer<f32>, info: ScopeInfo) -> Self {
        Self {
            audio_rx,
            info,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            analyzer: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, info.sample_rate as f32),
            frozen: false,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Pull new samples, keeping only the last VIS_BUFFER_SIZE
    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            if !self.frozen {
                self.audio_buffer.push(sample);
                received = true;
            }
        }

        if received {
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
            self.analyzer.update(&self.audio_buffer);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                self.frozen = !self.frozen;
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(8),    // Waveform
                Constraint::Min(8),    // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let header = Paragraph::new(format!(
            " {} Hz out | {} Hz clock | {} fps | {} samples latency{}",
            self.info.sample_rate,
            self.info.clock_rate,
            self.info.frame_rate,
            self.info.latency,
            if self.frozen { " | FROZEN" } else { "" }
        ))
        .block(Block::default().title(" blipscope ").borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        render_waveform(frame, chunks[1], &self.audio_buffer);
        render_spectrum(frame, chunks[2], self.analyzer.data());

        let help = Paragraph::new(" [Q] Quit  [Space] Freeze")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
