//! Frequency-domain views of rendered audio.
//!
//! Used by the scope binary and by tests that check the synthesized output
//! stays inside its band.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Magnitudes of bins `0..=len / 2` of the unwindowed DFT of `samples`.
pub fn magnitude_spectrum(samples: &[f32]) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(samples.len());

    let mut bins: Vec<Complex<f32>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut bins);

    bins[..samples.len() / 2 + 1].iter().map(|c| c.norm()).collect()
}

/// Centre frequency of `bin` in an FFT of `len` points.
#[inline]
pub fn bin_frequency(bin: usize, len: usize, sample_rate: f32) -> f32 {
    bin as f32 * sample_rate / len as f32
}

/// Number of frequency points reported by [`SpectrumAnalyzer`]
pub const SPECTRUM_BINS: usize = 48;

/// Hann-windowed analyzer reporting log-spaced magnitudes in dB.
pub struct SpectrumAnalyzer {
    /// Hann window coefficients
    window: Vec<f32>,
    /// Frequency values for each bin (Hz)
    freq_bins: Vec<f64>,
    /// FFT bin indices corresponding to each frequency
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Current spectrum data: (frequency_hz, magnitude_db)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `buffer_len` is the FFT size; `update` ignores blocks of any other
    /// length.
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(buffer_len);

        let window: Vec<f32> = (0..buffer_len)
            .map(|i| {
                if buffer_len > 1 {
                    let denom = (buffer_len - 1) as f32;
                    0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
                } else {
                    1.0
                }
            })
            .collect();

        // Log-spaced frequency bins (20 Hz to Nyquist)
        let max_freq = (sample_rate / 2.0).min(20_000.0).max(1.0) as f64;
        let min_freq = 20.0f64.min(max_freq);
        let ratio = max_freq / min_freq;
        let half = (buffer_len / 2).max(1);

        let mut freq_bins = Vec::with_capacity(SPECTRUM_BINS);
        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
            let freq = min_freq * ratio.powf(t);
            let index = (freq * buffer_len as f64 / sample_rate as f64).round() as usize;
            freq_bins.push(freq);
            bin_indices.push(index.min(half - 1));
        }

        let spectrum = freq_bins.iter().map(|&f| (f, -120.0)).collect();

        Self {
            window,
            freq_bins,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
        }
    }

    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() || buffer.is_empty() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft.process(&mut self.scratch);

        for ((entry, &index), &freq) in self
            .spectrum
            .iter_mut()
            .zip(&self.bin_indices)
            .zip(&self.freq_bins)
        {
            let bin = self.scratch[index];
            let power = (bin.re * bin.re + bin.im * bin.im).max(1e-12);
            *entry = (freq, 10.0 * (power as f64).log10());
        }
    }

    /// Current spectrum as (frequency_hz, magnitude_db)
    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn test_dc_lands_in_bin_zero() {
        let spectrum = magnitude_spectrum(&[1.0; 64]);
        assert_eq!(spectrum.len(), 33);
        assert!((spectrum[0] - 64.0).abs() < 1e-3);
        assert!(spectrum[1..].iter().all(|&m| m < 1e-3));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let len = 256;
        let signal: Vec<f32> = (0..len)
            .map(|i| (TAU * 16.0 * i as f32 / len as f32).sin())
            .collect();
        let spectrum = magnitude_spectrum(&signal);

        let peak = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(16));
        assert!((bin_frequency(16, len, 44_100.0) - 2_756.25).abs() < 1e-2);
    }

    #[test]
    fn test_analyzer_finds_tone() {
        let len = 1024;
        let sample_rate = 48_000.0;
        let mut analyzer = SpectrumAnalyzer::new(len, sample_rate);
        let signal: Vec<f32> = (0..len)
            .map(|i| (TAU * 1_000.0 * i as f32 / sample_rate).sin())
            .collect();

        analyzer.update(&signal);

        let loudest = analyzer
            .data()
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|&(f, _)| f)
            .unwrap();
        assert!((700.0..1_400.0).contains(&loudest), "loudest at {}", loudest);
    }

    #[test]
    fn test_analyzer_ignores_wrong_length() {
        let mut analyzer = SpectrumAnalyzer::new(256, 44_100.0);
        analyzer.update(&[1.0; 100]);
        assert!(analyzer.data().iter().all(|&(_, db)| db == -120.0));
    }
}
