use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::audio::SignalTap;
use crate::config::VisualizerSettings;

/// Samples per transform.
pub const FFT_SIZE: usize = 256;
/// Magnitude bins per frame (`FFT_SIZE / 2`).
pub const BIN_COUNT: usize = FFT_SIZE / 2;

/// One frame of byte magnitudes, lowest frequency first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectrumFrame {
    pub bins: Vec<u8>,
}

/// Byte-magnitude spectrum analyser.
///
/// Each frame: Blackman window over the last `FFT_SIZE` samples, forward FFT,
/// magnitudes scaled by `1/N`, exponential smoothing against the previous
/// frame, then decibels mapped linearly from `[min_db, max_db]` onto `0..=255`.
pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    samples: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    smoothing: f32,
    min_db: f32,
    max_db: f32,
}

impl SpectrumAnalyser {
    pub fn new(settings: &VisualizerSettings) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        let n = FFT_SIZE as f32;
        let window = (0..FFT_SIZE)
            .map(|i| {
                let x = i as f32 / n;
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            })
            .collect();

        Self {
            fft,
            window,
            samples: vec![0.0; FFT_SIZE],
            buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            smoothed: vec![0.0; BIN_COUNT],
            smoothing: settings.smoothing.clamp(0.0, 0.999),
            min_db: settings.min_decibels,
            max_db: settings.max_decibels,
        }
    }

    /// Analyse the most recent samples in the tap.
    pub fn capture(&mut self, tap: &SignalTap) -> SpectrumFrame {
        let mut samples = std::mem::take(&mut self.samples);
        tap.snapshot(&mut samples);
        let frame = self.analyse(&samples);
        self.samples = samples;
        frame
    }

    /// Analyse `samples`. Only the last `FFT_SIZE` are used; shorter input is
    /// zero-padded at the front.
    pub fn analyse(&mut self, samples: &[f32]) -> SpectrumFrame {
        let used = &samples[samples.len().saturating_sub(FFT_SIZE)..];
        let pad = FFT_SIZE - used.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { used[i - pad] };
            let sample = if sample.is_finite() { sample } else { 0.0 };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let scale = 1.0 / FFT_SIZE as f32;
        let range = self.max_db - self.min_db;
        let mut bins = Vec::with_capacity(BIN_COUNT);
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.buffer[k].norm() * scale;
            *smoothed = self.smoothing * *smoothed + (1.0 - self.smoothing) * magnitude;

            let db = 20.0 * smoothed.log10();
            let byte = if db.is_finite() && range > 0.0 {
                (255.0 / range * (db - self.min_db)).clamp(0.0, 255.0) as u8
            } else {
                0
            };
            bins.push(byte);
        }

        SpectrumFrame { bins }
    }
}
