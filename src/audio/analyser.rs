//! Analyser tap: passive frequency-domain view of the audible signal.
//!
//! The output stage pushes every mixed block through [`AnalyserTap::push_samples`];
//! readers pull byte magnitudes on demand. Reading never alters playback.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::AudioError;
use crate::params::AnalyserConfig;

/// Rolling window of the most recent `fft_size` mono samples
struct SampleWindow {
    samples: Vec<f32>,
    write_pos: usize,
}

/// FFT resources and smoothing memory (pre-allocated)
struct SpectrumState {
    fft: Arc<dyn Fft<f32>>,
    window_fn: Vec<f32>,
    ordered: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

/// Frequency analyser shared between the audio thread (writer) and the
/// per-frame signal extractor (reader)
pub struct AnalyserTap {
    config: AnalyserConfig,
    window: Mutex<SampleWindow>,
    state: Mutex<SpectrumState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl AnalyserTap {
    pub fn new(config: AnalyserConfig) -> Result<Self, AudioError> {
        config.validate()?;

        let size = config.fft_size;
        let fft = FftPlanner::new().plan_fft_forward(size);
        let window_fn = (0..size).map(|i| blackman_window(i, size)).collect();

        Ok(Self {
            window: Mutex::new(SampleWindow {
                samples: vec![0.0; size],
                write_pos: 0,
            }),
            state: Mutex::new(SpectrumState {
                fft,
                window_fn,
                ordered: vec![0.0; size],
                scratch: vec![Complex::new(0.0, 0.0); size],
                smoothed: vec![0.0; config.bin_count()],
            }),
            config,
        })
    }

    /// Number of magnitudes per read (half the analysis window)
    pub fn bin_count(&self) -> usize {
        self.config.bin_count()
    }

    /// Feed mono samples that are about to become audible
    pub fn push_samples(&self, samples: &[f32]) {
        let mut window = lock(&self.window);
        let size = window.samples.len();

        // Only the newest `size` samples matter
        let skip = samples.len().saturating_sub(size);
        for &s in &samples[skip..] {
            let pos = window.write_pos;
            window.samples[pos] = s;
            window.write_pos = (pos + 1) % size;
        }
    }

    /// Forget all buffered audio; subsequent reads return zeros
    pub fn clear(&self) {
        // Lock order is always state, then window
        let mut state = lock(&self.state);
        let mut window = lock(&self.window);
        window.samples.fill(0.0);
        window.write_pos = 0;
        state.smoothed.fill(0.0);
    }

    /// Fill `out` with byte magnitudes (0-255) of the current spectrum.
    ///
    /// Writes `min(out.len(), bin_count())` values; the rest of `out` is zeroed.
    pub fn read_magnitudes(&self, out: &mut [u8]) {
        let mut state = lock(&self.state);
        let state = &mut *state;

        {
            let window = lock(&self.window);
            let (newest, oldest) = window.samples.split_at(window.write_pos);
            state.ordered[..oldest.len()].copy_from_slice(oldest);
            state.ordered[oldest.len()..].copy_from_slice(newest);
        }

        out.fill(0);

        // Silence reads as exactly zero
        if state.ordered.iter().all(|&s| s == 0.0) {
            state.smoothed.fill(0.0);
            return;
        }

        for (i, c) in state.scratch.iter_mut().enumerate() {
            *c = Complex::new(state.ordered[i] * state.window_fn[i], 0.0);
        }
        state.fft.process(&mut state.scratch);

        let n = self.config.fft_size as f32;
        let tau = self.config.smoothing_time_constant;
        let min_db = self.config.min_decibels;
        let range_db = self.config.max_decibels - min_db;

        for (k, smoothed) in state.smoothed.iter_mut().enumerate() {
            let magnitude = state.scratch[k].norm() / n;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;

            if let Some(slot) = out.get_mut(k) {
                let db = 20.0 * smoothed.log10();
                *slot = (255.0 * (db - min_db) / range_db).clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Blackman window (alpha = 0.16), the window browser analysers apply
pub fn blackman_window(index: usize, size: usize) -> f32 {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    let x = 2.0 * PI * index as f32 / size as f32;
    a0 - a1 * x.cos() + a2 * (2.0 * x).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(bin: usize, size: usize, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / size as f32).sin())
            .collect()
    }

    #[test]
    fn test_blackman_window() {
        let size = 1024;

        // Zero at the start, 1 at center, symmetric around it
        assert!(blackman_window(0, size).abs() < 1e-6);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 1e-6);
        assert!((blackman_window(100, size) - blackman_window(size - 100, size)).abs() < 1e-5);
        assert!(blackman_window(1, size) < 0.01);
    }

    #[test]
    fn test_silence_reads_zero() {
        let tap = AnalyserTap::new(AnalyserConfig::default()).unwrap();
        let mut out = vec![7u8; tap.bin_count()];

        tap.read_magnitudes(&mut out);

        assert_eq!(out.len(), 1024);
        assert!(out.iter().all(|&m| m == 0));
    }

    #[test]
    fn test_tone_peaks_at_its_bin() {
        let config = AnalyserConfig::default();
        let size = config.fft_size;
        let tap = AnalyserTap::new(config).unwrap();

        tap.push_samples(&tone(64, size, size));
        let mut out = vec![0u8; tap.bin_count()];
        tap.read_magnitudes(&mut out);

        let peak = out
            .iter()
            .enumerate()
            .max_by_key(|(_, &m)| m)
            .map(|(i, _)| i)
            .unwrap();
        assert!((63..=65).contains(&peak));
        assert_eq!(out[64], 255);
        // Far-away bins stay near the floor
        assert!(out[500] < out[64]);
    }

    #[test]
    fn test_clear_resets_to_zero() {
        let config = AnalyserConfig::default();
        let size = config.fft_size;
        let tap = AnalyserTap::new(config).unwrap();

        tap.push_samples(&tone(10, size, size * 3));
        tap.clear();

        let mut out = vec![0u8; tap.bin_count()];
        tap.read_magnitudes(&mut out);
        assert!(out.iter().all(|&m| m == 0));
    }

    #[test]
    fn test_short_output_is_filled_partially() {
        let config = AnalyserConfig::default();
        let size = config.fft_size;
        let tap = AnalyserTap::new(config).unwrap();
        tap.push_samples(&tone(4, size, size));

        let mut out = vec![0u8; 8];
        tap.read_magnitudes(&mut out);
        assert_eq!(out[4], 255);
    }

    #[test]
    fn test_clear_and_read_from_two_threads() {
        let config = AnalyserConfig::default();
        let size = config.fft_size;
        let tap = Arc::new(AnalyserTap::new(config).unwrap());
        let block = tone(16, size, 256);

        let writer = {
            let tap = Arc::clone(&tap);
            std::thread::spawn(move || {
                for _ in 0..20_000 {
                    tap.push_samples(&block);
                    tap.clear();
                }
            })
        };
        let reader = {
            let tap = Arc::clone(&tap);
            std::thread::spawn(move || {
                let mut out = vec![0u8; tap.bin_count()];
                for _ in 0..2_000 {
                    tap.read_magnitudes(&mut out);
                }
            })
        };

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let finished = writer.join().is_ok() && reader.join().is_ok();
            let _ = done_tx.send(finished);
        });

        let finished = done_rx
            .recv_timeout(std::time::Duration::from_secs(30))
            .unwrap_or(false);
        assert!(finished, "writer and reader did not both finish");
    }
}
