//! Spectrum-to-intensity reduction, run once per rendered frame.

use crate::audio::AnalyserTap;
use crate::params::SignalParams;

/// Inputs to the deformer for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeformationState {
    /// Seconds since the visualization started (never resets)
    pub elapsed_s: f32,
    /// Spectrum energy scalar in [0, 1]
    pub intensity: f32,
}

/// Reduce byte magnitudes to an intensity: `clamp(mean / calibration, 0, 1)`.
///
/// Returns `None` for an empty spectrum so callers can hold their last value.
pub fn intensity_from_magnitudes(magnitudes: &[u8], calibration: f32) -> Option<f32> {
    if magnitudes.is_empty() {
        return None;
    }

    let sum: u64 = magnitudes.iter().map(|&m| m as u64).sum();
    let mean = sum as f32 / magnitudes.len() as f32;
    let ratio = mean / calibration;

    if ratio.is_nan() {
        Some(0.0)
    } else {
        Some(ratio.clamp(0.0, 1.0))
    }
}

/// Per-frame reader of the analyser tap
pub struct SignalExtractor {
    params: SignalParams,
    /// Clock reading when the visualization mounted
    mounted_at: f64,
    state: DeformationState,
    /// Reused magnitude scratch (sized once to the analyser bin count)
    magnitudes: Vec<u8>,
}

impl SignalExtractor {
    pub fn new(params: SignalParams, mounted_at: f64) -> Self {
        Self {
            params,
            mounted_at,
            state: DeformationState::default(),
            magnitudes: Vec::new(),
        }
    }

    /// Latest computed state
    pub fn state(&self) -> DeformationState {
        self.state
    }

    /// Sample the free-running clock and the analyser.
    ///
    /// Without an analyser the intensity holds its previous value.
    pub fn tick(&mut self, now: f64, analyser: Option<&AnalyserTap>) -> DeformationState {
        let elapsed = (now - self.mounted_at) as f32;
        if elapsed.is_finite() && elapsed > self.state.elapsed_s {
            self.state.elapsed_s = elapsed;
        }

        if let Some(tap) = analyser {
            self.magnitudes.resize(tap.bin_count(), 0);
            tap.read_magnitudes(&mut self.magnitudes);

            if let Some(intensity) =
                intensity_from_magnitudes(&self.magnitudes, self.params.calibration)
            {
                self.state.intensity = intensity;
            }
        }

        log::trace!(
            "signal: t={:.3}s intensity={:.3}",
            self.state.elapsed_s,
            self.state.intensity
        );
        self.state
    }
}
