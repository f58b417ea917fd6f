//! Audio analysis and output configuration.

use crate::error::AudioError;

/// Analyser tap configuration (mirrors a browser-style frequency analyser)
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// Analysis window size in samples (must be power of 2)
    /// Bin count is half of this.
    pub fft_size: usize,

    /// Temporal smoothing between successive reads, in [0, 1)
    /// 0 = no smoothing, values near 1 = heavy smoothing
    pub smoothing_time_constant: f32,

    /// Magnitude (dB) mapped to byte value 0
    pub min_decibels: f32,

    /// Magnitude (dB) mapped to byte value 255
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of magnitude values produced per read
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (window must be power of 2, dB range non-empty, etc.)
    pub fn validate(&self) -> Result<(), AudioError> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(AudioError::Analyser(format!(
                "fft size must be a power of 2 >= 32, got {}",
                self.fft_size
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing_time_constant) {
            return Err(AudioError::Analyser(format!(
                "smoothing must be in [0, 1), got {}",
                self.smoothing_time_constant
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(AudioError::Analyser(format!(
                "min dB ({}) must be below max dB ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        Ok(())
    }
}

/// Output stage configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Linear gain applied after the analyser tap
    pub gain: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { gain: 1.0 }
    }
}
