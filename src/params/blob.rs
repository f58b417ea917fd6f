//! Blob geometry, deformation, and shading parameters.

use serde::Deserialize;

/// Rest geometry: a UV sphere
#[derive(Debug, Clone)]
pub struct SphereParams {
    /// Sphere radius (world units)
    pub radius: f32,

    /// Segments around the equator
    pub width_segments: usize,

    /// Segments from pole to pole
    pub height_segments: usize,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 1.5,
            width_segments: 64,
            height_segments: 64,
        }
    }
}

/// Shaping function applied to the raw noise value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShapingVariant {
    /// `sin(n^2)`: continuous low-frequency swelling
    #[default]
    Breathing,

    /// `|sin(t + n)|^3`: sharper transient bumps
    Spiking,
}

/// Procedural displacement parameters
#[derive(Debug, Clone)]
pub struct DeformParams {
    /// Displacement along the normal per unit of shaped noise at full intensity
    pub scale: f32,

    /// Gradient noise seed
    pub noise_seed: u32,

    pub shape: ShapingVariant,
}

impl Default for DeformParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            noise_seed: 0,
            shape: ShapingVariant::Breathing,
        }
    }
}

/// Spectrum-to-intensity reduction parameters
#[derive(Debug, Clone)]
pub struct SignalParams {
    /// Mean byte magnitude that maps to full intensity
    /// Formula: intensity = clamp(mean / calibration, 0, 1)
    pub calibration: f32,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self { calibration: 128.0 }
    }
}

/// Lambert shading inputs
#[derive(Debug, Clone)]
pub struct ShadingParams {
    /// Base surface colour (linear RGB)
    pub color: [f32; 3],

    /// Ambient term, multiplied by the base colour
    pub ambient: [f32; 3],

    /// Direction towards the light (normalized on use)
    pub light_direction: [f32; 3],
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 1.0],
            ambient: [0.05, 0.05, 0.1],
            light_direction: [1.0, 1.0, 1.0],
        }
    }
}
