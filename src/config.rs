//! Layered configuration: defaults, then optional TOML file, then CLI flags.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::Args;
use crate::error::ConfigError;
use crate::params::{
    AnalyserConfig, DeformParams, OutputConfig, RenderConfig, ShadingParams, ShapingVariant,
    SignalParams, SphereParams,
};

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "blobwave.toml";

/// On-disk config; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub audio: AudioSection,
    #[serde(default)]
    pub blob: BlobSection,
    #[serde(default)]
    pub render: RenderSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioSection {
    pub fft_size: Option<usize>,
    pub smoothing: Option<f32>,
    pub min_decibels: Option<f32>,
    pub max_decibels: Option<f32>,
    pub gain: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlobSection {
    pub radius: Option<f32>,
    pub segments: Option<usize>,
    pub scale: Option<f32>,
    pub seed: Option<u32>,
    pub shape: Option<ShapingVariant>,
    pub calibration: Option<f32>,
    pub color: Option<[f32; 3]>,
    pub light_direction: Option<[f32; 3]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderSection {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fov_degrees: Option<f32>,
    pub camera_position: Option<[f32; 3]>,
}

/// Parse a config file
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Fully resolved parameters for one run
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub analyser: AnalyserConfig,
    pub output: OutputConfig,
    pub sphere: SphereParams,
    pub deform: DeformParams,
    pub signal: SignalParams,
    pub shading: ShadingParams,
    pub render: RenderConfig,
}

impl Settings {
    /// Resolve settings from CLI arguments, loading the config file they point at
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let path = args.config.clone().or_else(|| {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.exists().then_some(local)
        });

        let file = match path {
            Some(path) => {
                let file = load_config(&path)?;
                log::info!("Loaded config from {}", path.display());
                file
            }
            None => FileConfig::default(),
        };

        let mut settings = Self::default();
        settings.apply_file(&file);
        settings.apply_args(args);
        Ok(settings)
    }

    fn apply_file(&mut self, file: &FileConfig) {
        let audio = &file.audio;
        set(&mut self.analyser.fft_size, audio.fft_size);
        set(&mut self.analyser.smoothing_time_constant, audio.smoothing);
        set(&mut self.analyser.min_decibels, audio.min_decibels);
        set(&mut self.analyser.max_decibels, audio.max_decibels);
        set(&mut self.output.gain, audio.gain);

        let blob = &file.blob;
        set(&mut self.sphere.radius, blob.radius);
        set(&mut self.sphere.width_segments, blob.segments);
        set(&mut self.sphere.height_segments, blob.segments);
        set(&mut self.deform.scale, blob.scale);
        set(&mut self.deform.noise_seed, blob.seed);
        set(&mut self.deform.shape, blob.shape);
        set(&mut self.signal.calibration, blob.calibration);
        set(&mut self.shading.color, blob.color);
        set(&mut self.shading.light_direction, blob.light_direction);

        let render = &file.render;
        set(&mut self.render.window_width, render.width);
        set(&mut self.render.window_height, render.height);
        set(&mut self.render.fov_degrees, render.fov_degrees);
        set(&mut self.render.camera_position, render.camera_position);
    }

    fn apply_args(&mut self, args: &Args) {
        set(&mut self.deform.shape, args.shape);
        set(&mut self.signal.calibration, args.calibration);
        set(&mut self.output.gain, args.gain);
        set(&mut self.analyser.fft_size, args.fft_size);
        set(&mut self.render.window_width, args.width);
        set(&mut self.render.window_height, args.height);
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
