//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::params::ShapingVariant;

/// Command line arguments
///
/// Flags left unset fall back to the config file, then to built-in defaults.
#[derive(Parser, Debug, Default)]
#[command(name = "blobwave")]
#[command(about = "Audio player with an audio-reactive 3D blob", long_about = None)]
pub struct Args {
    /// Audio file to load at startup (files can also be dropped on the window)
    pub input: Option<PathBuf>,

    /// TOML config file (default: ./blobwave.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Surface shaping: breathing (smooth swelling) or spiking (sharp bumps)
    #[arg(long, value_enum)]
    pub shape: Option<ShapingVariant>,

    /// Mean spectrum byte value that maps to full deformation
    #[arg(long, value_name = "VALUE")]
    pub calibration: Option<f32>,

    /// Output gain (linear)
    #[arg(long, value_name = "GAIN")]
    pub gain: Option<f32>,

    /// Analyser window size in samples (power of 2)
    #[arg(long, value_name = "SAMPLES")]
    pub fft_size: Option<usize>,

    /// Window width (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Window height (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,

    /// Start playing as soon as the input file is decoded
    #[arg(long)]
    pub autoplay: bool,
}
