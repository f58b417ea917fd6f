//! Parameter definitions with physical units and documented semantics.
//!
//! All tunables live here with:
//! - Units (seconds, decibels, world units, etc.)
//! - Documented ranges and meanings
//! - Defaults matching the reference look of the visualizer

mod audio;
mod blob;
mod render;

// Re-export all types
pub use audio::{AnalyserConfig, OutputConfig};
pub use blob::{DeformParams, ShadingParams, ShapingVariant, SignalParams, SphereParams};
pub use render::RenderConfig;
