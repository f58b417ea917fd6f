//! Audio-reactive blob: rest geometry, spectrum-to-intensity reduction,
//! and per-frame procedural displacement.

mod deform;
mod mesh;
mod shading;
mod signal;
mod system;

// Re-export public types
pub use deform::{shape_noise, Deformer};
pub use mesh::{BlobMesh, Vertex};
pub use shading::{lambert, ShadingTerms};
pub use signal::{intensity_from_magnitudes, DeformationState, SignalExtractor};
pub use system::BlobSystem;
