//! High-level blob system: signal extraction feeding the deformer each frame.

use super::deform::Deformer;
use super::mesh::BlobMesh;
use super::shading::ShadingTerms;
use super::signal::{DeformationState, SignalExtractor};
use crate::audio::AnalyserTap;
use crate::params::{DeformParams, ShadingParams, SignalParams, SphereParams};

/// Mesh, extractor, and deformer driven by one render-loop tick
pub struct BlobSystem {
    pub mesh: BlobMesh,
    pub shading: ShadingTerms,
    extractor: SignalExtractor,
    deformer: Deformer,
}

impl BlobSystem {
    /// Create new blob system; `mounted_at` starts the free-running animation clock
    pub fn new(
        sphere: &SphereParams,
        deform: DeformParams,
        signal: SignalParams,
        shading: &ShadingParams,
        mounted_at: f64,
    ) -> Self {
        Self {
            mesh: BlobMesh::new(sphere),
            shading: ShadingTerms::new(shading),
            extractor: SignalExtractor::new(signal, mounted_at),
            deformer: Deformer::new(deform),
        }
    }

    /// Render-loop tick: read the analyser, then rebuild the deformed surface
    ///
    /// # Arguments
    /// * `now` - Current clock reading (seconds)
    /// * `analyser` - Analyser tap, or `None` when no audio graph exists
    ///
    /// # Returns
    /// * The (elapsed time, intensity) pair used for this frame
    pub fn update(&mut self, now: f64, analyser: Option<&AnalyserTap>) -> DeformationState {
        let state = self.extractor.tick(now, analyser);
        self.deformer.apply(&mut self.mesh, state);
        state
    }

    pub fn state(&self) -> DeformationState {
        self.extractor.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AnalyserConfig;
    use glam::Vec3;

    fn system() -> BlobSystem {
        BlobSystem::new(
            &SphereParams {
                radius: 1.5,
                width_segments: 32,
                height_segments: 16,
            },
            DeformParams::default(),
            SignalParams::default(),
            &ShadingParams::default(),
            0.0,
        )
    }

    #[test]
    fn test_audio_reactive_deformation() {
        let mut blob = system();
        let tap = AnalyserTap::new(AnalyserConfig::default()).unwrap();

        // Silence: surface stays at rest
        let quiet = blob.update(0.5, Some(&tap));
        assert_eq!(quiet.intensity, 0.0);
        assert!(blob
            .mesh
            .vertices
            .iter()
            .zip(blob.mesh.rest())
            .all(|(v, r)| v.position == r.position));

        // Loud broadband input: surface moves off the rest sphere
        let loud: Vec<f32> = (0..4096u32)
            .map(|i| if (i / 3) % 2 == 0 { 0.9 } else { -0.9 })
            .collect();
        tap.push_samples(&loud);
        let state = blob.update(1.0, Some(&tap));
        assert!(state.intensity > 0.0);

        let moved = blob
            .mesh
            .vertices
            .iter()
            .zip(blob.mesh.rest())
            .filter(|(v, r)| {
                (Vec3::from_array(v.position) - Vec3::from_array(r.position)).length() > 1e-6
            })
            .count();
        assert!(moved > 0);
    }

    #[test]
    fn test_no_analyser_keeps_zero_intensity() {
        let mut blob = system();
        let state = blob.update(3.0, None);
        assert_eq!(state.intensity, 0.0);
        assert_eq!(state.elapsed_s, 3.0);
        assert_eq!(blob.state(), state);
    }
}
