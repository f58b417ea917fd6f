//! Procedural surface deformer: gradient noise pushed along vertex normals.
//!
//! Displacement is always computed from the rest geometry, never from the
//! previous frame, so nothing accumulates across frames.

use glam::Vec3;
use noise::{NoiseFn, OpenSimplex};

use super::mesh::BlobMesh;
use super::signal::DeformationState;
use crate::params::{DeformParams, ShapingVariant};

/// Shape a raw noise value in [-1, 1] into a bounded displacement factor
pub fn shape_noise(variant: ShapingVariant, noise: f32, time_s: f32) -> f32 {
    match variant {
        ShapingVariant::Breathing => (noise * noise).sin(),
        ShapingVariant::Spiking => (time_s + noise).sin().abs().powi(3),
    }
}

/// Noise-driven displacement of the blob surface
pub struct Deformer {
    simplex: OpenSimplex,
    params: DeformParams,
}

impl Deformer {
    /// Create new deformer with seed and shaping from `params`
    pub fn new(params: DeformParams) -> Self {
        Self {
            simplex: OpenSimplex::new(params.noise_seed),
            params,
        }
    }

    pub fn params(&self) -> &DeformParams {
        &self.params
    }

    /// Signed distance to move a rest point along its normal
    ///
    /// # Arguments
    /// * `rest` - Undeformed vertex position
    /// * `time_s` - Elapsed visualization time (seconds)
    /// * `intensity` - Deformation intensity, clamped to [0, 1]
    pub fn displacement(&self, rest: Vec3, time_s: f32, intensity: f32) -> f32 {
        let intensity = sanitize_intensity(intensity);
        let time_s = if time_s.is_finite() { time_s } else { 0.0 };

        // Noise domain: rest position scaled by intensity, shifted by time
        let p = rest * intensity + Vec3::splat(time_s);
        let noise = self.simplex.get([p.x as f64, p.y as f64, p.z as f64]) as f32;

        shape_noise(self.params.shape, noise, time_s) * intensity * self.params.scale
    }

    /// Rewrite `mesh.vertices` from the rest shape for this frame
    pub fn apply(&self, mesh: &mut BlobMesh, state: DeformationState) {
        let (rest, vertices) = mesh.split_rest_mut();

        for (out, base) in vertices.iter_mut().zip(rest) {
            let position = Vec3::from_array(base.position);
            let normal = Vec3::from_array(base.normal);

            let d = self.displacement(position, state.elapsed_s, state.intensity);
            out.position = (position + normal * d).to_array();
            out.normal = base.normal;
        }
    }
}

/// Map any input onto [0, 1], treating NaN as silence
fn sanitize_intensity(intensity: f32) -> f32 {
    if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SphereParams;

    fn small_mesh() -> BlobMesh {
        BlobMesh::new(&SphereParams {
            radius: 1.5,
            width_segments: 24,
            height_segments: 16,
        })
    }

    #[test]
    fn test_shaping_bounds() {
        for i in -100..=100 {
            let n = i as f32 / 100.0;
            let breathing = shape_noise(ShapingVariant::Breathing, n, 3.0);
            let spiking = shape_noise(ShapingVariant::Spiking, n, 3.0);

            // sin(n^2) for |n| <= 1 stays in [0, sin 1]
            assert!((0.0..=1.0_f32.sin() + 1e-6).contains(&breathing));
            assert!((0.0..=1.0).contains(&spiking));
        }
    }

    #[test]
    fn test_zero_intensity_leaves_rest_shape() {
        let deformer = Deformer::new(DeformParams::default());
        let mut mesh = small_mesh();

        deformer.apply(
            &mut mesh,
            DeformationState {
                elapsed_s: 12.3,
                intensity: 0.0,
            },
        );

        for (v, r) in mesh.vertices.iter().zip(mesh.rest()) {
            assert_eq!(v.position, r.position);
        }
    }

    #[test]
    fn test_displacement_does_not_accumulate() {
        let deformer = Deformer::new(DeformParams::default());
        let mut mesh = small_mesh();
        let state = DeformationState {
            elapsed_s: 1.25,
            intensity: 0.8,
        };

        deformer.apply(&mut mesh, state);
        let first: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| v.position).collect();

        for _ in 0..5 {
            deformer.apply(&mut mesh, state);
        }
        let again: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| v.position).collect();

        assert_eq!(first, again);
    }

    #[test]
    fn test_displacement_bounded_by_scale() {
        let params = DeformParams {
            scale: 0.5,
            ..Default::default()
        };
        let deformer = Deformer::new(params);
        let mesh = small_mesh();

        for v in mesh.rest() {
            let d = deformer.displacement(Vec3::from_array(v.position), 7.0, 1.0);
            assert!(d.abs() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn test_out_of_range_inputs_never_degenerate() {
        let spiking = Deformer::new(DeformParams {
            shape: ShapingVariant::Spiking,
            ..Default::default()
        });
        let breathing = Deformer::new(DeformParams::default());
        let rest = Vec3::new(0.3, 1.2, -0.8);

        for deformer in [&spiking, &breathing] {
            for &intensity in &[f32::NAN, f32::INFINITY, -3.0, 40.0] {
                for &t in &[0.0, f32::NAN, f32::INFINITY, 1.0e6] {
                    let d = deformer.displacement(rest, t, intensity);
                    assert!(d.is_finite());
                    assert!(d.abs() <= 1.0 + 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_moves_along_normal() {
        let deformer = Deformer::new(DeformParams {
            shape: ShapingVariant::Spiking,
            ..Default::default()
        });
        let mut mesh = small_mesh();
        deformer.apply(
            &mut mesh,
            DeformationState {
                elapsed_s: 0.7,
                intensity: 1.0,
            },
        );

        for (v, r) in mesh.vertices.iter().zip(mesh.rest()) {
            let delta = Vec3::from_array(v.position) - Vec3::from_array(r.position);
            let normal = Vec3::from_array(r.normal);
            // Offset is parallel to the rest normal
            assert!(delta.cross(normal).length() < 1e-4);
        }
    }
}
