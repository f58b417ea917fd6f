//! UV sphere rest geometry with a reusable deformed copy.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::PI;

use crate::params::SphereParams;

/// Vertex data for the blob mesh (position + normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Sphere mesh holding the immutable rest shape and the per-frame deformed shape
pub struct BlobMesh {
    /// Deformed vertices, rewritten from `rest` every frame
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    rest: Vec<Vertex>,
}

impl BlobMesh {
    /// Tessellate a sphere with the specified parameters
    pub fn new(params: &SphereParams) -> Self {
        let width = params.width_segments.max(3);
        let height = params.height_segments.max(2);
        let radius = params.radius;

        let mut rest = Vec::with_capacity((width + 1) * (height + 1));
        let mut indices = Vec::new();

        // Rings from the north pole (v = 0) to the south pole (v = 1)
        for iy in 0..=height {
            let v = iy as f32 / height as f32;
            for ix in 0..=width {
                let u = ix as f32 / width as f32;

                let normal = Vec3::new(
                    -(u * 2.0 * PI).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * 2.0 * PI).sin() * (v * PI).sin(),
                );

                rest.push(Vertex {
                    position: (normal * radius).to_array(),
                    normal: normal.normalize_or_zero().to_array(),
                });
            }
        }

        // Generate triangle indices (counter-clockwise winding seen from outside)
        let row = width + 1;
        for iy in 0..height {
            for ix in 0..width {
                let a = (iy * row + ix + 1) as u32;
                let b = (iy * row + ix) as u32;
                let c = ((iy + 1) * row + ix) as u32;
                let d = ((iy + 1) * row + ix + 1) as u32;

                // Degenerate triangles at the poles are skipped
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self {
            vertices: rest.clone(),
            indices,
            rest,
        }
    }

    /// Undeformed reference vertices
    pub fn rest(&self) -> &[Vertex] {
        &self.rest
    }

    /// Rest shape alongside the writable deformed copy
    pub(crate) fn split_rest_mut(&mut self) -> (&[Vertex], &mut [Vertex]) {
        (&self.rest, &mut self.vertices)
    }
}
