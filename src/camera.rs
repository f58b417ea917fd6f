//! Fixed perspective camera looking at the blob.

use glam::{Mat4, Vec3};

use crate::params::RenderConfig;

/// Camera system producing view-projection matrices
pub struct CameraSystem {
    eye: Vec3,
    target: Vec3,
}

impl CameraSystem {
    /// Create camera at the configured position, aimed at the origin
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            eye: Vec3::from_array(config.camera_position),
            target: Vec3::ZERO,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Create view-projection matrix for the given viewport aspect ratio
    pub fn view_proj(&self, config: &RenderConfig, aspect_ratio: f32) -> Mat4 {
        let up = if self.eye.cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.eye, self.target, up);
        let proj = Mat4::perspective_rh(
            config.fov_degrees.to_radians(),
            aspect_ratio.max(1e-3),
            config.near_plane,
            config.far_plane,
        );
        proj * view
    }
}
