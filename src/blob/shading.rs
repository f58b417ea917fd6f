//! Lambert shading terms shared by the GPU pipeline and CPU checks.

use glam::Vec3;

use crate::params::ShadingParams;

/// Shading inputs resolved for upload: unit light direction, premultiplied ambient
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadingTerms {
    pub color: Vec3,
    pub ambient: Vec3,
    pub light_direction: Vec3,
}

impl ShadingTerms {
    pub fn new(params: &ShadingParams) -> Self {
        let color = Vec3::from_array(params.color);
        let light = Vec3::from_array(params.light_direction).normalize_or_zero();
        Self {
            color,
            ambient: Vec3::from_array(params.ambient) * color,
            light_direction: if light == Vec3::ZERO { Vec3::Y } else { light },
        }
    }
}

/// `ambient + color * max(0, n . l)`, matching `fs_main` in the shader
pub fn lambert(terms: &ShadingTerms, normal: Vec3) -> Vec3 {
    let n = normal.normalize_or_zero();
    let diffuse = n.dot(terms.light_direction).max(0.0);
    terms.ambient + terms.color * diffuse
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_direction_normalized() {
        let terms = ShadingTerms::new(&ShadingParams::default());
        assert!((terms.light_direction.length() - 1.0).abs() < 1e-6);

        let degenerate = ShadingTerms::new(&ShadingParams {
            light_direction: [0.0, 0.0, 0.0],
            ..Default::default()
        });
        assert_eq!(degenerate.light_direction, Vec3::Y);
    }

    #[test]
    fn test_lambert_lit_and_unlit_sides() {
        let terms = ShadingTerms::new(&ShadingParams::default());

        // Facing the light: ambient + full colour
        let lit = lambert(&terms, terms.light_direction);
        assert!((lit - (terms.ambient + terms.color)).length() < 1e-5);

        // Facing away: ambient only
        let unlit = lambert(&terms, -terms.light_direction);
        assert!((unlit - terms.ambient).length() < 1e-6);

        // Default blue blob: ambient is (0, 0, 0.1)
        assert!((terms.ambient - Vec3::new(0.0, 0.0, 0.1)).length() < 1e-6);
    }
}
