use glam::Vec3;

use crate::config::LightingRig;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    /// Shines from `position` towards the origin
    Directional {
        color: [f32; 3],
        intensity: f32,
        position: Vec3,
    },
    Spot {
        color: [f32; 3],
        intensity: f32,
        position: Vec3,
        target: Vec3,
        /// Half-angle of the cone in radians
        angle: f32,
        /// Fraction of the cone that fades out, 0..=1
        penumbra: f32,
    },
}

pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Lights for a rig
pub fn rig_lights(rig: LightingRig) -> Vec<Light> {
    match rig {
        LightingRig::Basic => vec![
            Light::Ambient {
                color: WHITE,
                intensity: 0.8,
            },
            Light::Directional {
                color: WHITE,
                intensity: 1.0,
                position: Vec3::new(5.0, 10.0, 7.5),
            },
        ],
        LightingRig::Studio => vec![
            Light::Ambient {
                color: WHITE,
                intensity: 0.5,
            },
            Light::Directional {
                color: WHITE,
                intensity: 1.2,
                position: Vec3::new(5.0, 10.0, 7.5),
            },
            Light::Directional {
                color: [0.8, 0.85, 1.0],
                intensity: 0.5,
                position: Vec3::new(-5.0, 3.0, 5.0),
            },
        ],
        LightingRig::Dramatic => vec![
            Light::Ambient {
                color: WHITE,
                intensity: 0.2,
            },
            Light::Spot {
                color: WHITE,
                intensity: 2.0,
                position: Vec3::new(0.0, 10.0, 5.0),
                target: Vec3::ZERO,
                angle: std::f32::consts::FRAC_PI_6,
                penumbra: 0.3,
            },
            Light::Directional {
                color: [1.0, 0.9, 0.8],
                intensity: 0.6,
                position: Vec3::new(-4.0, 2.0, -6.0),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_rig_matches_classic_setup() {
        let lights = rig_lights(LightingRig::Basic);
        assert_eq!(lights.len(), 2);
        assert!(matches!(lights[0], Light::Ambient { intensity, .. } if intensity == 0.8));
    }

    #[test]
    fn test_dramatic_rig_has_spot() {
        let lights = rig_lights(LightingRig::Dramatic);
        assert!(lights.iter().any(|l| matches!(l, Light::Spot { .. })));
    }

    #[test]
    fn test_every_rig_has_ambient() {
        for rig in [LightingRig::Basic, LightingRig::Studio, LightingRig::Dramatic] {
            assert!(rig_lights(rig)
                .iter()
                .any(|l| matches!(l, Light::Ambient { .. })));
        }
    }
}
