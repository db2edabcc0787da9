//! Centering a loaded model on the origin and deriving a camera distance
//! that fits it in view.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::math::AABB;
use crate::scene::Model;

/// Extent used when a model has no measurable geometry
pub const FALLBACK_EXTENT: f32 = 1.0;

/// Axes along which the model is moved so its bounds center sits at the origin
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecenterAxes {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl RecenterAxes {
    pub const ALL: RecenterAxes = RecenterAxes { x: true, y: true, z: true };

    fn mask(&self) -> Vec3 {
        Vec3::new(
            if self.x { 1.0 } else { 0.0 },
            if self.y { 1.0 } else { 0.0 },
            if self.z { 1.0 } else { 0.0 },
        )
    }
}

impl Default for RecenterAxes {
    fn default() -> Self {
        Self::ALL
    }
}

/// Bounds measurement the camera distance is derived from
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum DistanceBasis {
    /// Largest of width, height and depth
    #[default]
    MaxExtent,
    /// Length of the box diagonal
    Diagonal,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FramingOptions {
    pub recenter: RecenterAxes,
    pub basis: DistanceBasis,
    pub multiplier: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub min_distance_ratio: Option<f32>,
}

impl FramingOptions {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            recenter: config.recenter,
            basis: config.distance_basis,
            multiplier: config.distance_multiplier,
            fov: config.fov,
            min_distance_ratio: config.min_distance_ratio,
        }
    }
}

impl Default for FramingOptions {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

/// Result of framing a model
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Framing {
    /// Bounds of the untranslated model
    pub bounds: AABB,
    pub center: Vec3,
    pub size: Vec3,
    /// Translation applied to the model root
    pub offset: Vec3,
    pub camera_distance: f32,
    pub camera_position: Vec3,
    /// Orbit minimum distance scaled to the model, when configured
    pub min_distance: Option<f32>,
}

/// Distance at which an object of height `measure` fills a `fov`-degree view, times `multiplier`
pub fn camera_distance(measure: f32, fov: f32, multiplier: f32) -> f32 {
    let half_fov = fov.to_radians() / 2.0;
    (measure / 2.0 / half_fov.tan()).abs() * multiplier
}

/// Computes centering offset and camera placement for `bounds`
pub fn compute_framing(bounds: &AABB, options: &FramingOptions) -> Framing {
    let center = bounds.center();
    let size = bounds.size();

    let measure = match options.basis {
        DistanceBasis::MaxExtent => size.max_element(),
        DistanceBasis::Diagonal => size.length(),
    };
    let measure = if measure > 0.0 && measure.is_finite() {
        measure
    } else {
        log::warn!("Model has no measurable extent, framing as a {} unit object", FALLBACK_EXTENT);
        FALLBACK_EXTENT
    };

    let camera_distance = camera_distance(measure, options.fov, options.multiplier);
    let largest = if size.max_element() > 0.0 {
        size.max_element()
    } else {
        FALLBACK_EXTENT
    };

    Framing {
        bounds: *bounds,
        center,
        size,
        offset: -center * options.recenter.mask(),
        camera_distance,
        camera_position: Vec3::Z * camera_distance,
        min_distance: options.min_distance_ratio.map(|ratio| ratio * largest),
    }
}

/// Measures the model's untranslated bounds and moves its root onto the origin
pub fn frame_model(model: &mut Model, options: &FramingOptions) -> Framing {
    let bounds = model.local_bounds();
    let framing = compute_framing(&bounds, options);
    model.root.translation = framing.offset;

    log::info!(
        "Framed model: center {:?}, size {:?}, camera distance {:.3}",
        framing.center,
        framing.size,
        framing.camera_distance
    );

    framing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_distance_for_90_degree_fov() {
        // tan(45deg) = 1, so distance = measure / 2 * multiplier
        let distance = camera_distance(4.0, 90.0, 1.5);
        assert!((distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_partial_recenter_keeps_other_axes() {
        let bounds = AABB::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(3.0, 6.0, 5.0));
        let options = FramingOptions {
            recenter: RecenterAxes { x: true, y: false, z: true },
            ..Default::default()
        };

        let framing = compute_framing(&bounds, &options);

        assert_eq!(framing.offset, Vec3::new(-2.0, 0.0, -4.0));
    }

    #[test]
    fn test_diagonal_basis_is_farther_than_max_extent() {
        let bounds = AABB::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        let max_extent = compute_framing(&bounds, &FramingOptions::default());
        let diagonal = compute_framing(
            &bounds,
            &FramingOptions {
                basis: DistanceBasis::Diagonal,
                ..Default::default()
            },
        );
        assert!(diagonal.camera_distance > max_extent.camera_distance);
    }

    #[test]
    fn test_min_distance_scales_with_largest_extent() {
        let bounds = AABB::new(Vec3::ZERO, Vec3::new(2.0, 10.0, 4.0));
        let options = FramingOptions {
            min_distance_ratio: Some(0.8),
            ..Default::default()
        };

        let framing = compute_framing(&bounds, &options);

        let min_distance = framing.min_distance.unwrap();
        assert!((min_distance - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_bounds_use_fallback_extent() {
        let framing = compute_framing(&AABB::EMPTY, &FramingOptions::default());
        assert!(framing.camera_distance > 0.0);
        assert_eq!(framing.offset, Vec3::ZERO);
    }

    #[test]
    fn test_camera_on_positive_z() {
        let bounds = AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let framing = compute_framing(&bounds, &FramingOptions::default());
        assert_eq!(framing.camera_position.x, 0.0);
        assert_eq!(framing.camera_position.y, 0.0);
        assert!(framing.camera_position.z > 0.0);
    }
}
