//! Orbit camera controls: rotate around a target, dolly in and out, and pan.
//!
//! Input only accumulates pending deltas. `update` applies them to the camera
//! once per frame, honoring damping and the distance and polar-angle clamps.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::config::{PolarClamp, ViewerConfig};

/// Keeps the camera off the poles where the view basis degenerates
const POLE_EPSILON: f32 = 1e-6;

/// Zoom factor per wheel line at `zoom_speed` 1.0
const ZOOM_STEP: f32 = 0.95;

/// Radius plus polar angle from +Y and azimuth around +Y, measured from +Z
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    pub fn to_offset(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// Fraction of pending motion applied per update; `None` applies it all at once
    pub damping: Option<f32>,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enabled: bool,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            damping: None,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            enabled: true,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }
}

impl OrbitControls {
    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut controls = Self {
            damping: config.damping,
            max_distance: config.max_distance.unwrap_or(f32::INFINITY),
            ..Default::default()
        };
        if let Some(clamp) = config.polar_angle_clamp {
            controls.set_polar_clamp(clamp);
        }
        controls
    }

    pub fn set_polar_clamp(&mut self, clamp: PolarClamp) {
        self.min_polar_angle = clamp.min;
        self.max_polar_angle = clamp.max;
    }

    /// Rotates by a pointer drag of `dx`, `dy` pixels in a viewport `height` pixels tall
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        if !self.enabled || height <= 0.0 {
            return;
        }
        self.delta_theta -= TAU * dx / height * self.rotate_speed;
        self.delta_phi -= TAU * dy / height * self.rotate_speed;
    }

    /// Dollies by `lines` wheel lines; positive moves closer
    pub fn zoom(&mut self, lines: f32) {
        if !self.enabled {
            return;
        }
        self.scale *= ZOOM_STEP.powf(lines * self.zoom_speed);
    }

    /// Pans so the point under the pointer follows a drag of `dx`, `dy` pixels
    pub fn pan(&mut self, dx: f32, dy: f32, height: f32, camera: &PerspectiveCamera) {
        if !self.enabled || height <= 0.0 {
            return;
        }
        let distance = (camera.position - self.target).length();
        let visible = 2.0 * distance * (camera.fov.to_radians() / 2.0).tan();
        let per_pixel = visible / height * self.pan_speed;

        let right = camera.right();
        let up = right.cross(camera.forward());
        self.pan_offset += -right * dx * per_pixel + up * dy * per_pixel;
    }

    /// Whether input is still waiting to be applied
    pub fn has_pending(&self) -> bool {
        self.delta_theta != 0.0
            || self.delta_phi != 0.0
            || self.scale != 1.0
            || self.pan_offset != Vec3::ZERO
    }

    /// Applies pending input and clamps, then aims the camera at the target.
    /// Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let before = camera.position;
        let mut spherical = Spherical::from_offset(camera.position - self.target);

        let factor = self.damping.unwrap_or(1.0);
        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;
        self.target += self.pan_offset * factor;

        let min_phi = self.min_polar_angle.max(POLE_EPSILON);
        let max_phi = self.max_polar_angle.min(PI - POLE_EPSILON).max(min_phi);
        spherical.phi = spherical.phi.clamp(min_phi, max_phi);

        spherical.radius = self.clamp_distance(spherical.radius * self.scale);

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.damping.is_some() {
            let keep = 1.0 - factor;
            self.delta_theta *= keep;
            self.delta_phi *= keep;
            self.pan_offset *= keep;
            if self.delta_theta.abs() < 1e-6 && self.delta_phi.abs() < 1e-6 {
                self.delta_theta = 0.0;
                self.delta_phi = 0.0;
            }
            if self.pan_offset.length_squared() < 1e-12 {
                self.pan_offset = Vec3::ZERO;
            }
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        before.distance_squared(camera.position) > 1e-12
    }

    fn clamp_distance(&self, radius: f32) -> f32 {
        let max = self.max_distance.max(self.min_distance);
        radius.clamp(self.min_distance, max).max(POLE_EPSILON)
    }

    /// Drops pending input
    pub fn reset(&mut self) {
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::default();
        camera.position = position;
        camera
    }

    #[test]
    fn test_spherical_roundtrip() {
        let offset = Vec3::new(1.0, 2.0, 3.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).length() < 1e-5);
    }

    #[test]
    fn test_update_without_input_keeps_position() {
        let mut controls = OrbitControls::default();
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));

        let moved = controls.update(&mut camera);

        assert!(!moved);
        assert!((camera.position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_horizontal_drag_orbits_at_constant_distance() {
        let mut controls = OrbitControls::default();
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));

        controls.rotate(150.0, 0.0, 600.0);
        assert!(controls.update(&mut camera));

        assert!((camera.position.length() - 5.0).abs() < 1e-4);
        assert!(camera.position.x.abs() > 1.0);
        assert!(!controls.has_pending());
    }

    #[test]
    fn test_zoom_respects_min_distance() {
        let mut controls = OrbitControls {
            min_distance: 4.0,
            ..Default::default()
        };
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));

        controls.zoom(100.0);
        controls.update(&mut camera);

        assert!((camera.position.length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_respects_max_distance() {
        let mut controls = OrbitControls {
            max_distance: 8.0,
            ..Default::default()
        };
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));

        controls.zoom(-100.0);
        controls.update(&mut camera);

        assert!((camera.position.length() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_polar_clamp_stops_vertical_drag() {
        let mut controls = OrbitControls::default();
        controls.set_polar_clamp(PolarClamp { min: 0.5, max: 1.5 });
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));

        controls.rotate(0.0, 10_000.0, 600.0);
        controls.update(&mut camera);

        let phi = Spherical::from_offset(camera.position).phi;
        assert!(phi >= 0.5 - 1e-4 && phi <= 1.5 + 1e-4);
    }

    #[test]
    fn test_damping_spreads_motion_over_frames() {
        let mut controls = OrbitControls {
            damping: Some(0.25),
            ..Default::default()
        };
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));

        controls.rotate(100.0, 0.0, 600.0);
        controls.update(&mut camera);
        let first = camera.position;

        assert!(controls.has_pending());
        assert!(controls.update(&mut camera));
        assert_ne!(first, camera.position);
    }

    #[test]
    fn test_pan_moves_target_and_camera_together() {
        let mut controls = OrbitControls::default();
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 5.0));

        controls.pan(-60.0, 0.0, 600.0, &camera);
        controls.update(&mut camera);

        assert!(controls.target.x > 0.0);
        assert!((camera.position - controls.target - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_disabled_controls_ignore_input() {
        let mut controls = OrbitControls {
            enabled: false,
            ..Default::default()
        };
        controls.rotate(100.0, 100.0, 600.0);
        controls.zoom(3.0);
        assert!(!controls.has_pending());
    }
}
