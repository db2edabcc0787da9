use std::thread;
use std::time::Duration;

use futures::channel::mpsc;
use glam::Vec3;
use gltf_viewer::loaders::{LoadEvent, LoadState, LoadTask};
use gltf_viewer::viewer::{LoadOutcome, Viewport};
use gltf_viewer::{LoadError, Viewer, ViewerConfig};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn config_for(name: &str) -> ViewerConfig {
    ViewerConfig {
        model_path: format!("{}/{}", FIXTURES, name).into(),
        ..Default::default()
    }
}

/// Polls until the load reports its outcome, collecting every outcome seen
fn load(viewer: &mut Viewer) -> Vec<LoadOutcome> {
    viewer.begin_load();
    let mut outcomes = Vec::new();
    for _ in 0..500 {
        outcomes.extend(viewer.poll_load());
        if !outcomes.is_empty() {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    outcomes
}

#[cfg(test)]
mod viewer_tests {
    use super::*;

    #[test]
    fn test_loaded_model_is_recentered() {
        let mut viewer = Viewer::new(config_for("box.glb"), 800, 600);

        assert_eq!(load(&mut viewer), vec![LoadOutcome::Loaded]);

        let model = viewer.scene().model().unwrap();
        assert!(model.bounds().center().length() < 1e-5);
        assert!(matches!(viewer.state(), LoadState::Succeeded));
    }

    #[test]
    fn test_camera_framed_on_positive_z() {
        let mut viewer = Viewer::new(config_for("box.glb"), 800, 600);
        load(&mut viewer);

        let camera = viewer.camera();
        // largest extent 4: 4 / 2 / tan(37.5deg) * 1.5
        let expected = 2.0 / 37.5f32.to_radians().tan() * 1.5;
        assert!((camera.position - Vec3::new(0.0, 0.0, expected)).length() < 1e-3);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_min_distance_ratio_scales_orbit_limit() {
        let config = ViewerConfig {
            min_distance_ratio: Some(0.8),
            ..config_for("box.glb")
        };
        let mut viewer = Viewer::new(config, 800, 600);
        load(&mut viewer);

        assert!((viewer.controls().min_distance - 3.2).abs() < 1e-5);
    }

    #[test]
    fn test_first_clip_plays_immediately() {
        let mut viewer = Viewer::new(config_for("animated_triangle.gltf"), 800, 600);
        load(&mut viewer);

        let mixer = viewer.mixer().expect("model has a clip");
        assert!(mixer.is_playing());
        assert_eq!(mixer.action().clip, 0);

        viewer.step(0.5);
        let node = &viewer.scene().model().unwrap().nodes[0];
        assert!((node.transform.translation - Vec3::new(0.0, 0.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_model_without_clips_has_no_mixer() {
        let mut viewer = Viewer::new(config_for("box.glb"), 800, 600);
        load(&mut viewer);

        assert!(viewer.mixer().is_none());
        let before = viewer.scene().model().unwrap().world_transforms();
        viewer.step(0.25);
        assert_eq!(viewer.scene().model().unwrap().world_transforms(), before);
    }

    #[test]
    fn test_failed_load_reports_once_and_inserts_nothing() {
        let mut viewer = Viewer::new(config_for("does_not_exist.gltf"), 800, 600);

        assert_eq!(load(&mut viewer), vec![LoadOutcome::Failed]);
        assert!(!viewer.scene().has_model());
        assert!(matches!(viewer.load_error(), Some(LoadError::Io { .. })));

        for _ in 0..3 {
            assert_eq!(viewer.poll_load(), None);
        }
    }

    #[test]
    fn test_malformed_asset_fails() {
        let mut viewer = Viewer::new(config_for("broken.gltf"), 800, 600);

        assert_eq!(load(&mut viewer), vec![LoadOutcome::Failed]);
        assert!(matches!(viewer.load_error(), Some(LoadError::Parse { .. })));
    }

    #[test]
    fn test_cyclic_node_hierarchy_fails_without_hanging() {
        let mut viewer = Viewer::new(config_for("cyclic.gltf"), 800, 600);

        assert_eq!(load(&mut viewer), vec![LoadOutcome::Failed]);
        assert!(matches!(viewer.load_error(), Some(LoadError::Hierarchy { .. })));
        assert!(!viewer.scene().has_model());

        viewer.step(0.1);
        assert_eq!(viewer.poll_load(), None);
    }

    #[test]
    fn test_disconnected_loader_fails() {
        let mut viewer = Viewer::new(ViewerConfig::default(), 800, 600);
        let (sender, receiver) = mpsc::unbounded::<LoadEvent>();
        viewer.attach_load(LoadTask::from_receiver(receiver));
        drop(sender);

        assert_eq!(viewer.poll_load(), Some(LoadOutcome::Failed));
        assert!(matches!(viewer.load_error(), Some(LoadError::Disconnected)));
        assert_eq!(viewer.poll_load(), None);
    }

    #[test]
    fn test_resize_updates_aspect_without_moving_camera() {
        let mut viewer = Viewer::new(ViewerConfig::default(), 800, 600);
        let position = viewer.camera().position;

        viewer.resize(1024, 768);

        assert!((viewer.camera().aspect - 1024.0 / 768.0).abs() < 1e-6);
        assert_eq!(viewer.viewport(), Viewport { width: 1024, height: 768 });
        assert_eq!(viewer.camera().position, position);
    }

    #[test]
    fn test_material_normalization_replaces_unlit() {
        let config = ViewerConfig {
            normalize_materials: true,
            ..config_for("animated_triangle.gltf")
        };
        let mut viewer = Viewer::new(config, 800, 600);
        load(&mut viewer);

        let material = &viewer.scene().model().unwrap().materials[0];
        assert_eq!(material.roughness, Some(1.0));
        assert_eq!(material.metalness, Some(0.0));
    }
}
