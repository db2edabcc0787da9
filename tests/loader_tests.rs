use glam::Vec3;
use gltf_viewer::loaders::{load_model, Progress};
use gltf_viewer::scene::ShadingModel;
use gltf_viewer::LoadError;

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> String {
    format!("{}/{}", FIXTURES, name)
}

#[cfg(test)]
mod loader_tests {
    use super::*;

    #[test]
    fn test_embedded_buffer_gltf_loads() {
        let model = load_model(fixture("animated_triangle.gltf"), |_| {}).unwrap();

        assert_eq!(model.name.as_deref(), Some("animated_triangle"));
        assert_eq!(model.roots, vec![0]);
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.primitive_count(), 1);

        let primitive = &model.meshes[0].primitives[0];
        assert_eq!(primitive.positions.len(), 3);
        assert_eq!(primitive.indices, Some(vec![0, 1, 2]));
        // no normals in the file, generated from the face
        assert!((primitive.normals[0] - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_bounds_of_loaded_triangle() {
        let model = load_model(fixture("animated_triangle.gltf"), |_| {}).unwrap();
        let bounds = model.local_bounds();

        assert_eq!(bounds.min, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 6.0, 3.0));
        assert_eq!(bounds.center(), Vec3::new(2.0, 4.0, 3.0));
    }

    #[test]
    fn test_animation_clip_loaded() {
        let model = load_model(fixture("animated_triangle.gltf"), |_| {}).unwrap();

        assert!(model.has_clips());
        let clip = &model.clips[0];
        assert_eq!(clip.name, "bob");
        assert_eq!(clip.channels.len(), 1);
        assert!((clip.duration - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_unlit_material_detected() {
        let model = load_model(fixture("animated_triangle.gltf"), |_| {}).unwrap();
        let material = &model.materials[0];

        assert_eq!(material.shading, ShadingModel::Unlit);
        assert_eq!(material.roughness, None);
        assert_eq!(material.base_color_factor, [1.0, 0.5, 0.25, 1.0]);
    }

    #[test]
    fn test_glb_with_nested_nodes() {
        let model = load_model(fixture("box.glb"), |_| {}).unwrap();

        assert!(!model.has_clips());
        assert_eq!(model.nodes.len(), 2);
        let bounds = model.local_bounds();
        assert_eq!(bounds.center(), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(bounds.size(), Vec3::new(2.0, 1.0, 4.0));
    }

    #[test]
    fn test_progress_reported_up_to_complete() {
        let mut reports = Vec::new();
        load_model(fixture("box.glb"), |p| reports.push(p)).unwrap();

        assert_eq!(reports.first(), Some(&Progress::Fraction(0.0)));
        assert_eq!(reports.last(), Some(&Progress::Fraction(1.0)));
    }

    #[test]
    fn test_malformed_document_fails_with_parse_error() {
        let err = load_model(fixture("broken.gltf"), |_| {}).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }), "got {:?}", err);
    }

    #[test]
    fn test_missing_file_fails_with_io_error() {
        let err = load_model(fixture("missing.gltf"), |_| {}).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("missing.gltf"));
    }
}
