use glam::{Mat4, Vec3};
use gltf_viewer::loaders::load_model;
use gltf_viewer::scene::deform::{deform_primitive, joint_matrices};
use gltf_viewer::scene::{AnimationMixer, Model, MorphTarget, Node, Primitive, Skin, Transform};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn animated_triangle() -> Model {
    load_model(format!("{}/animated_triangle.gltf", FIXTURES), |_| {}).unwrap()
}

#[cfg(test)]
mod animation_tests {
    use super::*;

    #[test]
    fn test_loaded_clip_drives_node() {
        let mut model = animated_triangle();
        let mut mixer = AnimationMixer::for_model(&model).unwrap();
        mixer.play(&mut model);

        mixer.update(0.25, &mut model);

        assert!((model.nodes[0].transform.translation.y - 0.25).abs() < 1e-5);
        assert!((mixer.duration() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_loaded_clip_loops_forever() {
        let mut model = animated_triangle();
        let mut mixer = AnimationMixer::for_model(&model).unwrap();
        mixer.play(&mut model);

        for _ in 0..10 {
            mixer.update(0.35, &mut model);
        }

        // 3.5 seconds into a 1 second clip
        assert!((mixer.action().time - 0.5).abs() < 1e-4);
        assert!(mixer.is_playing());
        assert!((model.nodes[0].transform.translation.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_stop_rewinds() {
        let mut model = animated_triangle();
        let mut mixer = AnimationMixer::for_model(&model).unwrap();
        mixer.play(&mut model);
        mixer.update(0.4, &mut model);

        mixer.stop();

        assert!(!mixer.is_playing());
        assert_eq!(mixer.action().time, 0.0);
    }

    #[test]
    fn test_morph_target_weight_offsets_positions() {
        let primitive = Primitive {
            positions: vec![Vec3::ZERO, Vec3::X],
            normals: vec![Vec3::Z, Vec3::Z],
            targets: vec![MorphTarget {
                positions: vec![Vec3::Y, Vec3::Y],
                normals: Vec::new(),
            }],
            ..Default::default()
        };

        let deformed = deform_primitive(&primitive, &[0.5], None);

        assert_eq!(deformed.positions, vec![Vec3::new(0.0, 0.5, 0.0), Vec3::new(1.0, 0.5, 0.0)]);
        assert_eq!(deformed.normals, vec![Vec3::Z, Vec3::Z]);
    }

    #[test]
    fn test_skinned_vertex_follows_joint() {
        let model = Model {
            nodes: vec![
                Node {
                    mesh: Some(0),
                    skin: Some(0),
                    ..Default::default()
                },
                Node {
                    transform: Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)),
                    ..Default::default()
                },
            ],
            roots: vec![0, 1],
            skins: vec![Skin {
                name: None,
                joints: vec![1],
                inverse_bind_matrices: vec![Mat4::IDENTITY],
            }],
            ..Default::default()
        };
        let primitive = Primitive {
            positions: vec![Vec3::X],
            normals: vec![Vec3::Z],
            joints: Some(vec![[0, 0, 0, 0]]),
            weights: Some(vec![[1.0, 0.0, 0.0, 0.0]]),
            ..Default::default()
        };

        let world = model.world_transforms();
        let joints = joint_matrices(&model, 0, &world[0], &world);
        let deformed = deform_primitive(&primitive, &[], Some(&joints));

        assert!((deformed.positions[0] - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
        assert!((deformed.normals[0] - Vec3::Z).length() < 1e-5);
    }
}
