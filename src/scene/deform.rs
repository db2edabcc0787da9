use glam::{Mat4, Vec3};

use super::model::{Model, Primitive};

/// Posed vertex data of a deformable primitive, in its mesh node's space
#[derive(Clone, Debug, Default)]
pub struct Deformed {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

/// Skinning matrices of `skin` for a mesh attached to a node with world matrix `mesh_world`
pub fn joint_matrices(model: &Model, skin: usize, mesh_world: &Mat4, world: &[Mat4]) -> Vec<Mat4> {
    let Some(skin) = model.skins.get(skin) else {
        return Vec::new();
    };
    let to_mesh = mesh_world.inverse();

    skin.joints
        .iter()
        .enumerate()
        .map(|(i, &joint)| {
            let joint_world = world.get(joint).copied().unwrap_or(Mat4::IDENTITY);
            let inverse_bind = skin
                .inverse_bind_matrices
                .get(i)
                .copied()
                .unwrap_or(Mat4::IDENTITY);
            to_mesh * joint_world * inverse_bind
        })
        .collect()
}

/// Applies morph target weights, then linear blend skinning
pub fn deform_primitive(primitive: &Primitive, weights: &[f32], joints: Option<&[Mat4]>) -> Deformed {
    let mut positions = primitive.positions.clone();
    let mut normals = primitive.normals.clone();

    for (target, &weight) in primitive.targets.iter().zip(weights) {
        if weight == 0.0 {
            continue;
        }
        for (p, d) in positions.iter_mut().zip(&target.positions) {
            *p += *d * weight;
        }
        for (n, d) in normals.iter_mut().zip(&target.normals) {
            *n += *d * weight;
        }
    }

    if let (Some(matrices), Some(vertex_joints), Some(vertex_weights)) =
        (joints, &primitive.joints, &primitive.weights)
    {
        for (i, (indices, w)) in vertex_joints.iter().zip(vertex_weights).enumerate() {
            let skin = blend_matrix(matrices, indices, w);
            if let Some(p) = positions.get_mut(i) {
                *p = skin.transform_point3(*p);
            }
            if let Some(n) = normals.get_mut(i) {
                *n = skin.transform_vector3(*n);
            }
        }
    }

    for n in &mut normals {
        *n = n.normalize_or_zero();
    }

    Deformed { positions, normals }
}

fn blend_matrix(matrices: &[Mat4], indices: &[u16; 4], weights: &[f32; 4]) -> Mat4 {
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return Mat4::IDENTITY;
    }

    let mut blended = Mat4::ZERO;
    for (&joint, &weight) in indices.iter().zip(weights) {
        if weight == 0.0 {
            continue;
        }
        let matrix = matrices.get(joint as usize).copied().unwrap_or(Mat4::IDENTITY);
        blended += matrix * (weight / total);
    }
    blended
}
