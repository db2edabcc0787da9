use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::scene::deform::{deform_primitive, joint_matrices};
use crate::scene::{AlphaMode, Model, Primitive};
use crate::types::{ModelUniform, Vertex};

/// One primitive of one mesh node, in scene order
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DrawItem {
    pub node: usize,
    pub mesh: usize,
    pub primitive: usize,
}

/// Every primitive reachable from the model's roots
pub fn draw_items(model: &Model) -> Vec<DrawItem> {
    let mut items = Vec::new();
    for (node, n) in model.mesh_nodes() {
        let Some(mesh) = n.mesh.filter(|&m| m < model.meshes.len()) else {
            continue;
        };
        for primitive in 0..model.meshes[mesh].primitives.len() {
            items.push(DrawItem { node, mesh, primitive });
        }
    }
    items
}

/// Interleaves positions and normals with the primitive's UV sets
pub fn build_vertices(primitive: &Primitive, positions: &[Vec3], normals: &[Vec3]) -> Vec<Vertex> {
    let uv = |set: &Option<Vec<[f32; 2]>>, i: usize| {
        set.as_ref().and_then(|uvs| uvs.get(i).copied()).unwrap_or([0.0, 0.0])
    };

    positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let uv0 = uv(&primitive.uv0, i);
            Vertex {
                position: p.to_array(),
                normal: normals.get(i).copied().unwrap_or(Vec3::Y).to_array(),
                uv0,
                uv1: primitive.uv1.as_ref().map_or(uv0, |_| uv(&primitive.uv1, i)),
            }
        })
        .collect()
}

/// Posed vertices of a morphed or skinned primitive; `None` for static geometry
pub fn posed_vertices(model: &Model, item: &DrawItem, world: &[Mat4]) -> Option<Vec<Vertex>> {
    let node = model.nodes.get(item.node)?;
    let mesh = model.meshes.get(item.mesh)?;
    let primitive = mesh.primitives.get(item.primitive)?;
    if !primitive.is_deformable() {
        return None;
    }

    let weights = if node.weights.is_empty() {
        &mesh.weights
    } else {
        &node.weights
    };
    let joints = match node.skin {
        Some(skin) if primitive.is_skinned() => {
            Some(joint_matrices(model, skin, &world[item.node], world))
        }
        _ => None,
    };

    let deformed = deform_primitive(primitive, weights, joints.as_deref());
    Some(build_vertices(primitive, &deformed.positions, &deformed.normals))
}

/// Vertex, index and transform buffers of one draw item
pub struct GpuPrimitive {
    pub item: DrawItem,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub model_buffer: wgpu::Buffer,
    pub model_bind_group: wgpu::BindGroup,
    pub material: Option<usize>,
    pub blended: bool,
    pub deformable: bool,
}

impl GpuPrimitive {
    pub fn new(
        device: &wgpu::Device,
        model_layout: &wgpu::BindGroupLayout,
        model: &Model,
        item: DrawItem,
        world: &[Mat4],
    ) -> Self {
        let primitive = &model.meshes[item.mesh].primitives[item.primitive];
        let vertices = posed_vertices(model, &item, world)
            .unwrap_or_else(|| build_vertices(primitive, &primitive.positions, &primitive.normals));
        let indices = primitive.triangle_indices();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Uniform Buffer"),
            contents: bytemuck::cast_slice(&[ModelUniform::new(world[item.node])]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
            label: Some("model_bind_group"),
        });

        let blended = primitive
            .material
            .and_then(|m| model.materials.get(m))
            .is_some_and(|m| m.alpha_mode == AlphaMode::Blend);

        Self {
            item,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            model_buffer,
            model_bind_group,
            material: primitive.material,
            blended,
            deformable: primitive.is_deformable(),
        }
    }

    /// Uploads this frame's transform and, for deformable geometry, posed vertices
    pub fn update(&self, queue: &wgpu::Queue, model: &Model, world: &[Mat4]) {
        queue.write_buffer(
            &self.model_buffer,
            0,
            bytemuck::cast_slice(&[ModelUniform::new(world[self.item.node])]),
        );
        if self.deformable {
            if let Some(vertices) = posed_vertices(model, &self.item, world) {
                queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Mesh, MorphTarget, Node};

    fn triangle() -> Primitive {
        Primitive {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: vec![Vec3::Z; 3],
            uv0: Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
            ..Default::default()
        }
    }

    fn model_with(primitive: Primitive, weights: Vec<f32>) -> Model {
        Model {
            nodes: vec![Node {
                mesh: Some(0),
                ..Default::default()
            }],
            roots: vec![0],
            meshes: vec![Mesh {
                primitives: vec![primitive],
                weights,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_uv1_falls_back_to_uv0() {
        let primitive = triangle();
        let vertices = build_vertices(&primitive, &primitive.positions, &primitive.normals);
        assert_eq!(vertices[1].uv1, [1.0, 0.0]);
        assert_eq!(vertices[1].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_draw_items_skip_unreachable_nodes() {
        let mut model = model_with(triangle(), Vec::new());
        model.nodes.push(Node {
            mesh: Some(0),
            ..Default::default()
        });

        assert_eq!(
            draw_items(&model),
            vec![DrawItem { node: 0, mesh: 0, primitive: 0 }]
        );
    }

    #[test]
    fn test_static_geometry_not_posed() {
        let model = model_with(triangle(), Vec::new());
        let item = DrawItem { node: 0, mesh: 0, primitive: 0 };
        assert!(posed_vertices(&model, &item, &model.world_transforms()).is_none());
    }

    #[test]
    fn test_morph_weights_move_vertices() {
        let mut primitive = triangle();
        primitive.targets.push(MorphTarget {
            positions: vec![Vec3::Z; 3],
            normals: Vec::new(),
        });
        let model = model_with(primitive, vec![0.5]);
        let item = DrawItem { node: 0, mesh: 0, primitive: 0 };

        let vertices = posed_vertices(&model, &item, &model.world_transforms()).unwrap();

        assert_eq!(vertices[0].position, [0.0, 0.0, 0.5]);
    }
}
