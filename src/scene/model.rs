use glam::{Mat4, Quat, Vec3};

use super::animation::AnimationClip;
use crate::math::AABB;

/// Local translation / rotation / scale of a node
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
    /// Morph target weights, overriding the mesh defaults when non-empty
    pub weights: Vec<f32>,
}

/// Per-vertex offsets of one morph target
#[derive(Clone, Debug, Default)]
pub struct MorphTarget {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

#[derive(Clone, Debug, Default)]
pub struct Primitive {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uv0: Option<Vec<[f32; 2]>>,
    /// Secondary UV set, sampled by the occlusion map
    pub uv1: Option<Vec<[f32; 2]>>,
    pub joints: Option<Vec<[u16; 4]>>,
    pub weights: Option<Vec<[f32; 4]>>,
    pub indices: Option<Vec<u32>>,
    pub material: Option<usize>,
    pub targets: Vec<MorphTarget>,
}

impl Primitive {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_skinned(&self) -> bool {
        self.joints.is_some() && self.weights.is_some()
    }

    pub fn is_deformable(&self) -> bool {
        self.is_skinned() || !self.targets.is_empty()
    }

    /// Triangle list indices, generated for non-indexed geometry
    pub fn triangle_indices(&self) -> Vec<u32> {
        match &self.indices {
            Some(indices) => indices.clone(),
            None => (0..self.positions.len() as u32).collect(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
    /// Default morph target weights
    pub weights: Vec<f32>,
}

/// Shading model a material was authored with
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShadingModel {
    MetallicRoughness,
    SpecularGlossiness,
    Unlit,
}

impl ShadingModel {
    /// Whether the model carries physically based roughness/metalness parameters
    pub fn is_physically_based(&self) -> bool {
        matches!(self, ShadingModel::MetallicRoughness)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AlphaMode {
    Opaque,
    Mask,
    Blend,
}

/// Reference to a texture plus the UV set it is sampled with
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextureRef {
    pub texture: usize,
    pub tex_coord: u32,
}

#[derive(Clone, Debug)]
pub struct Material {
    pub name: Option<String>,
    pub shading: ShadingModel,
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureRef>,
    pub metallic_roughness_texture: Option<TextureRef>,
    pub normal_texture: Option<TextureRef>,
    pub occlusion_texture: Option<TextureRef>,
    pub occlusion_strength: f32,
    pub emissive_texture: Option<TextureRef>,
    pub emissive_factor: [f32; 3],
    pub roughness: Option<f32>,
    pub metalness: Option<f32>,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            shading: ShadingModel::MetallicRoughness,
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic_roughness_texture: None,
            normal_texture: None,
            occlusion_texture: None,
            occlusion_strength: 1.0,
            emissive_texture: None,
            emissive_factor: [0.0, 0.0, 0.0],
            roughness: Some(1.0),
            metalness: Some(1.0),
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}

/// Decoded RGBA8 image
#[derive(Clone, Debug)]
pub struct Texture {
    pub name: Option<String>,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct Skin {
    pub name: Option<String>,
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<Mat4>,
}

/// A loaded glTF scene: node hierarchy, geometry, materials and clips.
///
/// `root` is the transform applied above every top-level node. It starts as
/// identity and is the only thing framing changes.
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub name: Option<String>,
    pub root: Transform,
    pub nodes: Vec<Node>,
    pub roots: Vec<usize>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub skins: Vec<Skin>,
    pub clips: Vec<AnimationClip>,
}

impl Model {
    /// World matrices for every node, root transform included
    pub fn world_transforms(&self) -> Vec<Mat4> {
        self.node_transforms(self.root.matrix())
    }

    /// Node matrices relative to the model root, ignoring `root`
    pub fn local_transforms(&self) -> Vec<Mat4> {
        self.node_transforms(Mat4::IDENTITY)
    }

    fn node_transforms(&self, base: Mat4) -> Vec<Mat4> {
        let mut out = vec![base; self.nodes.len()];
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(usize, Mat4)> = self.roots.iter().map(|&r| (r, base)).collect();

        while let Some((index, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }
            let world = parent * node.transform.matrix();
            out[index] = world;
            stack.extend(node.children.iter().map(|&c| (c, world)));
        }

        out
    }

    /// Bounds of all mesh vertices in model space, before the root offset
    pub fn local_bounds(&self) -> AABB {
        self.bounds_with(&self.local_transforms())
    }

    /// Bounds of all mesh vertices with the root offset applied
    pub fn bounds(&self) -> AABB {
        self.bounds_with(&self.world_transforms())
    }

    fn bounds_with(&self, transforms: &[Mat4]) -> AABB {
        let mut aabb = AABB::EMPTY;
        for (index, node) in self.mesh_nodes() {
            let Some(mesh) = node.mesh.and_then(|m| self.meshes.get(m)) else {
                continue;
            };
            let transform = transforms[index];
            for primitive in &mesh.primitives {
                for &p in &primitive.positions {
                    aabb.expand_to_point(transform.transform_point3(p));
                }
            }
        }
        aabb
    }

    /// Indices of nodes reachable from `roots`, parents before children
    pub fn scene_nodes(&self) -> Vec<usize> {
        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();

        while let Some(index) = stack.pop() {
            if index >= self.nodes.len() || visited[index] {
                continue;
            }
            visited[index] = true;
            order.push(index);
            stack.extend(self.nodes[index].children.iter().rev());
        }

        order
    }

    /// Scene nodes that carry a mesh
    pub fn mesh_nodes(&self) -> impl Iterator<Item = (usize, &Node)> + '_ {
        self.scene_nodes()
            .into_iter()
            .map(|index| (index, &self.nodes[index]))
            .filter(|(_, node)| node.mesh.is_some())
    }

    /// First node that has several parents or cannot be reached from a parentless node
    ///
    /// A valid hierarchy is a forest; anything else contains a cycle.
    pub fn hierarchy_violation(&self) -> Option<usize> {
        let mut parents = vec![0usize; self.nodes.len()];
        for node in &self.nodes {
            for &child in &node.children {
                match parents.get_mut(child) {
                    Some(count) => *count += 1,
                    None => return Some(child),
                }
            }
        }
        if let Some(index) = parents.iter().position(|&count| count > 1) {
            return Some(index);
        }

        let mut reached = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = (0..self.nodes.len()).filter(|&i| parents[i] == 0).collect();
        while let Some(index) = stack.pop() {
            reached[index] = true;
            stack.extend(&self.nodes[index].children);
        }
        reached.iter().position(|&r| !r)
    }

    pub fn primitive_count(&self) -> usize {
        self.meshes.iter().map(|m| m.primitives.len()).sum()
    }

    pub fn has_clips(&self) -> bool {
        !self.clips.is_empty()
    }
}
