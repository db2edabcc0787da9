use glam::Mat4;

use crate::scene::{Light, Material};

/// Lights the shader can evaluate besides ambient
pub const MAX_LIGHTS: usize = 4;

const LIGHT_DIRECTIONAL: u32 = 1;
const LIGHT_SPOT: u32 = 2;

/// Vertex layout shared by every drawn primitive
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv0: [f32; 2],
    pub uv1: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2, 3 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Camera uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub _pad: f32,
}

/// Per-draw transform
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    /// Point the light shines from; `w` is the light kind
    pub position: [f32; 4],
    /// RGB times intensity
    pub color: [f32; 4],
    /// Spot axis; `w` is the cosine of the outer cone angle
    pub direction: [f32; 4],
    /// `x` is the cosine of the inner cone angle
    pub params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub ambient: [f32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
    pub count: u32,
    pub _pad: [u32; 3],
}

impl LightsUniform {
    /// Packs the rig; lights beyond `MAX_LIGHTS` are dropped with a warning
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut uniform = Self {
            ambient: [0.0; 4],
            lights: [GpuLight::default(); MAX_LIGHTS],
            count: 0,
            _pad: [0; 3],
        };

        for light in lights {
            let packed = match *light {
                Light::Ambient { color, intensity } => {
                    for (channel, c) in uniform.ambient.iter_mut().zip(color) {
                        *channel += c * intensity;
                    }
                    continue;
                }
                Light::Directional {
                    color,
                    intensity,
                    position,
                } => GpuLight {
                    position: position.extend(LIGHT_DIRECTIONAL as f32).to_array(),
                    color: scaled(color, intensity),
                    direction: (-position).normalize_or_zero().extend(-1.0).to_array(),
                    params: [0.0; 4],
                },
                Light::Spot {
                    color,
                    intensity,
                    position,
                    target,
                    angle,
                    penumbra,
                } => GpuLight {
                    position: position.extend(LIGHT_SPOT as f32).to_array(),
                    color: scaled(color, intensity),
                    direction: (target - position)
                        .normalize_or_zero()
                        .extend(angle.cos())
                        .to_array(),
                    params: [(angle * (1.0 - penumbra)).cos(), 0.0, 0.0, 0.0],
                },
            };

            let index = uniform.count as usize;
            if index >= MAX_LIGHTS {
                log::warn!("Lighting rig has more than {} lights, ignoring the rest", MAX_LIGHTS);
                break;
            }
            uniform.lights[index] = packed;
            uniform.count += 1;
        }

        uniform
    }
}

fn scaled(color: [f32; 3], intensity: f32) -> [f32; 4] {
    [color[0] * intensity, color[1] * intensity, color[2] * intensity, 1.0]
}

/// Material factors plus flags for which textures are bound
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub emissive: [f32; 3],
    pub occlusion_strength: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub alpha_cutoff: f32,
    pub flags: u32,
}

impl MaterialUniform {
    pub const HAS_BASE_COLOR_TEXTURE: u32 = 1;
    pub const HAS_OCCLUSION_TEXTURE: u32 = 1 << 1;
    pub const ALPHA_MASK: u32 = 1 << 2;
    pub const UNLIT: u32 = 1 << 3;

    pub fn from_material(material: &Material, has_base_color: bool, has_occlusion: bool) -> Self {
        let mut flags = 0;
        if has_base_color {
            flags |= Self::HAS_BASE_COLOR_TEXTURE;
        }
        if has_occlusion {
            flags |= Self::HAS_OCCLUSION_TEXTURE;
        }
        if material.alpha_mode == crate::scene::AlphaMode::Mask {
            flags |= Self::ALPHA_MASK;
        }
        if material.shading == crate::scene::ShadingModel::Unlit {
            flags |= Self::UNLIT;
        }

        Self {
            base_color: material.base_color_factor,
            emissive: material.emissive_factor,
            occlusion_strength: material.occlusion_strength,
            roughness: material.roughness.unwrap_or(1.0),
            metalness: material.metalness.unwrap_or(0.0),
            alpha_cutoff: material.alpha_cutoff,
            flags,
        }
    }
}

impl Default for MaterialUniform {
    fn default() -> Self {
        Self::from_material(&Material::default(), false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LightingRig;
    use crate::scene::rig_lights;

    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ModelUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<LightsUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<MaterialUniform>() % 16, 0);
    }

    #[test]
    fn test_basic_rig_packs_ambient_and_one_light() {
        let uniform = LightsUniform::from_lights(&rig_lights(LightingRig::Basic));
        assert_eq!(uniform.count, 1);
        assert!((uniform.ambient[0] - 0.8).abs() < 1e-6);
        assert_eq!(uniform.lights[0].position, [5.0, 10.0, 7.5, LIGHT_DIRECTIONAL as f32]);
    }

    #[test]
    fn test_dramatic_rig_has_spot_light() {
        let uniform = LightsUniform::from_lights(&rig_lights(LightingRig::Dramatic));
        let kinds: Vec<f32> = uniform.lights[..uniform.count as usize]
            .iter()
            .map(|l| l.position[3])
            .collect();
        assert!(kinds.contains(&(LIGHT_SPOT as f32)));
    }

    #[test]
    fn test_material_flags() {
        let material = Material {
            alpha_mode: crate::scene::AlphaMode::Mask,
            ..Default::default()
        };
        let uniform = MaterialUniform::from_material(&material, true, false);
        assert_eq!(
            uniform.flags,
            MaterialUniform::HAS_BASE_COLOR_TEXTURE | MaterialUniform::ALPHA_MASK
        );
    }
}
