use std::collections::HashMap;

use wgpu::util::DeviceExt;

use super::mesh::{draw_items, GpuPrimitive};
use super::texture::GpuTexture;
use crate::scene::{Material, Model, TextureRef};
use crate::types::MaterialUniform;

/// Bind group layouts shared by the pipelines and every uploaded model
pub struct Layouts {
    pub globals: wgpu::BindGroupLayout,
    pub model: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = |binding, visibility| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let texture = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let globals = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                uniform(1, wgpu::ShaderStages::FRAGMENT),
            ],
            label: Some("globals_bind_group_layout"),
        });
        let model = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform(0, wgpu::ShaderStages::VERTEX)],
            label: Some("model_bind_group_layout"),
        });
        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform(0, wgpu::ShaderStages::FRAGMENT),
                texture(1),
                texture(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("material_bind_group_layout"),
        });

        Self {
            globals,
            model,
            material,
        }
    }
}

/// GPU copy of the scene's model
pub struct GpuModel {
    pub generation: u64,
    pub primitives: Vec<GpuPrimitive>,
    materials: Vec<wgpu::BindGroup>,
    default_material: wgpu::BindGroup,
    _textures: Vec<GpuTexture>,
}

impl GpuModel {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &Layouts,
        model: &Model,
        generation: u64,
    ) -> Self {
        let world = model.world_transforms();

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let mut textures = vec![GpuTexture::white(device, queue)];
        let mut uploaded: HashMap<(usize, bool), usize> = HashMap::new();
        let mut texture_slot = |reference: Option<TextureRef>, srgb: bool| -> Option<usize> {
            let index = reference?.texture;
            let image = model.textures.get(index)?;
            let slot = *uploaded.entry((index, srgb)).or_insert_with(|| {
                textures.push(GpuTexture::from_image(device, queue, image, srgb));
                textures.len() - 1
            });
            Some(slot)
        };

        let mut bindings = Vec::with_capacity(model.materials.len());
        for material in &model.materials {
            let base = texture_slot(material.base_color_texture, true);
            let occlusion = texture_slot(material.occlusion_texture, false);
            bindings.push((material, base, occlusion));
        }

        let bind = |material: &Material, base: Option<usize>, occlusion: Option<usize>| {
            let uniform = MaterialUniform::from_material(material, base.is_some(), occlusion.is_some());
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Material Uniform Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &layouts.material,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&textures[base.unwrap_or(0)].view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(
                            &textures[occlusion.unwrap_or(0)].view,
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
                label: Some("material_bind_group"),
            })
        };

        let materials: Vec<wgpu::BindGroup> = bindings
            .iter()
            .map(|&(material, base, occlusion)| bind(material, base, occlusion))
            .collect();
        let default_material = bind(&Material::default(), None, None);

        let primitives: Vec<GpuPrimitive> = draw_items(model)
            .into_iter()
            .filter(|item| {
                let primitive = &model.meshes[item.mesh].primitives[item.primitive];
                primitive.vertex_count() > 0
            })
            .map(|item| GpuPrimitive::new(device, &layouts.model, model, item, &world))
            .collect();

        log::info!(
            "Uploaded model: {} draw calls, {} materials, {} textures",
            primitives.len(),
            materials.len(),
            textures.len() - 1
        );

        Self {
            generation,
            primitives,
            materials,
            default_material,
            _textures: textures,
        }
    }

    /// Pushes the current pose to the GPU
    pub fn update(&self, queue: &wgpu::Queue, model: &Model) {
        let world = model.world_transforms();
        for primitive in &self.primitives {
            primitive.update(queue, model, &world);
        }
    }

    pub fn material(&self, index: Option<usize>) -> &wgpu::BindGroup {
        index
            .and_then(|i| self.materials.get(i))
            .unwrap_or(&self.default_material)
    }
}
