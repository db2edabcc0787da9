use glam::{Mat4, Quat, Vec3};
use std::path::Path;

use crate::error::LoadError;
use crate::scene::{
    AlphaMode, AnimationClip, Channel, Interpolation, Keyframes, Material, Mesh, Model, MorphTarget,
    Node, Primitive, ShadingModel, Skin, Texture, TextureRef, Transform,
};

use super::progress::{read_with_progress, Progress};

/// Reads a glTF or GLB file, reporting read progress, and converts it to a [`Model`]
pub fn load_model(path: impl AsRef<Path>, on_progress: impl FnMut(Progress)) -> Result<Model, LoadError> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {:?}", path);

    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(io_err)?;
    let total = file.metadata().ok().map(|m| m.len());
    let bytes = read_with_progress(file, total, on_progress).map_err(io_err)?;

    model_from_slice(&bytes, path)
}

/// Parses glTF/GLB bytes; external buffers and images resolve relative to `path`
pub fn model_from_slice(bytes: &[u8], path: &Path) -> Result<Model, LoadError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent();
    let resources_err = |source| LoadError::Resources {
        path: path.to_path_buf(),
        source,
    };
    let buffers = gltf::import_buffers(&document, base, blob).map_err(resources_err)?;
    let images = gltf::import_images(&document, base, &buffers).map_err(resources_err)?;

    log::info!("glTF loaded successfully:");
    log::info!("  Scenes: {}", document.scenes().count());
    log::info!("  Nodes: {}", document.nodes().count());
    log::info!("  Meshes: {}", document.meshes().count());
    log::info!("  Materials: {}", document.materials().count());
    log::info!("  Images: {}", images.len());
    log::info!("  Animations: {}", document.animations().count());

    let mut model = Model {
        name: path.file_stem().map(|s| s.to_string_lossy().into_owned()),
        nodes: document.nodes().map(|node| load_node(&node)).collect(),
        roots: scene_roots(&document),
        materials: document.materials().map(|m| load_material(&m)).collect(),
        textures: images.iter().enumerate().map(|(i, image)| load_texture(i, image)).collect(),
        ..Default::default()
    };

    if let Some(node) = model.hierarchy_violation() {
        return Err(LoadError::Hierarchy {
            path: path.to_path_buf(),
            node,
        });
    }

    for mesh in document.meshes() {
        model.meshes.push(load_mesh(&mesh, &buffers)?);
    }
    model.skins = document.skins().map(|skin| load_skin(&skin, &buffers)).collect();
    model.clips = document
        .animations()
        .map(|animation| load_clip(&animation, &buffers))
        .collect();

    log::info!(
        "Converted {} meshes ({} primitives), {} clips",
        model.meshes.len(),
        model.primitive_count(),
        model.clips.len()
    );

    Ok(model)
}

/// Top-level nodes of the default scene, or of the first scene, or parentless nodes
fn scene_roots(document: &gltf::Document) -> Vec<usize> {
    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        return scene.nodes().map(|n| n.index()).collect();
    }

    let mut has_parent = vec![false; document.nodes().count()];
    for node in document.nodes() {
        for child in node.children() {
            has_parent[child.index()] = true;
        }
    }
    (0..has_parent.len()).filter(|&i| !has_parent[i]).collect()
}

fn load_node(node: &gltf::Node) -> Node {
    let (translation, rotation, scale) = node.transform().decomposed();
    Node {
        name: node.name().map(str::to_string),
        transform: Transform {
            translation: Vec3::from_array(translation),
            rotation: Quat::from_array(rotation).normalize(),
            scale: Vec3::from_array(scale),
        },
        children: node.children().map(|c| c.index()).collect(),
        mesh: node.mesh().map(|m| m.index()),
        skin: node.skin().map(|s| s.index()),
        weights: node.weights().map(<[f32]>::to_vec).unwrap_or_default(),
    }
}

fn texture_ref(texture: gltf::Texture, tex_coord: u32) -> TextureRef {
    TextureRef {
        texture: texture.source().index(),
        tex_coord,
    }
}

fn load_material(material: &gltf::Material) -> Material {
    let mut out = Material {
        name: material.name().map(str::to_string),
        normal_texture: material
            .normal_texture()
            .map(|t| texture_ref(t.texture(), t.tex_coord())),
        occlusion_texture: material
            .occlusion_texture()
            .map(|t| texture_ref(t.texture(), t.tex_coord())),
        occlusion_strength: material.occlusion_texture().map_or(1.0, |t| t.strength()),
        emissive_texture: material
            .emissive_texture()
            .map(|t| texture_ref(t.texture(), t.tex_coord())),
        emissive_factor: material.emissive_factor(),
        alpha_mode: match material.alpha_mode() {
            gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
            gltf::material::AlphaMode::Mask => AlphaMode::Mask,
            gltf::material::AlphaMode::Blend => AlphaMode::Blend,
        },
        alpha_cutoff: material.alpha_cutoff().unwrap_or(0.5),
        double_sided: material.double_sided(),
        ..Default::default()
    };

    if material.unlit() {
        let pbr = material.pbr_metallic_roughness();
        out.shading = ShadingModel::Unlit;
        out.base_color_factor = pbr.base_color_factor();
        out.base_color_texture = pbr
            .base_color_texture()
            .map(|t| texture_ref(t.texture(), t.tex_coord()));
        out.roughness = None;
        out.metalness = None;
    } else if let Some(sg) = material.pbr_specular_glossiness() {
        out.shading = ShadingModel::SpecularGlossiness;
        out.base_color_factor = sg.diffuse_factor();
        out.base_color_texture = sg
            .diffuse_texture()
            .map(|t| texture_ref(t.texture(), t.tex_coord()));
        out.roughness = None;
        out.metalness = None;
    } else {
        let pbr = material.pbr_metallic_roughness();
        out.shading = ShadingModel::MetallicRoughness;
        out.base_color_factor = pbr.base_color_factor();
        out.base_color_texture = pbr
            .base_color_texture()
            .map(|t| texture_ref(t.texture(), t.tex_coord()));
        out.metallic_roughness_texture = pbr
            .metallic_roughness_texture()
            .map(|t| texture_ref(t.texture(), t.tex_coord()));
        out.roughness = Some(pbr.roughness_factor());
        out.metalness = Some(pbr.metallic_factor());
    }

    out
}

/// Converts any glTF image format to RGBA8
fn load_texture(index: usize, image: &gltf::image::Data) -> Texture {
    use gltf::image::Format;

    let (channels, bytes_per_channel) = match image.format {
        Format::R8 => (1, 1),
        Format::R8G8 => (2, 1),
        Format::R8G8B8 => (3, 1),
        Format::R8G8B8A8 => (4, 1),
        Format::R16 => (1, 2),
        Format::R16G16 => (2, 2),
        Format::R16G16B16 => (3, 2),
        Format::R16G16B16A16 => (4, 2),
        Format::R32G32B32FLOAT => (3, 4),
        Format::R32G32B32A32FLOAT => (4, 4),
    };
    log::debug!(
        "  Texture {}: {}x{} ({:?})",
        index,
        image.width,
        image.height,
        image.format
    );

    let texel = channels * bytes_per_channel;
    let pixel_count = (image.width * image.height) as usize;
    if image.pixels.len() < pixel_count * texel {
        log::warn!("Texture {} has a truncated pixel buffer, using white", index);
        return Texture {
            name: None,
            width: image.width,
            height: image.height,
            rgba: vec![255; pixel_count * 4],
        };
    }

    let channel = |px: &[u8], c: usize| -> u8 {
        let bytes = &px[c * bytes_per_channel..(c + 1) * bytes_per_channel];
        match bytes_per_channel {
            1 => bytes[0],
            2 => (u16::from_ne_bytes([bytes[0], bytes[1]]) >> 8) as u8,
            _ => {
                let v = f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                (v.clamp(0.0, 1.0) * 255.0).round() as u8
            }
        }
    };

    let mut rgba = Vec::with_capacity(pixel_count * 4);
    for px in image.pixels.chunks_exact(texel).take(pixel_count) {
        let r = channel(px, 0);
        match channels {
            1 => rgba.extend_from_slice(&[r, r, r, 255]),
            2 => rgba.extend_from_slice(&[r, channel(px, 1), 0, 255]),
            3 => rgba.extend_from_slice(&[r, channel(px, 1), channel(px, 2), 255]),
            _ => rgba.extend_from_slice(&[r, channel(px, 1), channel(px, 2), channel(px, 3)]),
        }
    }

    Texture {
        name: None,
        width: image.width,
        height: image.height,
        rgba,
    }
}

fn load_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<Mesh, LoadError> {
    let name = mesh.name().map(str::to_string);
    log::debug!("  Processing mesh: {:?}", name);

    let geometry_err = |reason: String| LoadError::Geometry {
        mesh: name.clone().unwrap_or_else(|| format!("#{}", mesh.index())),
        reason,
    };

    let mut primitives = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping {:?} primitive in mesh {:?}, only triangles are drawn",
                primitive.mode(),
                name
            );
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .ok_or_else(|| geometry_err("primitive has no positions".to_string()))?
            .map(Vec3::from_array)
            .collect();

        let indices: Option<Vec<u32>> = reader.read_indices().map(|i| i.into_u32().collect());
        if let Some(bad) = indices
            .as_ref()
            .and_then(|i| i.iter().find(|&&i| i as usize >= positions.len()))
        {
            return Err(geometry_err(format!(
                "index {} out of range for {} vertices",
                bad,
                positions.len()
            )));
        }

        let normals = match reader.read_normals() {
            Some(normals) => normals.map(Vec3::from_array).collect(),
            None => compute_normals(&positions, indices.as_deref()),
        };

        let targets = reader
            .read_morph_targets()
            .map(|(p, n, _)| MorphTarget {
                positions: p.map(|p| p.map(Vec3::from_array).collect()).unwrap_or_default(),
                normals: n.map(|n| n.map(Vec3::from_array).collect()).unwrap_or_default(),
            })
            .collect();

        primitives.push(Primitive {
            positions,
            normals,
            uv0: reader.read_tex_coords(0).map(|t| t.into_f32().collect()),
            uv1: reader.read_tex_coords(1).map(|t| t.into_f32().collect()),
            joints: reader.read_joints(0).map(|j| j.into_u16().collect()),
            weights: reader.read_weights(0).map(|w| w.into_f32().collect()),
            indices,
            material: primitive.material().index(),
            targets,
        });
    }

    Ok(Mesh {
        name,
        primitives,
        weights: mesh.weights().map(<[f32]>::to_vec).unwrap_or_default(),
    })
}

/// Area-weighted vertex normals for geometry that ships without them
pub fn compute_normals(positions: &[Vec3], indices: Option<&[u32]>) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    let sequential: Vec<u32>;
    let indices = match indices {
        Some(indices) => indices,
        None => {
            sequential = (0..positions.len() as u32).collect();
            &sequential
        }
    };

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(&pa), Some(&pb), Some(&pc)) = (positions.get(a), positions.get(b), positions.get(c)) else {
            continue;
        };
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

fn load_skin(skin: &gltf::Skin, buffers: &[gltf::buffer::Data]) -> Skin {
    let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));
    Skin {
        name: skin.name().map(str::to_string),
        joints: skin.joints().map(|j| j.index()).collect(),
        inverse_bind_matrices: reader
            .read_inverse_bind_matrices()
            .map(|m| m.map(|m| Mat4::from_cols_array_2d(&m)).collect())
            .unwrap_or_default(),
    }
}

fn load_clip(animation: &gltf::Animation, buffers: &[gltf::buffer::Data]) -> AnimationClip {
    use gltf::animation::util::ReadOutputs;

    let name = animation
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("clip {}", animation.index()));

    let mut channels = Vec::new();
    for channel in animation.channels() {
        let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));
        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };

        let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
            log::warn!("Animation {:?} has a channel without keyframes, skipping", name);
            continue;
        };
        let times: Vec<f32> = inputs.collect();

        let keyframes = match outputs {
            ReadOutputs::Translations(t) => Keyframes::Translation(t.map(Vec3::from_array).collect()),
            ReadOutputs::Rotations(r) => {
                Keyframes::Rotation(r.into_f32().map(Quat::from_array).collect())
            }
            ReadOutputs::Scales(s) => Keyframes::Scale(s.map(Vec3::from_array).collect()),
            ReadOutputs::MorphTargetWeights(w) => {
                let values: Vec<f32> = w.into_f32().collect();
                let per_key = if interpolation == Interpolation::CubicSpline { 3 } else { 1 };
                let outputs = times.len() * per_key;
                let targets = if outputs > 0 { values.len() / outputs } else { 0 };
                Keyframes::Weights { values, targets }
            }
        };

        channels.push(Channel {
            node: channel.target().node().index(),
            interpolation,
            times,
            keyframes,
        });
    }

    let clip = AnimationClip::new(name, channels);
    log::debug!("  Clip {:?}: {} channels, {:.2}s", clip.name, clip.channels.len(), clip.duration);
    clip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_normals_for_flat_triangle() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = compute_normals(&positions, None);
        assert_eq!(normals, vec![Vec3::Z; 3]);
    }

    #[test]
    fn test_compute_normals_for_unused_vertex() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE];
        let normals = compute_normals(&positions, Some(&[0, 1, 2]));
        assert_eq!(normals[3], Vec3::Y);
    }

    #[test]
    fn test_invalid_document_is_parse_error() {
        let err = model_from_slice(b"not a gltf", Path::new("broken.gltf")).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_cyclic_nodes_rejected() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "nodes": [{"children": [1]}, {"children": [0]}],
            "scenes": [{"nodes": [0]}]
        }"#;

        let err = model_from_slice(json, Path::new("cyclic.gltf")).unwrap_err();

        assert!(matches!(err, LoadError::Hierarchy { node: 0, .. }), "got {:?}", err);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_model("does/not/exist.gltf", |_| {}).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
