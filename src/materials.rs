use crate::scene::{Material, Model, ShadingModel};

/// Counts of what `normalize_materials` changed
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub replaced_materials: usize,
    pub synthesized_uv1: usize,
}

/// Physically based replacement of `material` keeping its texture maps
pub fn to_physically_based(material: &Material) -> Material {
    Material {
        shading: ShadingModel::MetallicRoughness,
        roughness: Some(material.roughness.unwrap_or(1.0)),
        metalness: Some(material.metalness.unwrap_or(0.0)),
        ..material.clone()
    }
}

/// Gives every primitive whose material samples an occlusion map a second UV
/// set copied from the first, and swaps non-PBR materials for PBR ones.
pub fn normalize_materials(model: &mut Model) -> NormalizeReport {
    let mut report = NormalizeReport::default();

    for mesh in &mut model.meshes {
        for primitive in &mut mesh.primitives {
            let needs_uv1 = primitive
                .material
                .and_then(|index| model.materials.get(index))
                .is_some_and(|m| m.occlusion_texture.is_some());

            if needs_uv1 && primitive.uv1.is_none() {
                if let Some(uv0) = &primitive.uv0 {
                    primitive.uv1 = Some(uv0.clone());
                    report.synthesized_uv1 += 1;
                }
            }
        }
    }

    for material in &mut model.materials {
        if !material.shading.is_physically_based() {
            log::debug!(
                "Replacing {:?} material {:?} with a metallic-roughness one",
                material.shading,
                material.name
            );
            *material = to_physically_based(material);
            report.replaced_materials += 1;
        }
    }

    if report != NormalizeReport::default() {
        log::info!(
            "Normalized materials: {} replaced, {} primitives given a second UV set",
            report.replaced_materials,
            report.synthesized_uv1
        );
    }

    report
}
