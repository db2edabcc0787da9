pub mod animation;
pub mod deform;
pub mod lighting;
pub mod model;

pub use animation::{AnimationClip, AnimationMixer, Channel, ClipAction, Interpolation, Keyframes, Sample};
pub use lighting::{rig_lights, Light};
pub use model::{
    AlphaMode, Material, Mesh, Model, MorphTarget, Node, Primitive, ShadingModel, Skin, Texture,
    TextureRef, Transform,
};

use crate::config::LightingRig;

/// Everything presented to the camera: background, lights and at most one model
#[derive(Debug, Default)]
pub struct SceneGraph {
    pub background: [f32; 3],
    pub lights: Vec<Light>,
    model: Option<Model>,
}

impl SceneGraph {
    pub fn new(background: [f32; 3], rig: LightingRig) -> Self {
        Self {
            background,
            lights: rig_lights(rig),
            model: None,
        }
    }

    /// Inserts the model, replacing and returning any previous one
    pub fn insert_model(&mut self, model: Model) -> Option<Model> {
        self.model.replace(model)
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut Model> {
        self.model.as_mut()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }
}
