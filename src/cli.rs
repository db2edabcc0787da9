// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::{Color, LightingRig, PolarClamp, ViewerConfig};
use crate::framing::DistanceBasis;

/// Environment variable naming the model when neither CLI nor config file does
pub const MODEL_ENV: &str = "GLTF_FILE";

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "gltf-viewer")]
#[command(about = "Interactive glTF model viewer", long_about = None)]
pub struct Cli {
    /// glTF or GLB file to display
    pub model: Option<PathBuf>,

    /// JSON config file; flags given here override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Background color as rrggbb, #rrggbb or 0xrrggbb
    #[arg(long)]
    pub background: Option<Color>,

    #[arg(long, value_enum)]
    pub lighting: Option<LightingRig>,

    /// Orbit minimum distance as a fraction of the model's largest extent
    #[arg(long)]
    pub min_distance_ratio: Option<f32>,

    #[arg(long)]
    pub max_distance: Option<f32>,

    /// Polar angle limits in radians, as MIN,MAX
    #[arg(long)]
    pub polar_clamp: Option<PolarClamp>,

    /// Show a loading overlay instead of logging progress
    #[arg(long)]
    pub overlay: bool,

    /// Replace non-PBR materials and synthesize occlusion UVs
    #[arg(long)]
    pub normalize_materials: bool,

    /// Bounds measurement used for the camera distance
    #[arg(long, value_enum)]
    pub distance_basis: Option<DistanceBasis>,

    /// Orbit damping factor in (0, 1]
    #[arg(long)]
    pub damping: Option<f32>,

    /// Notify the hosting window on startup
    #[arg(long)]
    pub host_bridge: bool,
}

impl Cli {
    /// Layers defaults, the config file, `GLTF_FILE` and these flags
    pub fn into_config(self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::from_file(path)?,
            None => ViewerConfig::default(),
        };
        self.apply(&mut config, std::env::var_os(MODEL_ENV).map(PathBuf::from));
        config.validate()?;
        Ok(config)
    }

    fn apply(self, config: &mut ViewerConfig, env_model: Option<PathBuf>) {
        if let Some(model) = self.model.or(env_model.filter(|_| self.config.is_none())) {
            config.model_path = model;
        }
        if let Some(color) = self.background {
            config.background_color = color;
        }
        if let Some(rig) = self.lighting {
            config.lighting_rig = rig;
        }
        if self.min_distance_ratio.is_some() {
            config.min_distance_ratio = self.min_distance_ratio;
        }
        if self.max_distance.is_some() {
            config.max_distance = self.max_distance;
        }
        if self.polar_clamp.is_some() {
            config.polar_angle_clamp = self.polar_clamp;
        }
        if let Some(basis) = self.distance_basis {
            config.distance_basis = basis;
        }
        if self.damping.is_some() {
            config.damping = self.damping;
        }
        config.show_loading_overlay |= self.overlay;
        config.normalize_materials |= self.normalize_materials;
        config.host_bridge |= self.host_bridge;
    }
}
