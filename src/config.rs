use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::framing::{DistanceBasis, RecenterAxes};

pub const DEFAULT_MODEL_PATH: &str = "models/scene.gltf";

/// Light arrangement placed around the model
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LightingRig {
    /// Ambient fill plus one directional key light
    #[default]
    Basic,
    /// Ambient, key and cool fill light
    Studio,
    /// Dim ambient, overhead spot and warm rim light
    Dramatic,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseValueError {
    #[error("invalid color {0:?}, expected rrggbb, #rrggbb or 0xrrggbb")]
    Color(String),
    #[error("invalid polar clamp {0:?}, expected MIN,MAX in radians with MIN <= MAX")]
    PolarClamp(String),
}

/// Linear RGB color parsed from a hex string
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [f32; 3]);

impl Color {
    pub const BLACK: Color = Color([0.0, 0.0, 0.0]);

    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Color([channel(16), channel(8), channel(0)])
    }

    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.0[0]) << 16) | (channel(self.0[1]) << 8) | channel(self.0[2])
    }
}

impl FromStr for Color {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != 6 {
            return Err(ParseValueError::Color(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Color::from_hex)
            .map_err(|_| ParseValueError::Color(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ParseValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Allowed range of the orbit camera's polar angle, in radians from +Y
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolarClamp {
    pub min: f32,
    pub max: f32,
}

impl FromStr for PolarClamp {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseValueError::PolarClamp(s.to_string());
        let (min, max) = s.split_once(',').ok_or_else(err)?;
        let min: f32 = min.trim().parse().map_err(|_| err())?;
        let max: f32 = max.trim().parse().map_err(|_| err())?;
        if min > max || min < 0.0 || max > std::f32::consts::PI {
            return Err(err());
        }
        Ok(PolarClamp { min, max })
    }
}

/// Options for one viewer deployment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerConfig {
    pub model_path: PathBuf,
    pub background_color: Color,
    pub lighting_rig: LightingRig,
    /// Orbit minimum distance as a fraction of the model's largest extent
    pub min_distance_ratio: Option<f32>,
    pub max_distance: Option<f32>,
    pub polar_angle_clamp: Option<PolarClamp>,
    pub show_loading_overlay: bool,
    /// Replace non-PBR materials and synthesize missing occlusion UVs
    pub normalize_materials: bool,
    pub recenter: RecenterAxes,
    pub distance_basis: DistanceBasis,
    pub distance_multiplier: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Orbit damping factor; `None` applies input immediately
    pub damping: Option<f32>,
    pub host_bridge: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            background_color: Color::BLACK,
            lighting_rig: LightingRig::Basic,
            min_distance_ratio: None,
            max_distance: None,
            polar_angle_clamp: None,
            show_loading_overlay: false,
            normalize_materials: false,
            recenter: RecenterAxes::ALL,
            distance_basis: DistanceBasis::MaxExtent,
            distance_multiplier: 1.5,
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            damping: None,
            host_bridge: false,
        }
    }
}

impl ViewerConfig {
    /// Reads a JSON config file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: ViewerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.fov > 0.0 && self.fov < 180.0,
            "fov must be between 0 and 180 degrees, got {}",
            self.fov
        );
        anyhow::ensure!(
            self.near > 0.0 && self.near < self.far,
            "near plane must be positive and closer than far ({} / {})",
            self.near,
            self.far
        );
        anyhow::ensure!(
            self.distance_multiplier > 0.0,
            "distance multiplier must be positive, got {}",
            self.distance_multiplier
        );
        if let Some(ratio) = self.min_distance_ratio {
            anyhow::ensure!(ratio >= 0.0, "minDistanceRatio must not be negative, got {}", ratio);
        }
        if let Some(max) = self.max_distance {
            anyhow::ensure!(max > 0.0, "maxDistance must be positive, got {}", max);
        }
        if let Some(damping) = self.damping {
            anyhow::ensure!(
                damping > 0.0 && damping <= 1.0,
                "damping must be in (0, 1], got {}",
                damping
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing_formats() {
        let expected = Color::from_hex(0xff8000);
        assert_eq!("ff8000".parse::<Color>(), Ok(expected));
        assert_eq!("#FF8000".parse::<Color>(), Ok(expected));
        assert_eq!("0xff8000".parse::<Color>(), Ok(expected));
        assert!("ff80".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_display_roundtrip() {
        assert_eq!(Color::from_hex(0x336699).to_string(), "#336699");
    }

    #[test]
    fn test_polar_clamp_parsing() {
        assert_eq!(
            "0.5, 1.5".parse::<PolarClamp>(),
            Ok(PolarClamp { min: 0.5, max: 1.5 })
        );
        assert!("1.5,0.5".parse::<PolarClamp>().is_err());
        assert!("1.0".parse::<PolarClamp>().is_err());
    }

    #[test]
    fn test_defaults_follow_classic_viewer() {
        let config = ViewerConfig::default();
        assert_eq!(config.fov, 75.0);
        assert_eq!(config.near, 0.1);
        assert_eq!(config.far, 1000.0);
        assert_eq!(config.distance_multiplier, 1.5);
        assert_eq!(config.lighting_rig, LightingRig::Basic);
        assert!(config.min_distance_ratio.is_none());
    }

    #[test]
    fn test_json_uses_camel_case_and_defaults() {
        let config = ViewerConfig::from_json(
            r##"{
                "modelPath": "models/girl/scene.gltf",
                "backgroundColor": "#202020",
                "lightingRig": "dramatic",
                "minDistanceRatio": 0.8,
                "polarAngleClamp": { "min": 0.0, "max": 1.4 },
                "showLoadingOverlay": true
            }"##,
        )
        .unwrap();

        assert_eq!(config.model_path, PathBuf::from("models/girl/scene.gltf"));
        assert_eq!(config.background_color, Color::from_hex(0x202020));
        assert_eq!(config.lighting_rig, LightingRig::Dramatic);
        assert_eq!(config.min_distance_ratio, Some(0.8));
        assert_eq!(config.polar_angle_clamp, Some(PolarClamp { min: 0.0, max: 1.4 }));
        assert!(config.show_loading_overlay);
        assert_eq!(config.fov, 75.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ViewerConfig::from_json(r#"{ "fov": 0 }"#).is_err());
        assert!(ViewerConfig::from_json(r#"{ "near": 10, "far": 1 }"#).is_err());
        assert!(ViewerConfig::from_json(r#"{ "backgroundColor": "blue" }"#).is_err());
        assert!(ViewerConfig::from_json(r#"{ "lightingRig": "neon" }"#).is_err());
    }
}
