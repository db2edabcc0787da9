pub mod camera;
pub mod cli;
pub mod clock;
pub mod config;
pub mod controls;
pub mod error;
pub mod framing;
pub mod host;
pub mod input;
pub mod loaders;
pub mod materials;
pub mod math;
pub mod overlay;
pub mod render;
pub mod scene;
pub mod types;
pub mod viewer;

pub use config::{LightingRig, ViewerConfig};
pub use error::{HostBridgeAbsent, LoadError};
pub use viewer::Viewer;
