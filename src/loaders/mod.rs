pub mod gltf_model;
pub mod progress;
pub mod task;

pub use gltf_model::{compute_normals, load_model, model_from_slice};
pub use progress::{read_with_progress, Progress};
pub use task::{LoadEvent, LoadState, LoadTask};
