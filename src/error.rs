use std::path::PathBuf;

use thiserror::Error;

/// Terminal failure while fetching or decoding the model asset
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse glTF document {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("failed to resolve buffers or images for {path:?}: {source}")]
    Resources {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("invalid geometry in mesh {mesh:?}: {reason}")]
    Geometry { mesh: String, reason: String },

    #[error("node {node} in {path:?} has more than one parent or is part of a cycle")]
    Hierarchy { path: PathBuf, node: usize },

    #[error("loader stopped before reporting a result")]
    Disconnected,
}

/// The optional host platform integration is not available
#[derive(Debug, Error)]
#[error("no host bridge available: {0}")]
pub struct HostBridgeAbsent(pub String);
