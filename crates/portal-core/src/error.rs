//! Error types for asset loading and node binding.

use thiserror::Error;

/// Failure to fetch or decode one of the scene assets.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The asset could not be fetched (network or file access).
    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },
    /// The model bytes are not a valid glTF binary.
    #[error("failed to parse model: {0}")]
    Model(#[from] gltf::Error),
    /// The model parsed but has no scene to read nodes from.
    #[error("model has no scenes")]
    NoScene,
    /// A texture could not be decoded.
    #[error("failed to decode texture: {0}")]
    Texture(#[from] image::ImageError),
}

impl LoadError {
    pub fn fetch(path: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadError::Fetch {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Failure to attach the loaded model to the scene.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    /// One or more expected nodes are absent from the model.
    #[error("model is missing nodes: {}", .0.join(", "))]
    MissingNodes(Vec<String>),
    /// A node exists but carries no mesh geometry.
    #[error("node {0} has no mesh geometry")]
    MissingGeometry(String),
}

/// Rejected parameter write.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("{0:?} expects a different value kind")]
    KindMismatch(crate::params::ParamKey),
    #[error("{0:?} received a non-finite value")]
    NotFinite(crate::params::ParamKey),
}
