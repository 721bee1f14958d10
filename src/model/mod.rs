//! Model Module - Weather Classifier
//!
//! The classifier and its label decoder are loaded once at startup and
//! shared read-only by every request. If either artifact fails to load the
//! service keeps running and `/predict` answers with "model unavailable".

pub mod artifact;
pub mod classifier;
pub mod labels;

use std::path::PathBuf;
use thiserror::Error;

pub use artifact::ModelArtifact;
pub use classifier::{Classifier, FeatureVector, OnnxClassifier, FEATURE_COUNT};
pub use labels::LabelDecoder;

/// Failure while loading an artifact from disk
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid label decoder: {0}")]
    Labels(String),

    #[error("failed to load classifier: {0}")]
    Classifier(String),
}

/// Failure while running the classifier or decoding its output
#[derive(Debug, Error)]
#[error("{0}")]
pub struct InferenceError(pub String);
