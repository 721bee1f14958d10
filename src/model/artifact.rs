//! Model artifact loader

use std::path::Path;
use std::sync::Arc;

use super::{ArtifactError, Classifier, FeatureVector, InferenceError, LabelDecoder, OnnxClassifier};

/// Trained classifier plus the decoder for its output.
/// Immutable after construction.
pub struct ModelArtifact {
    classifier: Box<dyn Classifier>,
    labels: LabelDecoder,
}

impl ModelArtifact {
    pub fn new(classifier: Box<dyn Classifier>, labels: LabelDecoder) -> Self {
        Self { classifier, labels }
    }

    /// Load both artifacts from disk
    pub fn load(model_path: &Path, encoder_path: &Path) -> Result<Self, ArtifactError> {
        let classifier = OnnxClassifier::load(model_path)?;
        let labels = LabelDecoder::load(encoder_path)?;
        Ok(Self::new(Box::new(classifier), labels))
    }

    /// Run the classifier on one row and decode the result
    pub fn classify(&self, features: &FeatureVector) -> Result<&str, InferenceError> {
        let encoded = self.classifier.predict(features)?;
        self.labels.decode(encoded)
    }

    pub fn labels(&self) -> &LabelDecoder {
        &self.labels
    }

    pub fn describe(&self) -> String {
        self.classifier.describe()
    }
}

/// Load the artifacts once at startup.
///
/// A failure is logged and yields `None`; the process keeps running and
/// predictions are refused until it is restarted with working artifacts.
pub fn load_at_startup(model_path: &Path, encoder_path: &Path) -> Option<Arc<ModelArtifact>> {
    match ModelArtifact::load(model_path, encoder_path) {
        Ok(artifact) => {
            tracing::info!(
                "Model and encoder loaded ({}, {} labels). Ready to accept predictions.",
                artifact.describe(),
                artifact.labels().classes().len()
            );
            Some(Arc::new(artifact))
        }
        Err(e) => {
            tracing::error!("Model unavailable: {}", e);
            tracing::error!(
                "Check that '{}' and '{}' exist and were produced by the training pipeline",
                model_path.display(),
                encoder_path.display()
            );
            None
        }
    }
}
