//! Classifier - ONNX Runtime Integration
//!
//! The trained model is exported to ONNX and executed with ONNX Runtime.
//! Input is a single `[1, 4]` float32 row; the first graph output holds the
//! encoded class index (int64), which is what sklearn exporters emit as
//! `output_label`.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::{ArtifactError, InferenceError};

/// Number of features the model was trained on
pub const FEATURE_COUNT: usize = 4;

/// One row of features: suhu, kelembaban, kecepatan_angin, tekanan_udara.
/// The order is fixed by the training script and must never change.
pub type FeatureVector = [f32; FEATURE_COUNT];

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait for classifier backends (ONNX, test stubs, ...)
pub trait Classifier: Send + Sync {
    /// Classify one row, returning the encoded class index
    fn predict(&self, features: &FeatureVector) -> Result<i64, InferenceError>;

    /// Short human-readable description for logs and status
    fn describe(&self) -> String;
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

pub struct OnnxClassifier {
    // `Session::run` needs exclusive access
    session: Mutex<Session>,
    output_name: String,
    model_path: String,
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(model_path: &Path) -> Result<Self, ArtifactError> {
        tracing::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ArtifactError::NotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| ArtifactError::Classifier(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ArtifactError::Classifier(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ArtifactError::Classifier(format!("Failed to load model: {}", e)))?;

        let output_name = session.outputs().first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| ArtifactError::Classifier("No output defined".to_string()))?;

        tracing::info!("ONNX model loaded successfully (label output: {})", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            model_path: model_path.display().to_string(),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<i64, InferenceError> {
        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), features.to_vec())
            .map_err(|e| InferenceError(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError(format!("Inference failed: {}", e)))?;

        let output = outputs.get(&self.output_name)
            .ok_or_else(|| InferenceError("No output".to_string()))?;

        let (_, labels) = output.try_extract_tensor::<i64>()
            .map_err(|e| InferenceError(format!("Extract error: {}", e)))?;

        labels.first()
            .copied()
            .ok_or_else(|| InferenceError("Model returned an empty label tensor".to_string()))
    }

    fn describe(&self) -> String {
        format!("onnx:{}", self.model_path)
    }
}
