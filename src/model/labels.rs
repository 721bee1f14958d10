//! Label decoder
//!
//! Maps encoded class indices back to weather categories. The artifact is the
//! fitted encoder's class list dumped as JSON:
//!
//! ```json
//! { "classes": ["Berawan", "Cerah", "Hujan", "Hujan Deras"] }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{ArtifactError, InferenceError};

#[derive(Debug, Clone, Deserialize)]
pub struct LabelDecoder {
    classes: Vec<String>,
}

impl LabelDecoder {
    pub fn new(classes: Vec<String>) -> Result<Self, ArtifactError> {
        if classes.is_empty() {
            return Err(ArtifactError::Labels("class list is empty".to_string()));
        }
        if let Some(blank) = classes.iter().position(|c| c.trim().is_empty()) {
            return Err(ArtifactError::Labels(format!("class {} has an empty name", blank)));
        }
        // labels end up as fields of a line-oriented log
        if let Some(bad) = classes.iter().position(|c| c.chars().any(char::is_control)) {
            return Err(ArtifactError::Labels(format!("class {} contains a control character", bad)));
        }
        Ok(Self { classes })
    }

    /// Load the decoder from its JSON artifact
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }

        let raw = fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let decoded: LabelDecoder = serde_json::from_slice(&raw)
            .map_err(|e| ArtifactError::Labels(e.to_string()))?;

        Self::new(decoded.classes)
    }

    /// Translate an encoded prediction into its category name
    pub fn decode(&self, index: i64) -> Result<&str, InferenceError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(String::as_str)
            .ok_or_else(|| InferenceError(format!(
                "predicted class {} is outside the {} known labels",
                index,
                self.classes.len()
            )))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}
