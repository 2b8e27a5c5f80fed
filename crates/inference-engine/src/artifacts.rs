//! Artifact Loading

use crate::linear::LogisticClassifier;
use crate::onnx::OnnxClassifier;
use crate::{Classifier, InferenceError};
use feature_engine::{FeatureTransform, StandardScaler};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

fn extension(path: &Path) -> Result<String, InferenceError> {
    if !path.exists() {
        return Err(InferenceError::ArtifactNotFound(path.to_path_buf()));
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| InferenceError::UnsupportedFormat(path.display().to_string()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, InferenceError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&text)
        .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))
}

/// Load a classifier artifact by file extension (`.json` or `.onnx`)
pub fn load_classifier(path: &Path) -> Result<Arc<dyn Classifier>, InferenceError> {
    let classifier: Arc<dyn Classifier> = match extension(path)?.as_str() {
        "json" => {
            let model: LogisticClassifier = read_json(path)?;
            model.validate()?;
            Arc::new(model)
        }
        "onnx" => Arc::new(OnnxClassifier::load(path)?),
        other => return Err(InferenceError::UnsupportedFormat(other.to_string())),
    };
    info!(
        "Loaded {} classifier from {} ({} inputs)",
        classifier.backend(),
        path.display(),
        classifier.expected_dimension()
    );
    Ok(classifier)
}

/// Load a fitted scaler artifact (`.json` standard scaler)
pub fn load_transform(path: &Path) -> Result<Arc<dyn FeatureTransform>, InferenceError> {
    match extension(path)?.as_str() {
        "json" => {
            let scaler: StandardScaler = read_json(path)?;
            scaler.validate()?;
            info!(
                "Loaded scaler from {} ({} fitted columns)",
                path.display(),
                scaler.n_features()
            );
            Ok(Arc::new(scaler))
        }
        other => Err(InferenceError::UnsupportedFormat(other.to_string())),
    }
}
