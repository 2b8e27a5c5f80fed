//! Risk Classifier Inference
//!
//! Loads classifier and scaler artifacts, then runs assembled feature
//! vectors through the classifier.

mod artifacts;
mod classifier;
mod engine;
mod linear;
mod onnx;

pub use artifacts::{load_classifier, load_transform};
pub use classifier::{ClassProbabilities, Classifier, RiskClass, SupportsProbability};
pub use engine::{InferenceEngine, InferenceResult};
pub use linear::LogisticClassifier;
pub use onnx::OnnxClassifier;

use feature_engine::AssemblyError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("Artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),
    #[error("Unsupported artifact format: {0}")]
    UnsupportedFormat(String),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Model was fitted on [{model}] but the schema is [{schema}]")]
    FeatureOrderMismatch { model: String, schema: String },
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}
