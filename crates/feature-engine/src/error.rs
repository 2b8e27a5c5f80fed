//! Assembly Error Types

use thiserror::Error;

/// Errors while turning a field record into a model input vector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    /// Schema length disagrees with the model's input dimensionality
    #[error("Input features ({actual}) do not match model expectation ({expected})")]
    SchemaMismatch { expected: usize, actual: usize },

    /// Record lacks a field the schema requires
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Scaling subset or transform output disagrees with the fitted feature count
    #[error("Transform shape mismatch: expected {expected} features, got {actual}")]
    TransformShapeError { expected: usize, actual: usize },

    /// Subset order differs from the field order the transform was fitted on
    #[error("Scaling subset [{subset}] does not match fitted order [{fitted}]")]
    ScalingOrderMismatch { fitted: String, subset: String },

    /// A field selected for scaling has no position in the schema
    #[error("Scaled field {0} is not part of the schema")]
    ScaledFieldOutsideSchema(String),

    /// The same field appears twice in a schema
    #[error("Duplicate field in schema: {0}")]
    DuplicateField(String),

    /// NaN or infinite value, either supplied or produced by a transform
    #[error("Non-finite value for field {0}")]
    NonFiniteValue(String),

    /// Transform parameters are inconsistent
    #[error("Invalid transform: {0}")]
    InvalidTransform(String),
}
