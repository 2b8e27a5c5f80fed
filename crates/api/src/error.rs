//! API Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use feature_engine::AssemblyError;
use inference_engine::InferenceError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// API-level errors with HTTP status mapping
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl From<AssemblyError> for ApiError {
    fn from(err: AssemblyError) -> Self {
        ApiError::Inference(InferenceError::Assembly(err))
    }
}

impl ApiError {
    /// Stable code used in the response body and rejection metrics
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "INVALID_INPUT",
            ApiError::UnknownPreset(_) => "UNKNOWN_PRESET",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Inference(e) => match e {
                InferenceError::Assembly(AssemblyError::SchemaMismatch { .. })
                | InferenceError::InvalidInputShape { .. }
                | InferenceError::FeatureOrderMismatch { .. } => "SCHEMA_MISMATCH",
                InferenceError::Assembly(
                    AssemblyError::TransformShapeError { .. }
                    | AssemblyError::InvalidTransform(_)
                    | AssemblyError::ScalingOrderMismatch { .. }
                    | AssemblyError::ScaledFieldOutsideSchema(_),
                ) => "TRANSFORM_SHAPE",
                InferenceError::Assembly(AssemblyError::MissingField(_)) => "MISSING_FIELD",
                InferenceError::Assembly(AssemblyError::NonFiniteValue(_)) => "INVALID_INPUT",
                InferenceError::Assembly(_) => "SCHEMA_MISMATCH",
                _ => "INTERNAL",
            },
        }
    }

    fn status(&self) -> StatusCode {
        match self.code() {
            "UNKNOWN_PRESET" | "NOT_FOUND" => StatusCode::NOT_FOUND,
            "INTERNAL" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match &self {
            ApiError::Validation(errors) => ("Invalid input".to_string(), errors.clone()),
            ApiError::Inference(e) if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!("Prediction failed: {}", e);
                ("An internal error occurred".to_string(), Vec::new())
            }
            other => {
                warn!("Request rejected: {}", other);
                (other.to_string(), Vec::new())
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}
