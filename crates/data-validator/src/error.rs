//! Validation Error Types

use thiserror::Error;

/// Errors during clinical input validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Categorical value is not one of the accepted codes
    #[error("{field} value {value} is not one of {allowed:?}")]
    NotInEnumeration {
        field: &'static str,
        value: f64,
        allowed: &'static [f64],
    },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
