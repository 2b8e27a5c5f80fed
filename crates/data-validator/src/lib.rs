//! Clinical Input Validation
//!
//! Range and enumeration checks for the clinical form fields, plus encoding
//! of categorical answers into the numeric codes models are trained on.

mod encoding;
mod error;
mod validator;

pub use encoding::Sex;
pub use error::ValidationError;
pub use validator::{ValidationConfig, ValidationResult, Validator, CATEGORICAL_LEVELS};
