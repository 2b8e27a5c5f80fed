//! Categorical Encoding

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Patient sex as selected on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Numeric code used by the models: male = 1, female = 0
    pub fn code(&self) -> f64 {
        match self {
            Sex::Male => 1.0,
            Sex::Female => 0.0,
        }
    }
}

impl FromStr for Sex {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(ValidationError::InvalidFormat(format!(
                "unknown sex {other:?}, expected Male or Female"
            ))),
        }
    }
}
