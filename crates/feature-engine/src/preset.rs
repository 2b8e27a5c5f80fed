//! Preset Patient Records

use crate::record::{fields, FieldRecord};
use serde::{Deserialize, Serialize};

/// Named starting points for the clinical form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// No preset values, every field supplied by the caller
    Custom,
    /// Older patient with abnormal exercise test results
    HighRisk,
    /// Younger patient with normal readings
    LowRisk,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Custom, Preset::HighRisk, Preset::LowRisk];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Custom => "custom",
            Preset::HighRisk => "high_risk",
            Preset::LowRisk => "low_risk",
        }
    }

    /// Parse a preset name as produced by [`Preset::as_str`]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Field values for this preset, `None` for [`Preset::Custom`]
    pub fn record(&self) -> Option<FieldRecord> {
        let values: [(&str, f64); 13] = match self {
            Preset::Custom => return None,
            Preset::HighRisk => [
                (fields::AGE, 65.0),
                (fields::SEX, 1.0),
                (fields::CP, 3.0),
                (fields::TRESTBPS, 180.0),
                (fields::CHOL, 300.0),
                (fields::FBS, 1.0),
                (fields::RESTECG, 1.0),
                (fields::THALCH, 100.0),
                (fields::EXANG, 1.0),
                (fields::OLDPEAK, 4.0),
                (fields::SLOPE, 2.0),
                (fields::CA, 3.0),
                (fields::THAL, 2.0),
            ],
            Preset::LowRisk => [
                (fields::AGE, 35.0),
                (fields::SEX, 0.0),
                (fields::CP, 0.0),
                (fields::TRESTBPS, 115.0),
                (fields::CHOL, 180.0),
                (fields::FBS, 0.0),
                (fields::RESTECG, 0.0),
                (fields::THALCH, 175.0),
                (fields::EXANG, 0.0),
                (fields::OLDPEAK, 0.0),
                (fields::SLOPE, 0.0),
                (fields::CA, 0.0),
                (fields::THAL, 1.0),
            ],
        };
        Some(values.into_iter().collect())
    }
}
