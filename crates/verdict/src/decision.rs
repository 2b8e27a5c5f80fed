//! Verdict Decision

use inference_engine::{ClassProbabilities, InferenceResult, RiskClass};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Verdict configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictConfig {
    /// Positive probability at or above which the verdict is high risk (default: 0.5)
    pub probability_threshold: f64,
    /// Decide on probability instead of the predicted label when available
    pub use_probability: bool,
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            probability_threshold: 0.5,
            use_probability: false,
        }
    }
}

/// Binary risk outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskVerdict {
    High,
    Low,
}

impl RiskVerdict {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskVerdict::High => "high",
            RiskVerdict::Low => "low",
        }
    }

    /// Message shown for this verdict
    pub fn message(&self) -> &'static str {
        match self {
            RiskVerdict::High => "High Risk of Heart Disease",
            RiskVerdict::Low => "Low Risk of Heart Disease",
        }
    }
}

/// Verdict with the probability it was based on, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub risk: RiskVerdict,
    /// Positive class probability
    pub probability: Option<f64>,
}

impl Verdict {
    /// Decide a verdict from a class and optional probabilities
    pub fn decide(
        class: RiskClass,
        probability: Option<ClassProbabilities>,
        config: &VerdictConfig,
    ) -> Self {
        let positive = probability.map(|p| p.positive);
        let risk = match positive {
            Some(p) if config.use_probability => {
                debug!(
                    "Deciding on probability {:.4} against threshold {}",
                    p, config.probability_threshold
                );
                if p >= config.probability_threshold {
                    RiskVerdict::High
                } else {
                    RiskVerdict::Low
                }
            }
            _ => match class {
                RiskClass::Positive => RiskVerdict::High,
                RiskClass::Negative => RiskVerdict::Low,
            },
        };
        Self {
            risk,
            probability: positive,
        }
    }

    /// Decide a verdict from an inference result
    pub fn from_result(result: &InferenceResult, config: &VerdictConfig) -> Self {
        Self::decide(result.class, result.probability, config)
    }

    pub fn message(&self) -> &'static str {
        self.risk.message()
    }

    /// `Risk Probability: 81.76%`, omitted when the model has no probabilities
    pub fn probability_display(&self) -> Option<String> {
        self.probability
            .map(|p| format!("Risk Probability: {:.2}%", p * 100.0))
    }
}
