//! Classifier Capabilities

use crate::InferenceError;
use feature_engine::{AssembledVector, DeclaresInputNames};
use serde::{Deserialize, Serialize};

/// Binary class predicted by a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskClass {
    /// Label 0, no heart disease
    Negative,
    /// Label 1, heart disease
    Positive,
}

impl RiskClass {
    /// Map a raw model label
    pub fn from_label(label: i64) -> Result<Self, InferenceError> {
        match label {
            0 => Ok(RiskClass::Negative),
            1 => Ok(RiskClass::Positive),
            other => Err(InferenceError::InferenceFailed(format!(
                "unexpected class label {other}"
            ))),
        }
    }

    pub fn label(&self) -> u8 {
        match self {
            RiskClass::Negative => 0,
            RiskClass::Positive => 1,
        }
    }
}

/// Per-class probabilities for one input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub negative: f64,
    pub positive: f64,
}

impl ClassProbabilities {
    /// Build from the positive class probability
    pub fn from_positive(positive: f64) -> Self {
        let positive = positive.clamp(0.0, 1.0);
        Self {
            negative: 1.0 - positive,
            positive,
        }
    }
}

/// Capability: the model can report class probabilities
pub trait SupportsProbability {
    fn predict_proba(&self, input: &AssembledVector) -> Result<ClassProbabilities, InferenceError>;
}

/// A trained binary classifier
pub trait Classifier: Send + Sync {
    /// Number of inputs the model was trained on
    fn expected_dimension(&self) -> usize;

    fn predict(&self, input: &AssembledVector) -> Result<RiskClass, InferenceError>;

    /// Probability capability, if the model has one
    fn probability(&self) -> Option<&dyn SupportsProbability> {
        None
    }

    /// Fitted input names, if the artifact records them
    fn declared_names(&self) -> Option<&dyn DeclaresInputNames> {
        None
    }

    /// Label and, when supported, probabilities for one input
    ///
    /// Backends that produce both from a single evaluation should override this.
    fn infer(
        &self,
        input: &AssembledVector,
    ) -> Result<(RiskClass, Option<ClassProbabilities>), InferenceError> {
        let class = self.predict(input)?;
        let probability = match self.probability() {
            Some(model) => Some(model.predict_proba(input)?),
            None => None,
        };
        Ok((class, probability))
    }

    /// Short backend name for diagnostics
    fn backend(&self) -> &'static str;
}

pub(crate) fn check_input(expected: usize, input: &AssembledVector) -> Result<(), InferenceError> {
    if input.len() != expected {
        return Err(InferenceError::InvalidInputShape {
            expected,
            actual: input.len(),
        });
    }
    Ok(())
}
