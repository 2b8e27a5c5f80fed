//! Logistic Regression Classifier

use crate::classifier::{check_input, ClassProbabilities, Classifier, RiskClass, SupportsProbability};
use crate::InferenceError;
use feature_engine::{AssembledVector, DeclaresInputNames};
use serde::{Deserialize, Serialize};

fn default_threshold() -> f64 {
    0.5
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Linear model `p = sigmoid(w . x + b)` exported as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticClassifier {
    coefficients: Vec<f64>,
    intercept: f64,
    /// Positive class when `p >= threshold`
    #[serde(default = "default_threshold")]
    threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_names: Option<Vec<String>>,
}

impl LogisticClassifier {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, InferenceError> {
        let model = Self {
            coefficients,
            intercept,
            threshold: default_threshold(),
            feature_names: None,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, InferenceError> {
        self.threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self, InferenceError> {
        self.feature_names = Some(names);
        self.validate()?;
        Ok(self)
    }

    /// Check parameters after deserialization
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.coefficients.is_empty() {
            return Err(InferenceError::ModelLoadError(
                "logistic model has no coefficients".to_string(),
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(InferenceError::ModelLoadError(
                "logistic model has non-finite parameters".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(InferenceError::ModelLoadError(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.coefficients.len() {
                return Err(InferenceError::ModelLoadError(format!(
                    "{} feature names for {} coefficients",
                    names.len(),
                    self.coefficients.len()
                )));
            }
        }
        Ok(())
    }

    fn positive_probability(&self, input: &AssembledVector) -> Result<f64, InferenceError> {
        check_input(self.coefficients.len(), input)?;
        let z = self
            .coefficients
            .iter()
            .zip(input.as_slice())
            .fold(self.intercept, |acc, (w, x)| acc + w * x);
        Ok(sigmoid(z))
    }
}

impl SupportsProbability for LogisticClassifier {
    fn predict_proba(&self, input: &AssembledVector) -> Result<ClassProbabilities, InferenceError> {
        Ok(ClassProbabilities::from_positive(
            self.positive_probability(input)?,
        ))
    }
}

impl DeclaresInputNames for LogisticClassifier {
    fn input_names(&self) -> &[String] {
        self.feature_names.as_deref().unwrap_or(&[])
    }
}

impl Classifier for LogisticClassifier {
    fn expected_dimension(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, input: &AssembledVector) -> Result<RiskClass, InferenceError> {
        let p = self.positive_probability(input)?;
        Ok(if p >= self.threshold {
            RiskClass::Positive
        } else {
            RiskClass::Negative
        })
    }

    fn probability(&self) -> Option<&dyn SupportsProbability> {
        Some(self)
    }

    fn declared_names(&self) -> Option<&dyn DeclaresInputNames> {
        self.feature_names
            .as_ref()
            .map(|_| self as &dyn DeclaresInputNames)
    }

    fn backend(&self) -> &'static str {
        "logistic"
    }
}
