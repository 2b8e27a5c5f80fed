//! ONNX Classifier using tract

use crate::classifier::{check_input, ClassProbabilities, Classifier, RiskClass, SupportsProbability};
use crate::InferenceError;
use feature_engine::AssembledVector;
use std::path::Path;
use tracing::{debug, info};
use tract_onnx::prelude::*;

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// Classifier exported to ONNX with its label as output 0 and,
/// optionally, a `[1, 2]` probability tensor as output 1
pub struct OnnxClassifier {
    plan: OnnxPlan,
    n_features: usize,
    has_probabilities: bool,
}

fn load_error(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::ModelLoadError(e.to_string())
}

fn run_error(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::InferenceFailed(e.to_string())
}

impl OnnxClassifier {
    /// Load and optimize an ONNX model
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        info!("Loading ONNX model from {}", path.display());

        let mut model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.into_typed())
            .map_err(load_error)?;

        let n_features = {
            let fact = model.input_fact(0).map_err(load_error)?;
            fact.shape
                .last()
                .and_then(|d| d.to_i64().ok())
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| load_error("model input has no concrete feature axis"))?
        };
        let has_probabilities = model.output_outlets().map_err(load_error)?.len() > 1;

        // Pin the batch axis so the plan optimizes for single-row requests
        model
            .set_input_fact(0, f32::fact([1, n_features]))
            .map_err(load_error)?;
        let plan = model
            .into_optimized()
            .and_then(|m| m.into_runnable())
            .map_err(load_error)?;

        info!(
            "ONNX model ready: {} features, probabilities={}",
            n_features, has_probabilities
        );
        Ok(Self {
            plan,
            n_features,
            has_probabilities,
        })
    }

    fn run(&self, input: &AssembledVector) -> Result<TVec<TValue>, InferenceError> {
        check_input(self.n_features, input)?;
        let data: Vec<f32> = input.values.iter().map(|&v| v as f32).collect();
        let tensor = Tensor::from(
            tract_ndarray::Array2::from_shape_vec((1, self.n_features), data).map_err(run_error)?,
        );
        let outputs = self.plan.run(tvec!(tensor.into())).map_err(run_error)?;
        debug!("ONNX model produced {} outputs", outputs.len());
        Ok(outputs)
    }
}

fn label_from(output: &TValue) -> Result<RiskClass, InferenceError> {
    let labels = output.cast_to::<i64>().map_err(run_error)?;
    let label = labels
        .as_slice::<i64>()
        .map_err(run_error)?
        .first()
        .copied()
        .ok_or_else(|| run_error("empty label output"))?;
    RiskClass::from_label(label)
}

fn probabilities_from(output: &TValue) -> Result<ClassProbabilities, InferenceError> {
    let probabilities = output.cast_to::<f32>().map_err(run_error)?;
    let values = probabilities.as_slice::<f32>().map_err(run_error)?;
    match values {
        [_, positive, ..] => Ok(ClassProbabilities::from_positive(*positive as f64)),
        _ => Err(run_error(format!(
            "probability output has {} values, expected 2",
            values.len()
        ))),
    }
}

impl SupportsProbability for OnnxClassifier {
    fn predict_proba(&self, input: &AssembledVector) -> Result<ClassProbabilities, InferenceError> {
        let outputs = self.run(input)?;
        let output = outputs
            .get(1)
            .ok_or_else(|| run_error("model has no probability output"))?;
        probabilities_from(output)
    }
}

impl Classifier for OnnxClassifier {
    fn expected_dimension(&self) -> usize {
        self.n_features
    }

    fn predict(&self, input: &AssembledVector) -> Result<RiskClass, InferenceError> {
        let outputs = self.run(input)?;
        let output = outputs.first().ok_or_else(|| run_error("model has no outputs"))?;
        label_from(output)
    }

    fn probability(&self) -> Option<&dyn SupportsProbability> {
        if self.has_probabilities {
            Some(self)
        } else {
            None
        }
    }

    /// Label and probabilities from one run of the plan
    fn infer(
        &self,
        input: &AssembledVector,
    ) -> Result<(RiskClass, Option<ClassProbabilities>), InferenceError> {
        let outputs = self.run(input)?;
        let class = label_from(outputs.first().ok_or_else(|| run_error("model has no outputs"))?)?;
        let probability = match outputs.get(1) {
            Some(output) if self.has_probabilities => Some(probabilities_from(output)?),
            _ => None,
        };
        Ok((class, probability))
    }

    fn backend(&self) -> &'static str {
        "onnx"
    }
}
