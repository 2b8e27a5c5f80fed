//! Inference Engine Implementation

use crate::classifier::{ClassProbabilities, Classifier, RiskClass};
use crate::InferenceError;
use feature_engine::{
    canonical_name, FeatureAssembler, FeatureTransform, FieldRecord, ScalingSubset,
    SchemaDescriptor,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of inference operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Predicted class
    pub class: RiskClass,
    /// Class probabilities, when the model supports them
    pub probability: Option<ClassProbabilities>,
    /// Assembly plus inference latency in milliseconds
    pub latency_ms: f64,
}

/// Assembles records and runs them through a loaded classifier
///
/// Artifacts are immutable after construction, so one engine can be shared
/// across request handlers.
pub struct InferenceEngine {
    classifier: Arc<dyn Classifier>,
    assembler: FeatureAssembler,
}

impl InferenceEngine {
    /// Create an engine for `classifier` using `schema` as the column order
    pub fn new(classifier: Arc<dyn Classifier>, schema: SchemaDescriptor) -> Self {
        info!(
            "Creating inference engine: backend={}, inputs={}",
            classifier.backend(),
            classifier.expected_dimension()
        );
        let assembler = FeatureAssembler::new(schema, classifier.expected_dimension());
        Self {
            classifier,
            assembler,
        }
    }

    /// Scale a subset of fields before inference
    ///
    /// Without an explicit subset the transform's declared names are used,
    /// falling back to the standard continuous fields.
    pub fn with_transform(
        mut self,
        transform: Arc<dyn FeatureTransform>,
        subset: Option<ScalingSubset>,
    ) -> Result<Self, InferenceError> {
        self.set_transform(transform, subset)?;
        Ok(self)
    }

    /// Configure scaling in place; on error the engine keeps running unscaled
    pub fn set_transform(
        &mut self,
        transform: Arc<dyn FeatureTransform>,
        subset: Option<ScalingSubset>,
    ) -> Result<(), InferenceError> {
        let subset = subset.unwrap_or_else(|| ScalingSubset::discover(transform.as_ref()));
        self.assembler.set_scaling(transform, subset)?;
        Ok(())
    }

    /// Check the schema against what the model expects, before any request
    pub fn check_compatibility(&self) -> Result<(), InferenceError> {
        self.assembler.check_schema()?;

        if let Some(declared) = self.classifier.declared_names() {
            let model: Vec<&str> = declared
                .input_names()
                .iter()
                .map(|n| canonical_name(n))
                .collect();
            let schema = self.assembler.schema().names();
            if !model.is_empty() && model != schema {
                return Err(InferenceError::FeatureOrderMismatch {
                    model: model.join(", "),
                    schema: schema.join(", "),
                });
            }
        }
        Ok(())
    }

    /// Assemble a record and predict its risk class
    pub fn predict(&self, record: &FieldRecord) -> Result<InferenceResult, InferenceError> {
        let start = Instant::now();

        let vector = self.assembler.assemble(record)?;
        let (class, probability) = self.classifier.infer(&vector)?;
        if probability.is_none() {
            debug!("Model has no probability output, omitting probability");
        }

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!("Inference completed in {:.3}ms: {:?}", latency_ms, class);

        Ok(InferenceResult {
            class,
            probability,
            latency_ms,
        })
    }

    pub fn supports_probability(&self) -> bool {
        self.classifier.probability().is_some()
    }

    pub fn expected_dimension(&self) -> usize {
        self.classifier.expected_dimension()
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        self.assembler.schema()
    }

    pub fn scaling_subset(&self) -> Option<&ScalingSubset> {
        self.assembler.scaling_subset()
    }

    pub fn backend(&self) -> &'static str {
        self.classifier.backend()
    }

    /// Pick the schema for a classifier: its declared names when present,
    /// else the clinical fields with an optional `id` placeholder
    pub fn default_schema(classifier: &dyn Classifier, include_id: bool) -> SchemaDescriptor {
        if let Some(declared) = classifier.declared_names() {
            match SchemaDescriptor::from_declared_names(declared.input_names()) {
                Ok(schema) if !schema.is_empty() => return schema,
                Ok(_) => {}
                Err(e) => warn!("Ignoring declared model input names: {}", e),
            }
        }
        let schema = SchemaDescriptor::clinical();
        if include_id {
            schema.with_id_placeholder()
        } else {
            schema
        }
    }
}
