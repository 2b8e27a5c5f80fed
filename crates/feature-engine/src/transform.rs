//! Fitted Scaling Transforms

use crate::record::{canonical_name, fields};
use crate::AssemblyError;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fields scaled when a transform does not declare its own input names
pub const FALLBACK_SCALED_FIELDS: [&str; 5] = [
    fields::AGE,
    fields::TRESTBPS,
    fields::CHOL,
    fields::THALCH,
    fields::OLDPEAK,
];

/// Capability: the transform recorded the ordered field names it was fitted on
pub trait DeclaresInputNames {
    fn input_names(&self) -> &[String];
}

/// A fitted transform over a `rows x n_features` matrix
pub trait FeatureTransform: Send + Sync {
    /// Number of columns the transform was fitted on
    fn n_features(&self) -> usize;

    /// Transform a matrix, returning one of identical shape
    fn transform(&self, input: ArrayView2<'_, f64>) -> Result<Array2<f64>, AssemblyError>;

    /// Fitted input names, if the transform records them
    fn declared_names(&self) -> Option<&dyn DeclaresInputNames> {
        None
    }
}

fn check_width(expected: usize, input: &ArrayView2<'_, f64>) -> Result<(), AssemblyError> {
    if input.ncols() != expected {
        return Err(AssemblyError::TransformShapeError {
            expected,
            actual: input.ncols(),
        });
    }
    Ok(())
}

/// Pass-through transform of fixed width
#[derive(Debug, Clone, Copy)]
pub struct IdentityTransform {
    n_features: usize,
}

impl IdentityTransform {
    pub fn new(n_features: usize) -> Self {
        Self { n_features }
    }
}

impl FeatureTransform for IdentityTransform {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn transform(&self, input: ArrayView2<'_, f64>) -> Result<Array2<f64>, AssemblyError> {
        check_width(self.n_features, &input)?;
        Ok(input.to_owned())
    }
}

/// Standardization `(x - mean) / scale` with per-column parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default, rename = "feature_names_in", skip_serializing_if = "Option::is_none")]
    feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    /// Create a scaler from fitted parameters
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, AssemblyError> {
        let scaler = Self {
            mean,
            scale,
            feature_names: None,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Attach the field names the scaler was fitted on
    pub fn with_feature_names<I, S>(mut self, names: I) -> Result<Self, AssemblyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.feature_names = Some(
            names
                .into_iter()
                .map(|n| canonical_name(n.as_ref()).to_string())
                .collect(),
        );
        self.validate()?;
        Ok(self)
    }

    /// Check that parameters agree in length and are finite
    pub fn validate(&self) -> Result<(), AssemblyError> {
        if self.mean.len() != self.scale.len() {
            return Err(AssemblyError::InvalidTransform(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.mean.len() {
                return Err(AssemblyError::InvalidTransform(format!(
                    "{} feature names for {} fitted columns",
                    names.len(),
                    self.mean.len()
                )));
            }
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(AssemblyError::InvalidTransform(
                "non-finite scaler parameter".to_string(),
            ));
        }
        Ok(())
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }
}

impl DeclaresInputNames for StandardScaler {
    fn input_names(&self) -> &[String] {
        self.feature_names.as_deref().unwrap_or(&[])
    }
}

impl FeatureTransform for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, input: ArrayView2<'_, f64>) -> Result<Array2<f64>, AssemblyError> {
        check_width(self.mean.len(), &input)?;

        let mut output = input.to_owned();
        for mut row in output.rows_mut() {
            for (j, value) in row.iter_mut().enumerate() {
                // Zero variance columns are left centered but unscaled
                let scale = if self.scale[j] == 0.0 { 1.0 } else { self.scale[j] };
                *value = (*value - self.mean[j]) / scale;
            }
        }
        Ok(output)
    }

    fn declared_names(&self) -> Option<&dyn DeclaresInputNames> {
        self.feature_names
            .as_ref()
            .map(|_| self as &dyn DeclaresInputNames)
    }
}

/// Ordered fields that pass through a transform before placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalingSubset {
    fields: Vec<String>,
}

impl ScalingSubset {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|f| canonical_name(f.as_ref()).to_string())
                .collect(),
        }
    }

    /// `age, trestbps, chol, thalch, oldpeak`
    pub fn fallback() -> Self {
        Self::new(FALLBACK_SCALED_FIELDS)
    }

    /// Use the transform's declared input names, else the fallback subset
    pub fn discover(transform: &dyn FeatureTransform) -> Self {
        match transform.declared_names() {
            Some(declared) => Self::new(declared.input_names()),
            None => {
                debug!("Transform declares no input names, using fallback scaling subset");
                Self::fallback()
            }
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = canonical_name(name);
        self.fields.iter().any(|f| f == name)
    }
}
