//! Clinical Field Records

use crate::AssemblyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field names used by the clinical form
pub mod fields {
    pub const ID: &str = "id";
    pub const AGE: &str = "age";
    pub const SEX: &str = "sex";
    /// Chest pain type
    pub const CP: &str = "cp";
    /// Resting blood pressure
    pub const TRESTBPS: &str = "trestbps";
    /// Serum cholesterol
    pub const CHOL: &str = "chol";
    /// Fasting blood sugar > 120 mg/dl
    pub const FBS: &str = "fbs";
    /// Resting ECG result
    pub const RESTECG: &str = "restecg";
    /// Maximum heart rate achieved
    pub const THALCH: &str = "thalch";
    /// Alternate spelling of [`THALCH`]
    pub const THALACH: &str = "thalach";
    /// Exercise induced angina
    pub const EXANG: &str = "exang";
    /// ST depression induced by exercise
    pub const OLDPEAK: &str = "oldpeak";
    pub const SLOPE: &str = "slope";
    /// Number of major vessels
    pub const CA: &str = "ca";
    pub const THAL: &str = "thal";
}

/// The thirteen clinical fields in form order
pub const CLINICAL_FIELDS: [&str; 13] = [
    fields::AGE,
    fields::SEX,
    fields::CP,
    fields::TRESTBPS,
    fields::CHOL,
    fields::FBS,
    fields::RESTECG,
    fields::THALCH,
    fields::EXANG,
    fields::OLDPEAK,
    fields::SLOPE,
    fields::CA,
    fields::THAL,
];

/// Resolve alternate spellings to the name used internally
pub fn canonical_name(name: &str) -> &str {
    match name {
        fields::THALACH => fields::THALCH,
        other => other,
    }
}

/// Named clinical measurements for one patient query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct FieldRecord {
    values: BTreeMap<String, f64>,
}

impl FieldRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, returning the previous value
    pub fn insert(&mut self, name: &str, value: f64) -> Option<f64> {
        self.values.insert(canonical_name(name).to_string(), value)
    }

    /// Get a field by name or alias
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(canonical_name(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(canonical_name(name))
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(canonical_name(name))
    }

    /// Overlay every field of `other` onto this record
    pub fn merge(&mut self, other: &FieldRecord) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Read a field that must be present and finite
    pub fn require(&self, name: &str) -> Result<f64, AssemblyError> {
        let value = self
            .get(name)
            .ok_or_else(|| AssemblyError::MissingField(canonical_name(name).to_string()))?;
        if !value.is_finite() {
            return Err(AssemblyError::NonFiniteValue(canonical_name(name).to_string()));
        }
        Ok(value)
    }
}

impl From<BTreeMap<String, f64>> for FieldRecord {
    fn from(map: BTreeMap<String, f64>) -> Self {
        map.into_iter().collect()
    }
}

impl From<FieldRecord> for BTreeMap<String, f64> {
    fn from(record: FieldRecord) -> Self {
        record.values
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for FieldRecord {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut record = FieldRecord::new();
        for (name, value) in iter {
            record.insert(name.as_ref(), value);
        }
        record
    }
}
