//! Clinical Field Validator

use crate::error::ValidationError;
use feature_engine::{canonical_name, fields, FieldRecord, CLINICAL_FIELDS};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Accepted integer codes for each categorical field
pub const CATEGORICAL_LEVELS: [(&str, &[f64]); 8] = [
    (fields::SEX, &[0.0, 1.0]),
    (fields::CP, &[0.0, 1.0, 2.0, 3.0]),
    (fields::FBS, &[0.0, 1.0]),
    (fields::RESTECG, &[0.0, 1.0, 2.0]),
    (fields::EXANG, &[0.0, 1.0]),
    (fields::SLOPE, &[0.0, 1.0, 2.0]),
    (fields::CA, &[0.0, 1.0, 2.0, 3.0]),
    (fields::THAL, &[0.0, 1.0, 2.0, 3.0]),
];

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Age valid range (years)
    pub age_range: (f64, f64),
    /// Resting blood pressure valid range (mm Hg)
    pub trestbps_range: (f64, f64),
    /// Serum cholesterol valid range (mg/dl)
    pub chol_range: (f64, f64),
    /// Maximum heart rate valid range (bpm)
    pub thalch_range: (f64, f64),
    /// ST depression valid range
    pub oldpeak_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            age_range: (1.0, 120.0),
            trestbps_range: (50.0, 250.0),
            chol_range: (100.0, 600.0),
            thalch_range: (60.0, 250.0),
            oldpeak_range: (0.0, 10.0),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }
}

/// Validator for clinical form records
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    fn continuous_ranges(&self) -> [(&'static str, (f64, f64)); 5] {
        [
            (fields::AGE, self.config.age_range),
            (fields::TRESTBPS, self.config.trestbps_range),
            (fields::CHOL, self.config.chol_range),
            (fields::THALCH, self.config.thalch_range),
            (fields::OLDPEAK, self.config.oldpeak_range),
        ]
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !(range.0..=range.1).contains(&value) {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate a categorical code against its accepted levels
    pub fn validate_level(
        &self,
        field: &'static str,
        value: f64,
        allowed: &'static [f64],
    ) -> Result<(), ValidationError> {
        if allowed.contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::NotInEnumeration {
                field,
                value,
                allowed,
            })
        }
    }

    /// Validate age
    pub fn validate_age(&self, age: f64) -> Result<(), ValidationError> {
        self.validate_range(fields::AGE, age, self.config.age_range)
    }

    /// Validate resting blood pressure
    pub fn validate_trestbps(&self, trestbps: f64) -> Result<(), ValidationError> {
        self.validate_range(fields::TRESTBPS, trestbps, self.config.trestbps_range)
    }

    /// Validate a whole record against all clinical fields
    pub fn validate(&self, record: &FieldRecord) -> ValidationResult {
        self.validate_for(record, &CLINICAL_FIELDS)
    }

    /// Validate a record, requiring only the fields in `required`
    ///
    /// Known fields that are present are range or level checked either way.
    /// Every violation is collected.
    pub fn validate_for<S: AsRef<str>>(
        &self,
        record: &FieldRecord,
        required: &[S],
    ) -> ValidationResult {
        let is_required = |field: &str| {
            required
                .iter()
                .any(|name| canonical_name(name.as_ref()) == field)
        };
        let mut errors = Vec::new();
        let mut checked = 0;

        for (field, range) in self.continuous_ranges() {
            match record.get(field) {
                Some(value) => {
                    checked += 1;
                    if let Err(e) = self.validate_range(field, value, range) {
                        errors.push(e);
                    }
                }
                None if is_required(field) => errors.push(ValidationError::MissingField(field)),
                None => {}
            }
        }

        for (field, allowed) in CATEGORICAL_LEVELS {
            match record.get(field) {
                Some(value) => {
                    checked += 1;
                    if let Err(e) = self.validate_level(field, value, allowed) {
                        errors.push(e);
                    }
                }
                None if is_required(field) => errors.push(ValidationError::MissingField(field)),
                None => {}
            }
        }

        if errors.is_empty() {
            ValidationResult::valid(checked)
        } else {
            debug!("Record failed validation with {} errors", errors.len());
            ValidationResult::invalid(errors, checked)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::Preset;
    use proptest::prelude::*;

    #[test]
    fn test_presets_are_valid() {
        let validator = Validator::default();
        for preset in [Preset::HighRisk, Preset::LowRisk] {
            let result = validator.validate(&preset.record().unwrap());
            assert!(result.valid, "{:?} failed: {:?}", preset, result.errors);
            assert_eq!(result.fields_checked, 13);
        }
    }

    #[test]
    fn test_age_range() {
        let validator = Validator::default();
        assert!(validator.validate_age(1.0).is_ok());
        assert!(validator.validate_age(120.0).is_ok());
        assert!(validator.validate_age(0.0).is_err());
        assert!(validator.validate_age(121.0).is_err());
        assert!(validator.validate_age(f64::NAN).is_err());
    }

    #[test]
    fn test_trestbps_range() {
        let validator = Validator::default();
        assert!(validator.validate_trestbps(120.0).is_ok());
        assert!(validator.validate_trestbps(40.0).is_err());
    }

    #[test]
    fn test_collects_all_violations() {
        let mut record = Preset::HighRisk.record().unwrap();
        record.insert("chol", 50.0);
        record.insert("cp", 4.0);
        record.remove("thal");

        let result = Validator::default().validate(&record);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 3);
        assert!(result
            .errors
            .contains(&ValidationError::MissingField("thal")));
        assert!(result.errors.iter().any(|e| matches!(
            e,
            ValidationError::NotInEnumeration { field: "cp", .. }
        )));
        assert!(result.errors.iter().any(|e| matches!(
            e,
            ValidationError::OutOfRange { field: "chol", .. }
        )));
    }

    #[test]
    fn test_fractional_category_rejected() {
        let mut record = Preset::LowRisk.record().unwrap();
        record.insert("slope", 1.5);
        assert!(!Validator::default().validate(&record).valid);
    }

    #[test]
    fn test_required_fields_follow_schema() {
        let record = FieldRecord::new()
            .with("age", 54.0)
            .with("thalach", 150.0)
            .with("sex", 1.0);
        let validator = Validator::default();

        let result = validator.validate_for(&record, &["age", "thalach", "sex"]);
        assert!(result.valid, "{:?}", result.errors);
        assert_eq!(result.fields_checked, 3);

        let result = validator.validate_for(&record, &["age", "chol"]);
        assert_eq!(result.errors, vec![ValidationError::MissingField("chol")]);

        // Present fields are still checked when not required
        let record = record.with("cp", 7.0);
        let result = validator.validate_for(&record, &["age"]);
        assert!(!result.valid);
    }

    proptest! {
        #[test]
        fn in_range_oldpeak_accepted(oldpeak in 0.0f64..=10.0) {
            let mut record = Preset::LowRisk.record().unwrap();
            record.insert("oldpeak", oldpeak);
            prop_assert!(Validator::default().validate(&record).valid);
        }
    }
}
