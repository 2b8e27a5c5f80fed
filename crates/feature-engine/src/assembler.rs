//! Feature Vector Assembly

use crate::record::{canonical_name, FieldRecord};
use crate::schema::{SchemaDescriptor, SchemaField};
use crate::transform::{FeatureTransform, ScalingSubset};
use crate::AssemblyError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Ordered model input, one value per schema column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledVector {
    /// Values in schema order
    pub values: Vec<f64>,
}

impl AssembledVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Transform plus the schema columns its outputs are written back to
struct Scaling {
    subset: ScalingSubset,
    transform: Arc<dyn FeatureTransform>,
    positions: Vec<usize>,
}

impl Scaling {
    /// Extract the subset in subset order, transform it, and pair results with columns
    fn apply(
        &self,
        schema: &SchemaDescriptor,
        record: &FieldRecord,
    ) -> Result<Vec<(usize, f64)>, AssemblyError> {
        let width = self.subset.len();
        let mut raw = Vec::with_capacity(width);
        for &pos in &self.positions {
            raw.push(column_value(&schema.fields()[pos], record)?);
        }

        let input = Array2::from_shape_vec((1, width), raw).map_err(|_| {
            AssemblyError::TransformShapeError {
                expected: self.transform.n_features(),
                actual: width,
            }
        })?;
        let output = self.transform.transform(input.view())?;
        if output.nrows() != 1 {
            return Err(AssemblyError::InvalidTransform(format!(
                "returned {} rows for a single record",
                output.nrows()
            )));
        }
        if output.ncols() != width {
            return Err(AssemblyError::TransformShapeError {
                expected: width,
                actual: output.ncols(),
            });
        }

        let mut scaled = Vec::with_capacity(width);
        for ((&pos, name), &value) in self
            .positions
            .iter()
            .zip(self.subset.fields())
            .zip(output.row(0).iter())
        {
            if !value.is_finite() {
                return Err(AssemblyError::NonFiniteValue(name.clone()));
            }
            scaled.push((pos, value));
        }
        Ok(scaled)
    }
}

fn column_value(field: &SchemaField, record: &FieldRecord) -> Result<f64, AssemblyError> {
    match field {
        SchemaField::Named { name } => record.require(name),
        SchemaField::Constant { value, .. } => Ok(*value),
    }
}

/// Builds model input vectors from field records
///
/// Scaled fields are substituted at their schema positions rather than
/// appended, so the output order always follows the schema.
pub struct FeatureAssembler {
    schema: SchemaDescriptor,
    expected_dimension: usize,
    scaling: Option<Scaling>,
}

impl FeatureAssembler {
    /// Create an assembler for a model expecting `expected_dimension` inputs
    pub fn new(schema: SchemaDescriptor, expected_dimension: usize) -> Self {
        info!(
            "Creating feature assembler: schema={} fields, model expects {}",
            schema.len(),
            expected_dimension
        );
        Self {
            schema,
            expected_dimension,
            scaling: None,
        }
    }

    /// Scale `subset` through `transform` before placement
    pub fn with_scaling(
        mut self,
        transform: Arc<dyn FeatureTransform>,
        subset: ScalingSubset,
    ) -> Result<Self, AssemblyError> {
        self.set_scaling(transform, subset)?;
        Ok(self)
    }

    /// Configure scaling in place, leaving the assembler unchanged on error
    pub fn set_scaling(
        &mut self,
        transform: Arc<dyn FeatureTransform>,
        subset: ScalingSubset,
    ) -> Result<(), AssemblyError> {
        if subset.len() != transform.n_features() {
            return Err(AssemblyError::TransformShapeError {
                expected: transform.n_features(),
                actual: subset.len(),
            });
        }

        // Each column must meet the mean and scale it was fitted with
        if let Some(declared) = transform.declared_names() {
            let fitted: Vec<&str> = declared
                .input_names()
                .iter()
                .map(|n| canonical_name(n))
                .collect();
            if !fitted.is_empty() && fitted != subset.fields() {
                return Err(AssemblyError::ScalingOrderMismatch {
                    fitted: fitted.join(", "),
                    subset: subset.fields().join(", "),
                });
            }
        }

        let positions = subset
            .fields()
            .iter()
            .map(|name| {
                self.schema
                    .position(name)
                    .ok_or_else(|| AssemblyError::ScaledFieldOutsideSchema(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Scaling subset {:?} at columns {:?}", subset.fields(), positions);
        self.scaling = Some(Scaling {
            subset,
            transform,
            positions,
        });
        Ok(())
    }

    /// Scale the subset the transform declares, or the fallback subset
    pub fn with_discovered_scaling(
        self,
        transform: Arc<dyn FeatureTransform>,
    ) -> Result<Self, AssemblyError> {
        let subset = ScalingSubset::discover(transform.as_ref());
        self.with_scaling(transform, subset)
    }

    /// Fail if the schema cannot produce a vector of the expected width
    pub fn check_schema(&self) -> Result<(), AssemblyError> {
        if self.schema.len() != self.expected_dimension {
            return Err(AssemblyError::SchemaMismatch {
                expected: self.expected_dimension,
                actual: self.schema.len(),
            });
        }
        Ok(())
    }

    /// Assemble one record into a model input vector
    pub fn assemble(&self, record: &FieldRecord) -> Result<AssembledVector, AssemblyError> {
        self.check_schema()?;

        let mut slots: Vec<Option<f64>> = vec![None; self.schema.len()];
        if let Some(scaling) = &self.scaling {
            for (pos, value) in scaling.apply(&self.schema, record)? {
                slots[pos] = Some(value);
            }
        }

        let mut values = Vec::with_capacity(self.schema.len());
        for (field, slot) in self.schema.fields().iter().zip(slots) {
            let value = match slot {
                Some(scaled) => scaled,
                None => column_value(field, record)?,
            };
            values.push(value);
        }

        if values.len() != self.expected_dimension {
            return Err(AssemblyError::SchemaMismatch {
                expected: self.expected_dimension,
                actual: values.len(),
            });
        }

        debug!("Assembled vector of {} features", values.len());
        Ok(AssembledVector { values })
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    pub fn expected_dimension(&self) -> usize {
        self.expected_dimension
    }

    /// Fields passed through the transform, if scaling is configured
    pub fn scaling_subset(&self) -> Option<&ScalingSubset> {
        self.scaling.as_ref().map(|s| &s.subset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{IdentityTransform, StandardScaler};
    use crate::Preset;
    use ndarray::ArrayView2;

    /// Drops the last column
    struct NarrowTransform(usize);

    impl FeatureTransform for NarrowTransform {
        fn n_features(&self) -> usize {
            self.0
        }

        fn transform(&self, input: ArrayView2<'_, f64>) -> Result<Array2<f64>, AssemblyError> {
            Ok(input.slice(ndarray::s![.., ..self.0 - 1]).to_owned())
        }
    }

    /// Emits one copy of the input per column, so the row count is wrong
    struct TallTransform(usize);

    impl FeatureTransform for TallTransform {
        fn n_features(&self) -> usize {
            self.0
        }

        fn transform(&self, input: ArrayView2<'_, f64>) -> Result<Array2<f64>, AssemblyError> {
            Ok(Array2::from_shape_fn((2, self.0), |(_, j)| input[[0, j]]))
        }
    }

    /// Divides by zero on its second column
    struct NanTransform(usize);

    impl FeatureTransform for NanTransform {
        fn n_features(&self) -> usize {
            self.0
        }

        fn transform(&self, input: ArrayView2<'_, f64>) -> Result<Array2<f64>, AssemblyError> {
            let mut output = input.to_owned();
            output[[0, 1]] = f64::NAN;
            Ok(output)
        }
    }

    fn high_risk() -> FieldRecord {
        Preset::HighRisk.record().unwrap()
    }

    #[test]
    fn test_unscaled_example_record() {
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical(), 13);
        let vector = assembler.assemble(&high_risk()).unwrap();
        assert_eq!(
            vector.values,
            vec![65.0, 1.0, 3.0, 180.0, 300.0, 1.0, 1.0, 100.0, 1.0, 4.0, 2.0, 3.0, 2.0]
        );
    }

    #[test]
    fn test_id_placeholder_is_constant_zero() {
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical_with_id(), 14);
        let vector = assembler.assemble(&high_risk()).unwrap();
        assert_eq!(vector.len(), 14);
        assert_eq!(vector.values[0], 0.0);
        assert_eq!(vector.values[1], 65.0);
    }

    #[test]
    fn test_schema_mismatch_with_id_against_13() {
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical_with_id(), 13);
        assert_eq!(
            assembler.assemble(&high_risk()),
            Err(AssemblyError::SchemaMismatch {
                expected: 13,
                actual: 14
            })
        );
    }

    #[test]
    fn test_missing_field_is_error() {
        let mut record = high_risk();
        record.remove("ca");
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical(), 13);
        assert_eq!(
            assembler.assemble(&record),
            Err(AssemblyError::MissingField("ca".to_string()))
        );
    }

    #[test]
    fn test_missing_scaled_field_is_error() {
        let mut record = high_risk();
        record.remove("chol");
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical(), 13)
            .with_scaling(Arc::new(IdentityTransform::new(5)), ScalingSubset::fallback())
            .unwrap();
        assert_eq!(
            assembler.assemble(&record),
            Err(AssemblyError::MissingField("chol".to_string()))
        );
    }

    #[test]
    fn test_identity_scaling_preserves_raw_values() {
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical(), 13)
            .with_scaling(Arc::new(IdentityTransform::new(5)), ScalingSubset::fallback())
            .unwrap();
        let unscaled = FeatureAssembler::new(SchemaDescriptor::clinical(), 13);
        assert_eq!(
            assembler.assemble(&high_risk()).unwrap(),
            unscaled.assemble(&high_risk()).unwrap()
        );
    }

    #[test]
    fn test_scaled_fields_keep_schema_positions() {
        // Subset order differs from schema order
        let scaler = StandardScaler::new(vec![100.0, 50.0], vec![10.0, 5.0])
            .unwrap()
            .with_feature_names(["chol", "age"])
            .unwrap();
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical_with_id(), 14)
            .with_discovered_scaling(Arc::new(scaler))
            .unwrap();

        let vector = assembler.assemble(&high_risk()).unwrap();
        assert_eq!(vector.values[0], 0.0); // id
        assert!((vector.values[1] - 3.0).abs() < 1e-12); // age (65 - 50) / 5
        assert_eq!(vector.values[2], 1.0); // sex
        assert_eq!(vector.values[4], 180.0); // trestbps untouched
        assert!((vector.values[5] - 20.0).abs() < 1e-12); // chol (300 - 100) / 10
        assert_eq!(vector.values[13], 2.0); // thal
    }

    #[test]
    fn test_subset_width_must_match_transform() {
        let result = FeatureAssembler::new(SchemaDescriptor::clinical(), 13).with_scaling(
            Arc::new(IdentityTransform::new(4)),
            ScalingSubset::fallback(),
        );
        assert!(matches!(
            result,
            Err(AssemblyError::TransformShapeError {
                expected: 4,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_scaled_field_outside_schema() {
        let schema = SchemaDescriptor::from_names(["age", "sex"]).unwrap();
        let result = FeatureAssembler::new(schema, 2).with_scaling(
            Arc::new(IdentityTransform::new(2)),
            ScalingSubset::new(["age", "chol"]),
        );
        assert!(matches!(
            result,
            Err(AssemblyError::ScaledFieldOutsideSchema(name)) if name == "chol"
        ));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let scaler = StandardScaler::new(
            vec![54.0, 131.0, 246.0, 150.0, 1.0],
            vec![9.0, 17.5, 51.0, 23.0, 1.2],
        )
        .unwrap();
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical(), 13)
            .with_discovered_scaling(Arc::new(scaler))
            .unwrap();
        let first = assembler.assemble(&high_risk()).unwrap();
        let second = assembler.assemble(&high_risk()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_transform_output_width_checked() {
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical(), 13)
            .with_scaling(Arc::new(NarrowTransform(5)), ScalingSubset::fallback())
            .unwrap();
        assert_eq!(
            assembler.assemble(&high_risk()),
            Err(AssemblyError::TransformShapeError {
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn test_transform_output_rows_checked() {
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical(), 13)
            .with_scaling(Arc::new(TallTransform(5)), ScalingSubset::fallback())
            .unwrap();
        match assembler.assemble(&high_risk()) {
            Err(AssemblyError::InvalidTransform(message)) => assert!(message.contains("2 rows")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_transform_output() {
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical(), 13)
            .with_scaling(Arc::new(NanTransform(5)), ScalingSubset::fallback())
            .unwrap();
        // Second fallback field is trestbps
        assert_eq!(
            assembler.assemble(&high_risk()),
            Err(AssemblyError::NonFiniteValue("trestbps".to_string()))
        );
    }

    #[test]
    fn test_subset_must_follow_fitted_order() {
        let scaler = StandardScaler::new(vec![100.0, 50.0], vec![10.0, 5.0])
            .unwrap()
            .with_feature_names(["chol", "age"])
            .unwrap();
        let result = FeatureAssembler::new(SchemaDescriptor::clinical(), 13)
            .with_scaling(Arc::new(scaler.clone()), ScalingSubset::new(["age", "chol"]));
        assert!(matches!(
            result,
            Err(AssemblyError::ScalingOrderMismatch { fitted, subset })
                if fitted == "chol, age" && subset == "age, chol"
        ));

        // Fitted order is accepted and scales each column with its own parameters
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical(), 13)
            .with_scaling(Arc::new(scaler), ScalingSubset::new(["chol", "age"]))
            .unwrap();
        let vector = assembler.assemble(&high_risk()).unwrap();
        assert!((vector.values[0] - 3.0).abs() < 1e-12);
        assert!((vector.values[4] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_failed_scaling_leaves_assembler_unscaled() {
        let mut assembler = FeatureAssembler::new(SchemaDescriptor::clinical(), 13);
        assert!(assembler
            .set_scaling(Arc::new(IdentityTransform::new(4)), ScalingSubset::fallback())
            .is_err());
        assert!(assembler.scaling_subset().is_none());
    }
}
