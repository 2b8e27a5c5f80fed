use feature_engine::{
    AssemblyError, FeatureAssembler, FieldRecord, IdentityTransform, SchemaDescriptor,
    ScalingSubset, StandardScaler, CLINICAL_FIELDS, FALLBACK_SCALED_FIELDS,
};
use proptest::prelude::*;
use std::sync::Arc;

fn clinical_record() -> impl Strategy<Value = FieldRecord> {
    prop::collection::vec(-1000.0f64..1000.0, CLINICAL_FIELDS.len()).prop_map(|values| {
        CLINICAL_FIELDS
            .iter()
            .copied()
            .zip(values)
            .collect::<FieldRecord>()
    })
}

proptest! {
    #[test]
    fn vector_length_matches_schema(record in clinical_record(), with_id in any::<bool>()) {
        let schema = if with_id {
            SchemaDescriptor::clinical_with_id()
        } else {
            SchemaDescriptor::clinical()
        };
        let n = schema.len();
        let vector = FeatureAssembler::new(schema, n).assemble(&record).unwrap();
        prop_assert_eq!(vector.len(), n);
    }

    #[test]
    fn unscaled_vector_follows_schema_order(record in clinical_record()) {
        let vector = FeatureAssembler::new(SchemaDescriptor::clinical(), 13)
            .assemble(&record)
            .unwrap();
        for (i, name) in CLINICAL_FIELDS.iter().enumerate() {
            prop_assert_eq!(vector.values[i], record.get(name).unwrap());
        }
    }

    #[test]
    fn assembly_is_deterministic(record in clinical_record()) {
        let scaler = StandardScaler::new(vec![50.0; 5], vec![7.0; 5]).unwrap();
        let assembler = FeatureAssembler::new(SchemaDescriptor::clinical(), 13)
            .with_discovered_scaling(Arc::new(scaler))
            .unwrap();
        prop_assert_eq!(assembler.assemble(&record).unwrap(), assembler.assemble(&record).unwrap());
    }

    #[test]
    fn omitted_field_is_reported(record in clinical_record(), idx in 0usize..13) {
        let mut record = record;
        let name = CLINICAL_FIELDS[idx];
        record.remove(name);
        let result = FeatureAssembler::new(SchemaDescriptor::clinical(), 13).assemble(&record);
        prop_assert_eq!(result, Err(AssemblyError::MissingField(name.to_string())));
    }

    #[test]
    fn identity_scaling_keeps_raw_values(record in clinical_record()) {
        let schema = SchemaDescriptor::clinical();
        let assembler = FeatureAssembler::new(schema.clone(), 13)
            .with_scaling(Arc::new(IdentityTransform::new(5)), ScalingSubset::fallback())
            .unwrap();
        let vector = assembler.assemble(&record).unwrap();
        for name in FALLBACK_SCALED_FIELDS {
            let pos = schema.position(name).unwrap();
            prop_assert_eq!(vector.values[pos], record.get(name).unwrap());
        }
    }
}

#[test]
fn id_schema_rejected_before_reading_fields() {
    // Empty record: the dimensionality check fires before any field lookup
    let result = FeatureAssembler::new(SchemaDescriptor::clinical_with_id(), 13)
        .assemble(&FieldRecord::new());
    assert_eq!(
        result,
        Err(AssemblyError::SchemaMismatch {
            expected: 13,
            actual: 14
        })
    );
}
