//! Feature Engineering Engine
//!
//! Turns named clinical field records into the ordered numeric vector a
//! classifier expects, scaling a subset of fields in place when a fitted
//! transform is configured.

mod assembler;
mod error;
mod preset;
mod record;
mod schema;
mod transform;

pub use assembler::{AssembledVector, FeatureAssembler};
pub use error::AssemblyError;
pub use preset::Preset;
pub use record::{canonical_name, fields, FieldRecord, CLINICAL_FIELDS};
pub use schema::{SchemaDescriptor, SchemaField};
pub use transform::{
    DeclaresInputNames, FeatureTransform, IdentityTransform, ScalingSubset, StandardScaler,
    FALLBACK_SCALED_FIELDS,
};
