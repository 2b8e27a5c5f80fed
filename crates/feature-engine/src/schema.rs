//! Model Input Schemas

use crate::record::{canonical_name, fields, CLINICAL_FIELDS};
use crate::AssemblyError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One column of a model's input vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaField {
    /// Value read from the field record
    Named { name: String },
    /// Placeholder column with a fixed value, never read from the record
    Constant { name: String, value: f64 },
}

impl SchemaField {
    pub fn named(name: &str) -> Self {
        SchemaField::Named {
            name: canonical_name(name).to_string(),
        }
    }

    pub fn constant(name: &str, value: f64) -> Self {
        SchemaField::Constant {
            name: canonical_name(name).to_string(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SchemaField::Named { name } | SchemaField::Constant { name, .. } => name,
        }
    }
}

/// Ordered list of columns a model's input vector must contain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDescriptor {
    fields: Vec<SchemaField>,
}

impl SchemaDescriptor {
    /// Create a schema, rejecting duplicate column names
    pub fn new(fields: Vec<SchemaField>) -> Result<Self, AssemblyError> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(AssemblyError::DuplicateField(field.name().to_string()));
            }
        }
        Ok(Self { fields })
    }

    /// Create a schema of named columns only
    pub fn from_names<I, S>(names: I) -> Result<Self, AssemblyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            names
                .into_iter()
                .map(|n| SchemaField::named(n.as_ref()))
                .collect(),
        )
    }

    /// Build a schema from the input names a model was fitted on
    ///
    /// An `id` column becomes a constant 0 placeholder.
    pub fn from_declared_names<S: AsRef<str>>(names: &[S]) -> Result<Self, AssemblyError> {
        Self::new(
            names
                .iter()
                .map(|n| match n.as_ref() {
                    fields::ID => SchemaField::constant(fields::ID, 0.0),
                    other => SchemaField::named(other),
                })
                .collect(),
        )
    }

    /// The thirteen clinical fields in form order
    pub fn clinical() -> Self {
        Self {
            fields: CLINICAL_FIELDS.iter().map(|n| SchemaField::named(n)).collect(),
        }
    }

    /// The clinical fields preceded by a constant `id` column of 0
    pub fn clinical_with_id() -> Self {
        Self::clinical().with_id_placeholder()
    }

    /// Prepend a constant `id = 0` column unless one is already present
    pub fn with_id_placeholder(mut self) -> Self {
        if self.position(fields::ID).is_none() {
            self.fields.insert(0, SchemaField::constant(fields::ID, 0.0));
        }
        self
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column index of a field, resolving aliases
    pub fn position(&self, name: &str) -> Option<usize> {
        let name = canonical_name(name);
        self.fields.iter().position(|f| f.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(SchemaField::name).collect()
    }
}
