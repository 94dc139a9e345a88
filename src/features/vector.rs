use serde::Serialize;
use std::sync::Arc;

use super::schema::FeatureSchema;
use crate::scoring::ScoringError;

/// A single dense row aligned to a `FeatureSchema`.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    schema: Arc<FeatureSchema>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// A row with every schema field set to zero.
    pub fn zeros(schema: Arc<FeatureSchema>) -> Self {
        let values = vec![0.0; schema.len()];
        Self { schema, values }
    }

    /// Overwrite one field by exact-case name. Unknown names are an error,
    /// never silently dropped.
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), ScoringError> {
        let pos = self
            .schema
            .position(name)
            .ok_or_else(|| ScoringError::SchemaMismatch {
                field: name.to_string(),
            })?;
        self.values[pos] = value;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|pos| self.values[pos])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Fields holding a non-zero value, in schema order.
    pub fn non_zero(&self) -> Vec<(&str, f64)> {
        self.iter().filter(|(_, v)| *v != 0.0).collect()
    }
}

/// Serialized as a `name -> value` map of the non-zero fields only.
impl Serialize for FeatureVector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let non_zero = self.non_zero();
        let mut map = serializer.serialize_map(Some(non_zero.len()))?;
        for (name, value) in non_zero {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}
