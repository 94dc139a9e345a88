//! Persisted classifier and explainer artifacts.

pub mod classifier;
pub mod error;
pub mod explainer;
pub mod loader;

pub use classifier::{Classifier, ClassifierArtifact, ModelClassifier};
pub use error::ArtifactLoadError;
pub use explainer::{Explainer, ExplainerArtifact, ModelExplainer};
pub use loader::{ArtifactPaths, Artifacts};

use std::collections::HashSet;

use crate::features::{FeatureSchema, FeatureVector};

pub fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

/// Map an artifact's feature names to schema positions. Every name must be
/// in the schema, and none may repeat.
fn bind_columns(
    artifact: &'static str,
    names: &[String],
    schema: &FeatureSchema,
) -> Result<Vec<usize>, ArtifactLoadError> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|name| {
            if !seen.insert(name.as_str()) {
                return Err(ArtifactLoadError::invalid(
                    artifact,
                    format!("feature '{}' listed twice", name),
                ));
            }
            schema.position(name).ok_or_else(|| {
                ArtifactLoadError::invalid(
                    artifact,
                    format!("feature '{}' is not in the feature list", name),
                )
            })
        })
        .collect()
}

/// Pick `columns` out of a schema row, in that order.
fn gather(row: &FeatureVector, columns: &[usize]) -> Result<Vec<f64>, String> {
    let values = row.values();
    columns
        .iter()
        .map(|&c| {
            values
                .get(c)
                .copied()
                .ok_or_else(|| format!("row has {} columns, model needs column {}", values.len(), c))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 1e-6);
    }

    #[test]
    fn test_bind_columns_rejects_repeats() {
        let schema = FeatureSchema::new(vec!["AGE".to_string()]).unwrap();
        let names = vec!["AGE".to_string(), "AGE".to_string()];
        assert!(bind_columns("classifier", &names, &schema).is_err());
    }
}
