use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::classifier::{ClassifierArtifact, ModelClassifier};
use super::error::ArtifactLoadError;
use super::explainer::{ExplainerArtifact, ModelExplainer};
use super::{Classifier, Explainer};
use crate::features::FeatureSchema;

/// Locations of the three artifact files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub features: PathBuf,
    pub classifier: PathBuf,
    pub explainer: PathBuf,
}

/// Everything the scoring service needs, loaded once and immutable after.
pub struct Artifacts {
    pub schema: Arc<FeatureSchema>,
    pub classifier: Box<dyn Classifier>,
    pub explainer: Box<dyn Explainer>,
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("features", &self.schema.len())
            .finish_non_exhaustive()
    }
}

impl Artifacts {
    pub fn new(
        schema: Arc<FeatureSchema>,
        classifier: Box<dyn Classifier>,
        explainer: Box<dyn Explainer>,
    ) -> Self {
        Self {
            schema,
            classifier,
            explainer,
        }
    }

    /// Load and cross-check the feature list, classifier and explainer.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        info!(path = %paths.features.display(), "Loading feature list");
        let schema = Arc::new(FeatureSchema::load(&paths.features).map_err(ArtifactLoadError::Features)?);

        info!(path = %paths.classifier.display(), "Loading classifier");
        let artifact: ClassifierArtifact = read_json(&paths.classifier)?;
        let classifier = ModelClassifier::bind(artifact, &schema)?;

        info!(path = %paths.explainer.display(), "Loading explainer");
        let artifact: ExplainerArtifact = read_json(&paths.explainer)?;
        let explainer = ModelExplainer::bind(artifact, &schema, &classifier)?;

        info!(
            features = schema.len(),
            classifier_features = classifier.columns().len(),
            "Artifacts loaded"
        );

        Ok(Self::new(schema, Box::new(classifier), Box::new(explainer)))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let content = fs::read_to_string(path).map_err(|source| ArtifactLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
