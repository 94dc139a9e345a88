use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::ArtifactPaths;
use crate::scoring::DEFAULT_TOP_K;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub explanation: ExplanationConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Where the persisted model files live. File names are relative to `dir`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
    pub classifier: String,
    pub explainer: String,
    pub features: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            classifier: "classifier.json".to_string(),
            explainer: "explainer.json".to_string(),
            features: "features.json".to_string(),
        }
    }
}

impl ArtifactsConfig {
    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            features: self.dir.join(&self.features),
            classifier: self.dir.join(&self.classifier),
            explainer: self.dir.join(&self.explainer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplanationConfig {
    /// Number of attributions shown, largest magnitude first.
    pub top_k: usize,
}

impl Default for ExplanationConfig {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub tick_rate_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 250 }
    }
}
