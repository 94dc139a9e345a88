use serde::Deserialize;

use super::error::ArtifactLoadError;
use super::{bind_columns, gather, sigmoid};
use crate::features::{FeatureSchema, FeatureVector};
use crate::scoring::ScoringError;

const ARTIFACT: &str = "classifier";

/// Binary classifier over a schema-aligned row.
pub trait Classifier: Send + Sync {
    /// Probability of the positive (default) class.
    fn predict_proba(&self, row: &FeatureVector) -> Result<f64, ScoringError>;
}

/// On-disk classifier, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    Logistic(LogisticModel),
    GradientBoosted(GradientBoostedModel),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradientBoostedModel {
    pub feature_names: Vec<String>,
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

/// Flat node array; node 0 is the root.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

/// `feature` indexes the model's own `feature_names`. Rows go left when
/// `x <= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
    Leaf {
        leaf: f64,
        cover: f64,
    },
}

impl Node {
    pub fn cover(&self) -> f64 {
        match *self {
            Node::Split { cover, .. } | Node::Leaf { cover, .. } => cover,
        }
    }
}

impl ClassifierArtifact {
    pub fn feature_names(&self) -> &[String] {
        match self {
            Self::Logistic(m) => &m.feature_names,
            Self::GradientBoosted(m) => &m.feature_names,
        }
    }

    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        match self {
            Self::Logistic(m) => m.validate(),
            Self::GradientBoosted(m) => m.validate(),
        }
    }

    /// Raw log-odds for a row already gathered into model feature order.
    pub fn margin(&self, x: &[f64]) -> Result<f64, ScoringError> {
        match self {
            Self::Logistic(m) => Ok(m.margin(x)),
            Self::GradientBoosted(m) => m.margin(x),
        }
    }
}

impl LogisticModel {
    fn validate(&self) -> Result<(), ArtifactLoadError> {
        if self.coefficients.len() != self.feature_names.len() {
            return Err(ArtifactLoadError::invalid(
                ARTIFACT,
                format!(
                    "{} coefficients for {} features",
                    self.coefficients.len(),
                    self.feature_names.len()
                ),
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactLoadError::invalid(ARTIFACT, "non-finite parameter"));
        }
        Ok(())
    }

    fn margin(&self, x: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x)
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }
}

impl GradientBoostedModel {
    fn validate(&self) -> Result<(), ArtifactLoadError> {
        if !self.base_score.is_finite() {
            return Err(ArtifactLoadError::invalid(ARTIFACT, "non-finite base_score"));
        }
        if self.trees.is_empty() {
            return Err(ArtifactLoadError::invalid(ARTIFACT, "no trees"));
        }

        let n_features = self.feature_names.len();
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ArtifactLoadError::invalid(ARTIFACT, format!("tree {} is empty", t)));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                let bad = |reason: String| {
                    ArtifactLoadError::invalid(ARTIFACT, format!("tree {} node {}: {}", t, i, reason))
                };
                if !node.cover().is_finite() || node.cover() < 0.0 {
                    return Err(bad("cover must be a non-negative number".to_string()));
                }
                match *node {
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                        ..
                    } => {
                        if feature >= n_features {
                            return Err(bad(format!(
                                "feature index {} out of range ({} features)",
                                feature, n_features
                            )));
                        }
                        if !threshold.is_finite() {
                            return Err(bad("non-finite threshold".to_string()));
                        }
                        for child in [left, right] {
                            if child <= i || child >= tree.nodes.len() {
                                return Err(bad(format!("child index {} is dangling", child)));
                            }
                        }
                    }
                    Node::Leaf { leaf, .. } => {
                        if !leaf.is_finite() {
                            return Err(bad("non-finite leaf value".to_string()));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn margin(&self, x: &[f64]) -> Result<f64, ScoringError> {
        let mut margin = self.base_score;
        for tree in &self.trees {
            margin += tree.walk(x, |_, _, _| {})?;
        }
        Ok(margin)
    }
}

impl Tree {
    /// Follow `x` from the root to a leaf and return the leaf value.
    /// `visit(parent, child, feature)` is called for every split taken.
    pub fn walk<F>(&self, x: &[f64], mut visit: F) -> Result<f64, ScoringError>
    where
        F: FnMut(usize, usize, usize),
    {
        let mut idx = 0;
        loop {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| ScoringError::Prediction(format!("node {} out of range", idx)))?;
            match *node {
                Node::Leaf { leaf, .. } => return Ok(leaf),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = x.get(feature).copied().ok_or_else(|| {
                        ScoringError::Prediction(format!("feature {} missing from row", feature))
                    })?;
                    let next = if value <= threshold { left } else { right };
                    visit(idx, next, feature);
                    idx = next;
                }
            }
        }
    }
}

/// A validated classifier bound to the feature schema.
#[derive(Debug, Clone)]
pub struct ModelClassifier {
    artifact: ClassifierArtifact,
    columns: Vec<usize>,
}

impl ModelClassifier {
    pub fn bind(artifact: ClassifierArtifact, schema: &FeatureSchema) -> Result<Self, ArtifactLoadError> {
        artifact.validate()?;
        let columns = bind_columns(ARTIFACT, artifact.feature_names(), schema)?;
        Ok(Self { artifact, columns })
    }

    pub fn artifact(&self) -> &ClassifierArtifact {
        &self.artifact
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn margin(&self, row: &FeatureVector) -> Result<f64, ScoringError> {
        let x = gather(row, &self.columns).map_err(ScoringError::Prediction)?;
        self.artifact.margin(&x)
    }
}

impl Classifier for ModelClassifier {
    fn predict_proba(&self, row: &FeatureVector) -> Result<f64, ScoringError> {
        Ok(sigmoid(self.margin(row)?))
    }
}
