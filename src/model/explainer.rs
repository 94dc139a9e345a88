use serde::Deserialize;

use super::bind_columns;
use super::classifier::{ClassifierArtifact, GradientBoostedModel, ModelClassifier, Node, Tree};
use super::error::ArtifactLoadError;
use super::gather;
use crate::features::{FeatureSchema, FeatureVector};
use crate::scoring::ScoringError;

const ARTIFACT: &str = "explainer";

/// Additive per-feature attribution in log-odds.
pub trait Explainer: Send + Sync {
    /// Model output for the baseline population.
    fn expected_value(&self) -> f64;

    /// One contribution per schema field, in schema order.
    fn contributions(&self, row: &FeatureVector) -> Result<Vec<f64>, ScoringError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExplainerArtifact {
    Linear(LinearExplainerArtifact),
    /// Path attribution over the loaded gradient-boosted classifier.
    TreePath,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinearExplainerArtifact {
    pub expected_value: f64,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub means: Vec<f64>,
}

#[derive(Debug, Clone)]
pub enum ModelExplainer {
    Linear(LinearExplainer),
    TreePath(TreePathExplainer),
}

impl ModelExplainer {
    pub fn bind(
        artifact: ExplainerArtifact,
        schema: &FeatureSchema,
        classifier: &ModelClassifier,
    ) -> Result<Self, ArtifactLoadError> {
        match artifact {
            ExplainerArtifact::Linear(a) => LinearExplainer::bind(a, schema).map(Self::Linear),
            ExplainerArtifact::TreePath => match classifier.artifact() {
                ClassifierArtifact::GradientBoosted(model) => Ok(Self::TreePath(TreePathExplainer::new(
                    model.clone(),
                    classifier.columns().to_vec(),
                    schema.len(),
                ))),
                ClassifierArtifact::Logistic(_) => Err(ArtifactLoadError::invalid(
                    ARTIFACT,
                    "tree_path attribution requires a gradient_boosted classifier",
                )),
            },
        }
    }
}

impl Explainer for ModelExplainer {
    fn expected_value(&self) -> f64 {
        match self {
            Self::Linear(e) => e.expected_value(),
            Self::TreePath(e) => e.expected_value(),
        }
    }

    fn contributions(&self, row: &FeatureVector) -> Result<Vec<f64>, ScoringError> {
        match self {
            Self::Linear(e) => e.contributions(row),
            Self::TreePath(e) => e.contributions(row),
        }
    }
}

/// `coef * (x - mean)` per known field.
#[derive(Debug, Clone)]
pub struct LinearExplainer {
    expected_value: f64,
    /// `(schema position, coefficient, mean)`
    terms: Vec<(usize, f64, f64)>,
    width: usize,
}

impl LinearExplainer {
    fn bind(artifact: LinearExplainerArtifact, schema: &FeatureSchema) -> Result<Self, ArtifactLoadError> {
        let n = artifact.feature_names.len();
        if artifact.coefficients.len() != n || artifact.means.len() != n {
            return Err(ArtifactLoadError::invalid(
                ARTIFACT,
                format!(
                    "{} features, {} coefficients, {} means",
                    n,
                    artifact.coefficients.len(),
                    artifact.means.len()
                ),
            ));
        }
        if !artifact.expected_value.is_finite() {
            return Err(ArtifactLoadError::invalid(ARTIFACT, "non-finite expected_value"));
        }

        let columns = bind_columns(ARTIFACT, &artifact.feature_names, schema)?;
        let terms = columns
            .into_iter()
            .zip(artifact.coefficients)
            .zip(artifact.means)
            .map(|((pos, coef), mean)| (pos, coef, mean))
            .collect();

        Ok(Self {
            expected_value: artifact.expected_value,
            terms,
            width: schema.len(),
        })
    }

    fn expected_value(&self) -> f64 {
        self.expected_value
    }

    fn contributions(&self, row: &FeatureVector) -> Result<Vec<f64>, ScoringError> {
        let values = row.values();
        let mut out = vec![0.0; self.width];
        for &(pos, coef, mean) in &self.terms {
            let x = values
                .get(pos)
                .ok_or_else(|| ScoringError::Attribution(format!("row has no column {}", pos)))?;
            out[pos] = coef * (x - mean);
        }
        Ok(out)
    }
}

/// Path attribution: every split on the decision path credits its feature
/// with `E[child] - E[node]`, where node expectations are cover-weighted
/// averages of their leaves.
#[derive(Debug, Clone)]
pub struct TreePathExplainer {
    model: GradientBoostedModel,
    columns: Vec<usize>,
    width: usize,
    expectations: Vec<Vec<f64>>,
    expected_value: f64,
}

impl TreePathExplainer {
    pub fn new(model: GradientBoostedModel, columns: Vec<usize>, width: usize) -> Self {
        let expectations: Vec<Vec<f64>> = model.trees.iter().map(node_expectations).collect();
        let expected_value =
            model.base_score + expectations.iter().map(|e| e.first().copied().unwrap_or(0.0)).sum::<f64>();
        Self {
            model,
            columns,
            width,
            expectations,
            expected_value,
        }
    }

    fn expected_value(&self) -> f64 {
        self.expected_value
    }

    fn contributions(&self, row: &FeatureVector) -> Result<Vec<f64>, ScoringError> {
        let x = gather(row, &self.columns).map_err(ScoringError::Attribution)?;
        let mut out = vec![0.0; self.width];

        for (tree, expect) in self.model.trees.iter().zip(&self.expectations) {
            let mut path_err = None;
            tree.walk(&x, |parent, child, feature| {
                let delta = expect[child] - expect[parent];
                match self.columns.get(feature) {
                    Some(&pos) if pos < out.len() => out[pos] += delta,
                    _ => path_err = Some(feature),
                }
            })
            .map_err(|e| ScoringError::Attribution(e.to_string()))?;

            if let Some(feature) = path_err {
                return Err(ScoringError::Attribution(format!(
                    "split feature {} has no schema column",
                    feature
                )));
            }
        }

        Ok(out)
    }
}

/// Expected leaf value under each node, weighting children by cover.
/// Children always follow their parent, so one reverse pass suffices.
fn node_expectations(tree: &Tree) -> Vec<f64> {
    let mut expect = vec![0.0; tree.nodes.len()];
    for (i, node) in tree.nodes.iter().enumerate().rev() {
        expect[i] = match *node {
            Node::Leaf { leaf, .. } => leaf,
            Node::Split { left, right, .. } => {
                let cl = tree.nodes[left].cover();
                let cr = tree.nodes[right].cover();
                if cl + cr > 0.0 {
                    (cl * expect[left] + cr * expect[right]) / (cl + cr)
                } else {
                    (expect[left] + expect[right]) / 2.0
                }
            }
        };
    }
    expect
}
