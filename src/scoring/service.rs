use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::engine::{risk_score, RiskLevel};
use super::error::ScoringError;
use crate::applicant::{build_feature_vector, ApplicantInput};
use crate::features::{FeatureSchema, FeatureVector};
use crate::model::Artifacts;

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureAttribution {
    pub feature: String,
    pub value: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub expected_value: f64,
    /// Largest absolute contributions first.
    pub top: Vec<FeatureAttribution>,
}

#[derive(Debug, Clone)]
pub struct Assessment {
    pub applicant: ApplicantInput,
    pub features: FeatureVector,
    pub probability: f64,
    pub score: u32,
    pub level: RiskLevel,
    pub narrative: &'static str,
    /// Attribution fails on its own without taking the score with it.
    pub explanation: Result<Explanation, ScoringError>,
    pub assessed_at: DateTime<Utc>,
}

/// Scores applicants against the loaded artifacts. Holds no per-request
/// state, so one instance can serve any number of callers.
#[derive(Debug)]
pub struct ScoringService {
    artifacts: Artifacts,
    top_k: usize,
}

impl ScoringService {
    pub fn new(artifacts: Artifacts, top_k: usize) -> Self {
        Self { artifacts, top_k }
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.artifacts.schema
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Probability of default for one row.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, ScoringError> {
        let p = self.artifacts.classifier.predict_proba(features)?;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(ScoringError::Prediction(format!("classifier returned {}", p)));
        }
        Ok(p)
    }

    /// Rank every schema field by absolute contribution and keep the top K.
    pub fn explain(&self, features: &FeatureVector) -> Result<Explanation, ScoringError> {
        let explainer = &self.artifacts.explainer;
        let contributions = explainer.contributions(features)?;

        if contributions.len() != features.values().len() {
            return Err(ScoringError::Attribution(format!(
                "{} contributions for {} features",
                contributions.len(),
                features.values().len()
            )));
        }
        if let Some(pos) = contributions.iter().position(|c| !c.is_finite()) {
            return Err(ScoringError::Attribution(format!(
                "non-finite contribution for '{}'",
                features.schema().names()[pos]
            )));
        }

        let mut ranked: Vec<FeatureAttribution> = features
            .iter()
            .zip(contributions)
            .map(|((name, value), contribution)| FeatureAttribution {
                feature: name.to_string(),
                value,
                contribution,
            })
            .collect();
        // stable: equal magnitudes keep schema order
        ranked.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
        ranked.truncate(self.top_k);

        Ok(Explanation {
            expected_value: explainer.expected_value(),
            top: ranked,
        })
    }

    /// Map, predict, bucket and explain one applicant.
    pub fn assess(&self, applicant: &ApplicantInput) -> Result<Assessment, ScoringError> {
        let features = build_feature_vector(applicant, self.schema())?;
        let probability = self.predict(&features)?;
        let score = risk_score(probability)?;
        let level = RiskLevel::from_score(score);

        let explanation = self.explain(&features);
        if let Err(ref e) = explanation {
            warn!(error = %e, "Attribution failed");
        }

        debug!(score, level = %level, probability, "Applicant assessed");

        Ok(Assessment {
            applicant: *applicant,
            features,
            probability,
            score,
            level,
            narrative: level.narrative(),
            explanation,
            assessed_at: Utc::now(),
        })
    }
}
