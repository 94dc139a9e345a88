pub mod engine;
pub mod error;
pub mod service;

pub use engine::{risk_score, RiskLevel, LOW_RISK_MIN, MAX_SCORE, MEDIUM_RISK_MIN};
pub use error::ScoringError;
pub use service::{Assessment, Explanation, FeatureAttribution, ScoringService, DEFAULT_TOP_K};
