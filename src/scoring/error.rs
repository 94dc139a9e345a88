use thiserror::Error;

/// Per-request failure. None of these are fatal to the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("feature '{field}' is not in the model's feature list")]
    SchemaMismatch { field: String },

    #[error("invalid applicant input: {}", .0.join("; "))]
    InvalidInput(Vec<String>),

    #[error("prediction failed: {0}")]
    Prediction(String),

    #[error("explanation unavailable: {0}")]
    Attribution(String),
}
