use thiserror::Error;

pub type Result<T> = std::result::Result<T, PreprocessError>;

/// Batch-level failures of the preprocessing pipeline. Any of these halts the run.
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Schema error: expected column '{column}' is missing")]
    Schema { column: String },

    #[error("Empty result: no rows left after outlier filtering on {after}")]
    EmptyResult { after: String },

    #[error("Invalid input in column '{column}' at row {row}: {reason}")]
    InputValidation {
        column: String,
        row: usize,
        reason: String,
    },

    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<polars::error::PolarsError> for PreprocessError {
    fn from(err: polars::error::PolarsError) -> Self {
        PreprocessError::Data(err.to_string())
    }
}
