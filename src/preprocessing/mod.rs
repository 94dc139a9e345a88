//! Offline cleaning and feature engineering for the tabular credit dataset.
//!
//! Stages run in a fixed order: IQR outlier removal on `LIMIT_BAL`, then on
//! `AGE` (each pass sees the output of the previous one), the `log_limit_bal`
//! transform, then per-row aggregates over the monthly series.

pub mod aggregates;
pub mod error;
pub mod io;
pub mod outliers;
pub mod transforms;

pub use aggregates::{engineer_features, engineered_columns, SeriesAggregate, Statistic};
pub use error::{PreprocessError, Result};
pub use io::{read_csv, write_csv};
pub use outliers::{remove_outliers_iqr, IqrBounds};
pub use transforms::add_log1p_column;

use polars::prelude::*;
use std::time::{Duration, Instant};

pub const LIMIT_BAL: &str = "LIMIT_BAL";
pub const AGE: &str = "AGE";
pub const LOG_LIMIT_BAL: &str = "log_limit_bal";

/// Columns filtered for outliers, in the order the filters run.
pub const OUTLIER_COLUMNS: [&str; 2] = [LIMIT_BAL, AGE];

/// Row counts and timing for one pipeline run.
#[derive(Debug, Clone)]
pub struct PreprocessReport {
    pub rows_in: usize,
    /// Rows remaining after each outlier pass, paired with the filtered column.
    pub rows_after_filter: Vec<(&'static str, usize)>,
    pub rows_out: usize,
    pub columns_added: Vec<&'static str>,
    pub elapsed: Duration,
}

impl PreprocessReport {
    pub fn rows_dropped(&self) -> usize {
        self.rows_in - self.rows_out
    }
}

/// Read `column` as `f64` values, one per row.
///
/// Fails with `Schema` when the column is absent, with `Data` when a value
/// cannot be parsed as a number and with `InputValidation` on the first null
/// or non-finite value.
pub fn numeric_column(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let col = df.column(column).map_err(|_| PreprocessError::Schema {
        column: column.to_string(),
    })?;

    let series = col
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|e| PreprocessError::Data(format!("column '{}' is not numeric: {}", column, e)))?;
    let chunked = series.f64()?;

    chunked
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(PreprocessError::InputValidation {
                column: column.to_string(),
                row,
                reason: format!("non-finite value {}", v),
            }),
            None => Err(PreprocessError::InputValidation {
                column: column.to_string(),
                row,
                reason: "missing value".to_string(),
            }),
        })
        .collect()
}

/// Run the full pipeline and return the engineered frame with a run report.
pub fn clean_and_engineer(df: &DataFrame) -> Result<(DataFrame, PreprocessReport)> {
    let start = Instant::now();
    let rows_in = df.height();

    let mut current = df.clone();
    let mut rows_after_filter = Vec::with_capacity(OUTLIER_COLUMNS.len());
    for column in OUTLIER_COLUMNS {
        current = remove_outliers_iqr(&current, column)?;
        rows_after_filter.push((column, current.height()));
    }

    if current.height() == 0 {
        return Err(PreprocessError::EmptyResult {
            after: OUTLIER_COLUMNS.join(", "),
        });
    }

    current = add_log1p_column(&current, LIMIT_BAL, LOG_LIMIT_BAL)?;
    current = engineer_features(&current)?;

    let mut columns_added = vec![LOG_LIMIT_BAL];
    columns_added.extend(engineered_columns());

    let report = PreprocessReport {
        rows_in,
        rows_after_filter,
        rows_out: current.height(),
        columns_added,
        elapsed: start.elapsed(),
    };

    tracing::info!(
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        columns_added = report.columns_added.len(),
        "Preprocessing finished"
    );

    Ok((current, report))
}
