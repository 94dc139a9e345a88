use polars::prelude::*;

use super::error::{PreprocessError, Result};
use super::numeric_column;

/// Append `target = ln(1 + source)` for every row.
///
/// `ln(1 + x)` is only defined for `x > -1`; credit limits are expected to be
/// non-negative by the time they get here, so anything below zero is rejected
/// rather than turned into NaN.
pub fn add_log1p_column(df: &DataFrame, source: &str, target: &str) -> Result<DataFrame> {
    let values = numeric_column(df, source)?;

    let mut transformed = Vec::with_capacity(values.len());
    for (row, value) in values.into_iter().enumerate() {
        if value < 0.0 {
            return Err(PreprocessError::InputValidation {
                column: source.to_string(),
                row,
                reason: format!("value {} is negative, log1p transform expects >= 0", value),
            });
        }
        transformed.push(value.ln_1p());
    }

    let mut out = df.clone();
    out.with_column(Series::new(target.into(), transformed))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::{LIMIT_BAL, LOG_LIMIT_BAL};

    fn transformed(limits: &[f64]) -> Vec<f64> {
        let df = df!(LIMIT_BAL => limits.to_vec()).unwrap();
        let out = add_log1p_column(&df, LIMIT_BAL, LOG_LIMIT_BAL).unwrap();
        numeric_column(&out, LOG_LIMIT_BAL).unwrap()
    }

    #[test]
    fn test_zero_maps_to_zero() {
        assert_eq!(transformed(&[0.0]), vec![0.0]);
    }

    #[test]
    fn test_e_minus_one_maps_to_one() {
        let out = transformed(&[std::f64::consts::E - 1.0]);
        assert!((out[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_monotonically_increasing() {
        let out = transformed(&[0.0, 1.0, 10.0, 10000.0, 50000.0, 1000000.0]);
        assert!(out.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_source_column_kept() {
        let df = df!(LIMIT_BAL => [20000.0, 30000.0]).unwrap();
        let out = add_log1p_column(&df, LIMIT_BAL, LOG_LIMIT_BAL).unwrap();
        assert_eq!(out.width(), 2);
        assert_eq!(numeric_column(&out, LIMIT_BAL).unwrap(), vec![20000.0, 30000.0]);
    }

    #[test]
    fn test_negative_value_rejected() {
        let df = df!(LIMIT_BAL => [1000.0, -5.0]).unwrap();
        let err = add_log1p_column(&df, LIMIT_BAL, LOG_LIMIT_BAL).unwrap_err();
        match err {
            PreprocessError::InputValidation { column, row, .. } => {
                assert_eq!(column, LIMIT_BAL);
                assert_eq!(row, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
