use polars::prelude::*;

use super::error::Result;
use super::numeric_column;

/// Tukey fence multiplier applied to the inter-quartile range.
pub const IQR_FENCE: f64 = 1.5;

/// Quartiles and the inclusive keep-range derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Compute bounds from raw column values. Returns `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;

        Some(Self {
            q1,
            q3,
            lower: q1 - IQR_FENCE * iqr,
            upper: q3 + IQR_FENCE * iqr,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Quantile of pre-sorted values, linearly interpolated between the two
/// closest order statistics.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        }
    }
}

/// Drop every row whose `column` value falls outside the IQR fences computed
/// from that column as passed in. Rows are removed, never clipped.
pub fn remove_outliers_iqr(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let values = numeric_column(df, column)?;

    let Some(bounds) = IqrBounds::from_values(&values) else {
        return Ok(df.clone());
    };

    let mask: Vec<bool> = values.iter().map(|v| bounds.contains(*v)).collect();
    let mask = BooleanChunked::from_slice("keep".into(), &mask);
    let filtered = df.filter(&mask)?;

    tracing::debug!(
        column,
        q1 = bounds.q1,
        q3 = bounds.q3,
        lower = bounds.lower,
        upper = bounds.upper,
        dropped = df.height() - filtered.height(),
        "IQR outlier filter applied"
    );

    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::{AGE, LIMIT_BAL};

    fn limits_and_ages() -> DataFrame {
        df!(
            LIMIT_BAL => [50000.0, 40000.0, 50000.0, 50000.0, 50000.0, 10000.0],
            AGE => [25.0, 70.0, 35.0, 35.0, 30.0, 35.0]
        )
        .unwrap()
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), 1.0);
        assert_eq!(quantile_sorted(&sorted, 1.0), 4.0);
        assert!((quantile_sorted(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile_sorted(&sorted, 0.75) - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_from_values() {
        let bounds = IqrBounds::from_values(&[10.0, 20.0, 30.0, 40.0, 50.0]).unwrap();
        assert_eq!(bounds.q1, 20.0);
        assert_eq!(bounds.q3, 40.0);
        assert_eq!(bounds.iqr(), 20.0);
        assert_eq!(bounds.lower, -10.0);
        assert_eq!(bounds.upper, 70.0);
        assert!(bounds.contains(-10.0));
        assert!(bounds.contains(70.0));
        assert!(!bounds.contains(70.5));
    }

    #[test]
    fn test_bounds_empty() {
        assert!(IqrBounds::from_values(&[]).is_none());
    }

    #[test]
    fn test_extreme_row_dropped_not_clipped() {
        let df = df!(
            LIMIT_BAL => [50000.0, 60000.0, 55000.0, 52000.0, 58000.0, 1000000.0]
        )
        .unwrap();

        let out = remove_outliers_iqr(&df, LIMIT_BAL).unwrap();
        assert_eq!(out.height(), 5);

        let kept = numeric_column(&out, LIMIT_BAL).unwrap();
        assert!(!kept.contains(&1000000.0));
        assert!(kept.iter().all(|v| *v <= 60000.0));
    }

    #[test]
    fn test_output_is_subset_within_original_bounds() {
        let df = limits_and_ages();
        let original = numeric_column(&df, AGE).unwrap();
        let bounds = IqrBounds::from_values(&original).unwrap();

        let out = remove_outliers_iqr(&df, AGE).unwrap();
        assert!(out.height() <= df.height());

        let kept = numeric_column(&out, AGE).unwrap();
        for value in kept {
            assert!(original.contains(&value));
            assert!(value >= bounds.lower && value <= bounds.upper);
        }
    }

    #[test]
    fn test_filter_order_matters() {
        let df = limits_and_ages();

        let limit_first = remove_outliers_iqr(&df, LIMIT_BAL).unwrap();
        let limit_first = remove_outliers_iqr(&limit_first, AGE).unwrap();

        let age_first = remove_outliers_iqr(&df, AGE).unwrap();
        let age_first = remove_outliers_iqr(&age_first, LIMIT_BAL).unwrap();

        // With the 10000 limit gone first, the age quartiles widen enough
        // for the 25-year-old row to survive.
        assert_eq!(limit_first.height(), 4);
        assert_eq!(age_first.height(), 3);
        assert!(numeric_column(&limit_first, AGE).unwrap().contains(&25.0));
        assert!(!numeric_column(&age_first, AGE).unwrap().contains(&25.0));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let df = limits_and_ages();
        let err = remove_outliers_iqr(&df, "INCOME").unwrap_err();
        assert!(matches!(
            err,
            crate::preprocessing::PreprocessError::Schema { ref column } if column == "INCOME"
        ));
    }

    #[test]
    fn test_empty_frame_passes_through() {
        let df = df!(AGE => Vec::<f64>::new()).unwrap();
        let out = remove_outliers_iqr(&df, AGE).unwrap();
        assert_eq!(out.height(), 0);
    }
}
