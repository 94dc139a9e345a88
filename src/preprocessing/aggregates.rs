use polars::prelude::*;

use super::error::Result;
use super::numeric_column;

/// Statistic derived per row across the six monthly columns of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Mean,
    /// Sample standard deviation (n - 1 denominator).
    Std,
    Max,
}

impl Statistic {
    pub fn compute(&self, values: &[f64]) -> f64 {
        match self {
            Statistic::Mean => mean(values),
            Statistic::Std => sample_std(values),
            Statistic::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// One monthly series and the aggregate columns it produces.
#[derive(Debug, Clone, Copy)]
pub struct SeriesAggregate {
    pub columns: [&'static str; 6],
    pub outputs: &'static [(Statistic, &'static str)],
}

pub const REPAYMENT_STATUS: SeriesAggregate = SeriesAggregate {
    columns: ["PAY_0", "PAY_2", "PAY_3", "PAY_4", "PAY_5", "PAY_6"],
    outputs: &[
        (Statistic::Mean, "avg_pay_status"),
        (Statistic::Std, "std_pay_status"),
        (Statistic::Max, "max_pay_status"),
    ],
};

pub const BILL_AMOUNT: SeriesAggregate = SeriesAggregate {
    columns: [
        "BILL_AMT1",
        "BILL_AMT2",
        "BILL_AMT3",
        "BILL_AMT4",
        "BILL_AMT5",
        "BILL_AMT6",
    ],
    outputs: &[
        (Statistic::Mean, "avg_bill_amt"),
        (Statistic::Std, "std_bill_amt"),
        (Statistic::Max, "max_bill_amt"),
    ],
};

// Payment amounts get no max column.
pub const PAYMENT_AMOUNT: SeriesAggregate = SeriesAggregate {
    columns: [
        "PAY_AMT1", "PAY_AMT2", "PAY_AMT3", "PAY_AMT4", "PAY_AMT5", "PAY_AMT6",
    ],
    outputs: &[
        (Statistic::Mean, "avg_pay_amt"),
        (Statistic::Std, "std_pay_amt"),
    ],
};

pub const SERIES_AGGREGATES: [SeriesAggregate; 3] = [REPAYMENT_STATUS, BILL_AMOUNT, PAYMENT_AMOUNT];

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Add the aggregate columns for a single series.
///
/// All six source columns are checked up front so a missing column fails
/// before any output is written.
pub fn add_series_aggregates(df: &DataFrame, series: &SeriesAggregate) -> Result<DataFrame> {
    let columns = series
        .columns
        .iter()
        .map(|name| numeric_column(df, name))
        .collect::<Result<Vec<_>>>()?;

    let height = df.height();
    let mut outputs: Vec<Vec<f64>> = vec![Vec::with_capacity(height); series.outputs.len()];
    let mut row_values = [0.0_f64; 6];

    for row in 0..height {
        for (slot, column) in row_values.iter_mut().zip(&columns) {
            *slot = column[row];
        }
        for (out, (stat, _)) in outputs.iter_mut().zip(series.outputs) {
            out.push(stat.compute(&row_values));
        }
    }

    let mut out = df.clone();
    for (values, (_, name)) in outputs.into_iter().zip(series.outputs) {
        out.with_column(Series::new((*name).into(), values))?;
    }
    Ok(out)
}

/// Add every repayment-status, bill-amount and payment-amount aggregate.
pub fn engineer_features(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.clone();
    for series in &SERIES_AGGREGATES {
        out = add_series_aggregates(&out, series)?;
    }
    Ok(out)
}

/// Names of every column `engineer_features` adds, in insertion order.
pub fn engineered_columns() -> Vec<&'static str> {
    SERIES_AGGREGATES
        .iter()
        .flat_map(|series| series.outputs.iter().map(|(_, name)| *name))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::preprocessing::PreprocessError;

    /// Two rows of raw monthly columns: an all-zero account and a busy one.
    pub(crate) fn raw_series_frame() -> DataFrame {
        let mut columns: Vec<Column> = Vec::new();
        for (i, name) in REPAYMENT_STATUS.columns.iter().enumerate() {
            columns.push(Series::new((*name).into(), [0.0, i as f64 - 1.0]).into());
        }
        for (i, name) in BILL_AMOUNT.columns.iter().enumerate() {
            columns.push(Series::new((*name).into(), [0.0, 1000.0 * (i + 1) as f64]).into());
        }
        for name in PAYMENT_AMOUNT.columns.iter() {
            columns.push(Series::new((*name).into(), [0.0, 500.0]).into());
        }
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn test_statistics() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0];
        assert!((Statistic::Mean.compute(&values) - 4.0).abs() < 1e-12);
        // Sum of squared deviations is 6, divided by n - 1 = 5.
        assert!((Statistic::Std.compute(&values) - (6.0_f64 / 5.0).sqrt()).abs() < 1e-12);
        assert_eq!(Statistic::Max.compute(&values), 5.0);
    }

    #[test]
    fn test_zero_repayment_series() {
        let out = engineer_features(&raw_series_frame()).unwrap();
        assert_eq!(numeric_column(&out, "avg_pay_status").unwrap()[0], 0.0);
        assert_eq!(numeric_column(&out, "std_pay_status").unwrap()[0], 0.0);
        assert_eq!(numeric_column(&out, "max_pay_status").unwrap()[0], 0.0);
    }

    #[test]
    fn test_busy_row_aggregates() {
        let out = engineer_features(&raw_series_frame()).unwrap();

        // PAY_* row 1 is [-1, 0, 1, 2, 3, 4]
        assert!((numeric_column(&out, "avg_pay_status").unwrap()[1] - 1.5).abs() < 1e-12);
        assert_eq!(numeric_column(&out, "max_pay_status").unwrap()[1], 4.0);
        let expected_std = (17.5_f64 / 5.0).sqrt();
        assert!((numeric_column(&out, "std_pay_status").unwrap()[1] - expected_std).abs() < 1e-12);

        // BILL_AMT* row 1 is 1000..=6000
        assert_eq!(numeric_column(&out, "avg_bill_amt").unwrap()[1], 3500.0);
        assert_eq!(numeric_column(&out, "max_bill_amt").unwrap()[1], 6000.0);

        // constant payments have no spread
        assert_eq!(numeric_column(&out, "avg_pay_amt").unwrap()[1], 500.0);
        assert_eq!(numeric_column(&out, "std_pay_amt").unwrap()[1], 0.0);
    }

    #[test]
    fn test_payment_amount_has_no_max() {
        let out = engineer_features(&raw_series_frame()).unwrap();
        assert!(out.column("max_pay_amt").is_err());
        assert!(!engineered_columns().contains(&"max_pay_amt"));
        assert_eq!(engineered_columns().len(), 8);
    }

    #[test]
    fn test_missing_source_column_fails_fast() {
        let df = raw_series_frame().drop("BILL_AMT4").unwrap();
        let err = engineer_features(&df).unwrap_err();
        assert!(matches!(err, PreprocessError::Schema { ref column } if column == "BILL_AMT4"));
    }

    #[test]
    fn test_null_value_is_input_validation_error() {
        let mut df = raw_series_frame();
        df.with_column(Series::new("PAY_AMT3".into(), [Some(1.0), None]))
            .unwrap();
        let err = engineer_features(&df).unwrap_err();
        match err {
            PreprocessError::InputValidation { column, row, .. } => {
                assert_eq!(column, "PAY_AMT3");
                assert_eq!(row, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
