//! The six applicant answers collected by the form and the `score` command.

pub mod mapping;

pub use mapping::{build_feature_vector, education_code, marital_code};

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

use crate::scoring::ScoringError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    Graduate,
    University,
    HighSchool,
}

impl Education {
    pub const ALL: [Education; 3] = [Self::Graduate, Self::University, Self::HighSchool];

    pub fn label(self) -> &'static str {
        match self {
            Self::Graduate => "Graduate",
            Self::University => "University",
            Self::HighSchool => "High School",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Married,
    Single,
    Others,
}

impl MaritalStatus {
    pub const ALL: [MaritalStatus; 3] = [Self::Married, Self::Single, Self::Others];

    pub fn label(self) -> &'static str {
        match self {
            Self::Married => "Married",
            Self::Single => "Single",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for Education {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive bounds for a numeric form field. `step` only drives the
/// dashboard's increment keys; validation checks the bounds alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl FieldRange {
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Move `value` by `steps` increments, clamped to the bounds.
    pub fn adjust(&self, value: u32, steps: i64) -> u32 {
        let next = value as i64 + steps * self.step as i64;
        next.clamp(self.min as i64, self.max as i64) as u32
    }
}

pub const AGE_RANGE: FieldRange = FieldRange { min: 18, max: 100, step: 1 };
pub const CREDIT_LIMIT_RANGE: FieldRange = FieldRange { min: 10_000, max: 1_000_000, step: 10_000 };
pub const AVG_PAY_AMT_RANGE: FieldRange = FieldRange { min: 0, max: 100_000, step: 1_000 };
pub const MAX_BILL_AMT_RANGE: FieldRange = FieldRange { min: 0, max: 1_000_000, step: 1_000 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplicantInput {
    pub age: u32,
    pub credit_limit: u32,
    pub avg_pay_amt: u32,
    pub max_bill_amt: u32,
    pub education: Education,
    pub marital_status: MaritalStatus,
}

impl Default for ApplicantInput {
    fn default() -> Self {
        Self {
            age: 35,
            credit_limit: 50_000,
            avg_pay_amt: 10_000,
            max_bill_amt: 60_000,
            education: Education::Graduate,
            marital_status: MaritalStatus::Single,
        }
    }
}

impl ApplicantInput {
    /// Check every numeric field against its range, reporting all
    /// violations together.
    pub fn validate(&self) -> Result<(), ScoringError> {
        let checks = [
            ("age", self.age, AGE_RANGE),
            ("credit_limit", self.credit_limit, CREDIT_LIMIT_RANGE),
            ("avg_pay_amt", self.avg_pay_amt, AVG_PAY_AMT_RANGE),
            ("max_bill_amt", self.max_bill_amt, MAX_BILL_AMT_RANGE),
        ];

        let errors: Vec<String> = checks
            .iter()
            .filter(|(_, value, range)| !range.contains(*value))
            .map(|(name, value, range)| {
                format!("{}: {} is outside [{}, {}]", name, value, range.min, range.max)
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ScoringError::InvalidInput(errors))
        }
    }
}
