use serde::Serialize;
use std::fmt;

use super::error::ScoringError;

pub const MAX_SCORE: u32 = 1000;
pub const LOW_RISK_MIN: u32 = 700;
pub const MEDIUM_RISK_MIN: u32 = 500;

/// Map a default probability onto 0..=1000, higher meaning safer.
pub fn risk_score(probability: f64) -> Result<u32, ScoringError> {
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(ScoringError::Prediction(format!(
            "probability {} is outside [0, 1]",
            probability
        )));
    }
    Ok(((1.0 - probability) * MAX_SCORE as f64).floor() as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= LOW_RISK_MIN {
            Self::Low
        } else if score >= MEDIUM_RISK_MIN {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn narrative(self) -> &'static str {
        match self {
            Self::Low => "The applicant is assessed as low credit risk, with timely payments and stable financial behavior. Their high monthly payments and responsible credit use support a strong credit profile.",
            Self::Medium => "The applicant is assessed to have moderate credit risk. While they do not exhibit strong financial distress, there are some inconsistencies in repayments or moderate credit usage that warrant attention.",
            Self::High => "The applicant is identified as high credit risk. Indicators such as delayed payments, low repayments relative to bills, or inconsistent credit behavior have significantly raised their default risk.",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_endpoints() {
        assert_eq!(risk_score(0.0).unwrap(), 1000);
        assert_eq!(risk_score(1.0).unwrap(), 0);
    }

    #[test]
    fn test_score_floors() {
        assert_eq!(risk_score(0.301).unwrap(), 699);
        assert_eq!(risk_score(0.3).unwrap(), 700);
        assert_eq!(risk_score(0.0005).unwrap(), 999);
    }

    #[test]
    fn test_score_rejects_bad_probability() {
        assert!(matches!(risk_score(f64::NAN), Err(ScoringError::Prediction(_))));
        assert!(risk_score(1.2).is_err());
        assert!(risk_score(-0.01).is_err());
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(RiskLevel::from_score(699), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(700), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(499), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(500), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(1000), RiskLevel::Low);
    }

    #[test]
    fn test_narratives_are_distinct() {
        let texts = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High].map(RiskLevel::narrative);
        assert!(texts[0].contains("low credit risk"));
        assert!(texts[1].contains("moderate credit risk"));
        assert!(texts[2].contains("high credit risk"));
    }
}
