use std::sync::Arc;

use super::{ApplicantInput, Education, MaritalStatus};
use crate::features::{FeatureSchema, FeatureVector};
use crate::scoring::ScoringError;

pub const FIELD_AGE: &str = "AGE";
pub const FIELD_LIMIT_BAL: &str = "LIMIT_BAL";
pub const FIELD_AVG_PAY_AMT: &str = "avg_pay_amt";
pub const FIELD_MAX_BILL_AMT: &str = "max_bill_amt";
pub const FIELD_EDUCATION: &str = "EDUCATION";
pub const FIELD_MARRIAGE: &str = "MARRIAGE";

pub fn education_code(education: Education) -> f64 {
    match education {
        Education::Graduate => 1.0,
        Education::University => 2.0,
        Education::HighSchool => 3.0,
    }
}

// Married=1, Single=2 as the model was trained.
pub fn marital_code(status: MaritalStatus) -> f64 {
    match status {
        MaritalStatus::Married => 1.0,
        MaritalStatus::Single => 2.0,
        MaritalStatus::Others => 3.0,
    }
}

/// Validate the applicant and map the answers onto a zero-filled schema row.
///
/// Every other schema field stays 0.
pub fn build_feature_vector(
    input: &ApplicantInput,
    schema: &Arc<FeatureSchema>,
) -> Result<FeatureVector, ScoringError> {
    input.validate()?;

    let mut vector = FeatureVector::zeros(Arc::clone(schema));
    vector.set(FIELD_AGE, input.age as f64)?;
    vector.set(FIELD_LIMIT_BAL, input.credit_limit as f64)?;
    vector.set(FIELD_AVG_PAY_AMT, input.avg_pay_amt as f64)?;
    vector.set(FIELD_MAX_BILL_AMT, input.max_bill_amt as f64)?;
    vector.set(FIELD_EDUCATION, education_code(input.education))?;
    vector.set(FIELD_MARRIAGE, marital_code(input.marital_status))?;

    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(names: &[&str]) -> Arc<FeatureSchema> {
        Arc::new(FeatureSchema::new(names.iter().map(|s| s.to_string()).collect()).unwrap())
    }

    fn full_schema() -> Arc<FeatureSchema> {
        schema(&[
            "LIMIT_BAL",
            "SEX",
            "EDUCATION",
            "MARRIAGE",
            "AGE",
            "PAY_0",
            "BILL_AMT1",
            "log_limit_bal",
            "avg_pay_amt",
            "max_bill_amt",
            "avg_pay_status",
        ])
    }

    #[test]
    fn test_default_applicant_maps_exactly() {
        let vector = build_feature_vector(&ApplicantInput::default(), &full_schema()).unwrap();

        assert_eq!(
            vector.values(),
            &[50000.0, 0.0, 1.0, 2.0, 35.0, 0.0, 0.0, 0.0, 10000.0, 60000.0, 0.0]
        );
        assert_eq!(vector.non_zero().len(), 6);
    }

    #[test]
    fn test_category_codes() {
        let input = ApplicantInput {
            education: Education::HighSchool,
            marital_status: MaritalStatus::Married,
            ..Default::default()
        };
        let vector = build_feature_vector(&input, &full_schema()).unwrap();
        assert_eq!(vector.get(FIELD_EDUCATION), Some(3.0));
        assert_eq!(vector.get(FIELD_MARRIAGE), Some(1.0));
    }

    #[test]
    fn test_every_category_has_a_distinct_code() {
        let education: Vec<f64> = Education::ALL.iter().map(|e| education_code(*e)).collect();
        assert_eq!(education, vec![1.0, 2.0, 3.0]);

        let marital: Vec<f64> = MaritalStatus::ALL.iter().map(|m| marital_code(*m)).collect();
        assert_eq!(marital, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_missing_schema_field_is_mismatch() {
        let partial = schema(&["LIMIT_BAL", "EDUCATION", "AGE", "avg_pay_amt", "max_bill_amt"]);
        let err = build_feature_vector(&ApplicantInput::default(), &partial).unwrap_err();
        assert!(matches!(err, ScoringError::SchemaMismatch { ref field } if field == "MARRIAGE"));
    }

    #[test]
    fn test_invalid_input_rejected_before_mapping() {
        let input = ApplicantInput { age: 12, ..Default::default() };
        let err = build_feature_vector(&input, &full_schema()).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInput(_)));
    }
}
