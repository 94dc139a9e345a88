use std::sync::Arc;
use std::time::Instant;

use crate::applicant::{
    ApplicantInput, Education, FieldRange, MaritalStatus, AGE_RANGE, AVG_PAY_AMT_RANGE,
    CREDIT_LIMIT_RANGE, MAX_BILL_AMT_RANGE,
};
use crate::scoring::{Assessment, ScoringError, ScoringService};
use crate::tui::theme::ThemeColors;

const FLASH_SECS: u64 = 3;
const MAX_EDIT_LEN: usize = 7;

pub enum ServiceState {
    Ready(Arc<ScoringService>),
    /// Artifacts failed to load. The form stays usable but nothing is scored.
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Age,
    CreditLimit,
    AvgPayAmt,
    MaxBillAmt,
    Education,
    MaritalStatus,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        Self::Age,
        Self::CreditLimit,
        Self::AvgPayAmt,
        Self::MaxBillAmt,
        Self::Education,
        Self::MaritalStatus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::CreditLimit => "Credit Limit",
            Self::AvgPayAmt => "Avg Monthly Payment",
            Self::MaxBillAmt => "Max Bill Amount",
            Self::Education => "Education",
            Self::MaritalStatus => "Marital Status",
        }
    }

    /// Bounds for numeric fields, `None` for enumerations.
    pub fn range(self) -> Option<FieldRange> {
        match self {
            Self::Age => Some(AGE_RANGE),
            Self::CreditLimit => Some(CREDIT_LIMIT_RANGE),
            Self::AvgPayAmt => Some(AVG_PAY_AMT_RANGE),
            Self::MaxBillAmt => Some(MAX_BILL_AMT_RANGE),
            Self::Education | Self::MaritalStatus => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Help,
}

/// Step through a closed enumeration, wrapping at both ends.
fn cycle<T: Copy + PartialEq>(all: &[T], current: T, steps: i64) -> T {
    let len = all.len() as i64;
    let pos = all.iter().position(|v| *v == current).unwrap_or(0) as i64;
    all[(pos + steps).rem_euclid(len) as usize]
}

pub struct App {
    pub service: ServiceState,
    pub form: ApplicantInput,
    pub selected: usize,
    pub input_mode: InputMode,
    pub edit_buffer: String,
    pub assessment: Option<Assessment>,
    pub request_error: Option<String>,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
    pub theme: ThemeColors,
}

impl App {
    pub fn new(service: ServiceState, theme: ThemeColors) -> Self {
        Self {
            service,
            form: ApplicantInput::default(),
            selected: 0,
            input_mode: InputMode::Normal,
            edit_buffer: String::new(),
            assessment: None,
            request_error: None,
            flash_message: None,
            should_quit: false,
            theme,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.service, ServiceState::Ready(_))
    }

    pub fn selected_field(&self) -> FormField {
        FormField::ALL[self.selected % FormField::ALL.len()]
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % FormField::ALL.len();
    }

    pub fn previous_field(&mut self) {
        self.selected = if self.selected == 0 {
            FormField::ALL.len() - 1
        } else {
            self.selected - 1
        };
    }

    pub fn field_value(&self, field: FormField) -> u32 {
        match field {
            FormField::Age => self.form.age,
            FormField::CreditLimit => self.form.credit_limit,
            FormField::AvgPayAmt => self.form.avg_pay_amt,
            FormField::MaxBillAmt => self.form.max_bill_amt,
            FormField::Education | FormField::MaritalStatus => 0,
        }
    }

    pub fn field_text(&self, field: FormField) -> String {
        match field {
            FormField::Education => self.form.education.to_string(),
            FormField::MaritalStatus => self.form.marital_status.to_string(),
            numeric => self.field_value(numeric).to_string(),
        }
    }

    fn set_field_value(&mut self, field: FormField, value: u32) {
        match field {
            FormField::Age => self.form.age = value,
            FormField::CreditLimit => self.form.credit_limit = value,
            FormField::AvgPayAmt => self.form.avg_pay_amt = value,
            FormField::MaxBillAmt => self.form.max_bill_amt = value,
            FormField::Education | FormField::MaritalStatus => {}
        }
    }

    /// Move the selected field by `steps` increments (numbers) or positions
    /// (enumerations), then re-score.
    pub fn adjust_selected(&mut self, steps: i64) {
        let field = self.selected_field();
        match field {
            FormField::Education => {
                self.form.education = cycle(&Education::ALL, self.form.education, steps);
            }
            FormField::MaritalStatus => {
                self.form.marital_status = cycle(&MaritalStatus::ALL, self.form.marital_status, steps);
            }
            numeric => {
                if let Some(range) = numeric.range() {
                    let value = range.adjust(self.field_value(numeric), steps);
                    self.set_field_value(numeric, value);
                }
            }
        }
        self.run_assessment();
    }

    /// Enter edit mode on a numeric field; enumerations ignore this.
    pub fn start_editing(&mut self) {
        let field = self.selected_field();
        if field.range().is_some() {
            self.edit_buffer = self.field_value(field).to_string();
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn push_edit_char(&mut self, c: char) {
        if c.is_ascii_digit() && self.edit_buffer.len() < MAX_EDIT_LEN {
            self.edit_buffer.push(c);
        }
    }

    pub fn pop_edit_char(&mut self) {
        self.edit_buffer.pop();
    }

    /// Commit the edit buffer. Out-of-range values are stored as typed so
    /// the assessment can report them.
    pub fn confirm_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        let field = self.selected_field();
        match self.edit_buffer.parse::<u32>() {
            Ok(value) => {
                self.set_field_value(field, value);
                self.run_assessment();
            }
            Err(_) => self.show_flash(format!("Error: '{}' is not a number", self.edit_buffer)),
        }
        self.edit_buffer.clear();
    }

    pub fn cancel_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        self.edit_buffer.clear();
    }

    /// Score the current form. Request failures become an inline banner and
    /// clear the previous result.
    pub fn run_assessment(&mut self) {
        let service = match &self.service {
            ServiceState::Ready(service) => Arc::clone(service),
            ServiceState::Unavailable(_) => return,
        };

        match service.assess(&self.form) {
            Ok(assessment) => {
                self.assessment = Some(assessment);
                self.request_error = None;
            }
            Err(e) => {
                self.assessment = None;
                self.request_error = Some(request_error_message(&e));
            }
        }
    }

    pub fn rerun(&mut self) {
        if !self.is_available() {
            self.show_flash("Error: scoring service unavailable".to_string());
            return;
        }
        self.run_assessment();
        if self.request_error.is_none() {
            self.show_flash("Re-scored".to_string());
        }
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    /// Show help overlay
    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    /// Dismiss help overlay
    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }
}

/// Prediction failures get a generic banner; the detail goes to the log.
fn request_error_message(error: &ScoringError) -> String {
    match error {
        ScoringError::Prediction(detail) => {
            tracing::error!(detail = %detail, "Prediction failed");
            "Could not compute a risk score for this applicant.".to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::FeatureSchema;
    use crate::model::{Artifacts, ClassifierArtifact, ExplainerArtifact, ModelClassifier, ModelExplainer};
    use crate::scoring::RiskLevel;

    /// A small logistic model over the six form fields.
    pub(crate) fn test_service() -> Arc<ScoringService> {
        let schema = Arc::new(
            FeatureSchema::new(
                ["LIMIT_BAL", "EDUCATION", "MARRIAGE", "AGE", "PAY_0", "avg_pay_amt", "max_bill_amt"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            )
            .unwrap(),
        );
        let classifier: ClassifierArtifact = serde_json::from_str(
            r#"{"kind": "logistic",
                "feature_names": ["LIMIT_BAL", "AGE", "avg_pay_amt", "max_bill_amt"],
                "coefficients": [-0.00001, 0.0, -0.0001, 0.00001],
                "intercept": -0.5}"#,
        )
        .unwrap();
        let explainer: ExplainerArtifact = serde_json::from_str(
            r#"{"kind": "linear", "expected_value": -1.0,
                "feature_names": ["LIMIT_BAL", "avg_pay_amt", "max_bill_amt"],
                "coefficients": [-0.00001, -0.0001, 0.00001],
                "means": [160000.0, 5000.0, 60000.0]}"#,
        )
        .unwrap();
        let classifier = ModelClassifier::bind(classifier, &schema).unwrap();
        let explainer = ModelExplainer::bind(explainer, &schema, &classifier).unwrap();
        Arc::new(ScoringService::new(
            Artifacts::new(schema, Box::new(classifier), Box::new(explainer)),
            5,
        ))
    }

    pub(crate) fn ready_app() -> App {
        let mut app = App::new(ServiceState::Ready(test_service()), ThemeColors::dark());
        app.run_assessment();
        app
    }

    #[test]
    fn test_defaults_score_on_start() {
        let app = ready_app();
        let a = app.assessment.as_ref().unwrap();
        // margin: -0.5 - 0.5 - 1.0 + 0.6 = -1.4
        assert_eq!(a.score, 802);
        assert_eq!(a.level, RiskLevel::Low);
        assert!(app.request_error.is_none());
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut app = ready_app();
        app.previous_field();
        assert_eq!(app.selected_field(), FormField::MaritalStatus);
        app.next_field();
        assert_eq!(app.selected_field(), FormField::Age);
    }

    #[test]
    fn test_credit_limit_steps_and_rescoring() {
        let mut app = ready_app();
        let before = app.assessment.as_ref().unwrap().score;
        app.next_field();
        app.adjust_selected(1);
        assert_eq!(app.form.credit_limit, 60_000);
        // a higher limit lowers default probability in this model
        assert!(app.assessment.as_ref().unwrap().score > before);
    }

    #[test]
    fn test_enumerations_cycle() {
        let mut app = ready_app();
        app.selected = 4;
        app.adjust_selected(-1);
        assert_eq!(app.form.education, Education::HighSchool);
        app.next_field();
        app.adjust_selected(1);
        assert_eq!(app.form.marital_status, MaritalStatus::Others);
    }

    #[test]
    fn test_edit_commit() {
        let mut app = ready_app();
        app.start_editing();
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.edit_buffer, "35");
        app.pop_edit_char();
        app.pop_edit_char();
        app.push_edit_char('4');
        app.push_edit_char('x');
        app.push_edit_char('2');
        app.confirm_edit();
        assert_eq!(app.form.age, 42);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.edit_buffer.is_empty());
    }

    #[test]
    fn test_out_of_range_edit_shows_banner() {
        let mut app = ready_app();
        app.start_editing();
        app.edit_buffer = "150".to_string();
        app.confirm_edit();
        assert!(app.assessment.is_none());
        assert!(app.request_error.as_deref().unwrap().contains("age"));

        app.start_editing();
        app.edit_buffer = "40".to_string();
        app.confirm_edit();
        assert!(app.assessment.is_some());
        assert!(app.request_error.is_none());
    }

    #[test]
    fn test_empty_edit_is_flashed() {
        let mut app = ready_app();
        app.start_editing();
        app.edit_buffer.clear();
        app.confirm_edit();
        assert_eq!(app.form.age, 35);
        assert!(app.flash_message.as_ref().unwrap().0.starts_with("Error"));
    }

    #[test]
    fn test_enumerations_are_not_editable() {
        let mut app = ready_app();
        app.selected = 5;
        app.start_editing();
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_unavailable_service_never_scores() {
        let mut app = App::new(
            ServiceState::Unavailable("missing classifier".to_string()),
            ThemeColors::dark(),
        );
        app.run_assessment();
        app.adjust_selected(1);
        assert!(app.assessment.is_none());
        assert!(app.request_error.is_none());
        assert_eq!(app.form.age, 36);

        app.rerun();
        assert!(app.flash_message.as_ref().unwrap().0.contains("unavailable"));
    }

    #[test]
    fn test_prediction_error_is_generic() {
        let msg = request_error_message(&ScoringError::Prediction("NaN margin".to_string()));
        assert!(!msg.contains("NaN"));
    }
}
