use std::io::IsTerminal;
use std::time::Duration;

use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{terminal_size, Width};

use crate::applicant::ApplicantInput;
use crate::preprocessing::PreprocessReport;
use crate::scoring::{Assessment, FeatureAttribution, RiskLevel, MAX_SCORE};

/// Bar width used when stdout is not a terminal.
const DEFAULT_BAR_WIDTH: usize = 30;
const MIN_BAR_WIDTH: usize = 10;
const MAX_BAR_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 16;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Bar width that fits next to the label and value columns.
fn bar_width() -> usize {
    match get_terminal_width() {
        // label + space + sign/value (9) + two spaces
        Some(w) => w
            .saturating_sub(LABEL_WIDTH + 12)
            .clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH),
        None => DEFAULT_BAR_WIDTH,
    }
}

/// "712/1000"
pub fn format_score(score: u32) -> String {
    format!("{}/{}", score, MAX_SCORE)
}

fn format_level(level: RiskLevel, use_colors: bool) -> String {
    let badge = format!("Risk Level: {}", level);
    if !use_colors {
        return badge;
    }
    match level {
        RiskLevel::Low => badge.green().bold().to_string(),
        RiskLevel::Medium => badge.yellow().bold().to_string(),
        RiskLevel::High => badge.red().bold().to_string(),
    }
}

/// Truncate a feature name to fit a label column, counting chars not bytes.
pub(crate) fn truncate_label(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Ranked horizontal bars, scaled so the largest magnitude fills `width`.
/// Positive contributions push toward default.
pub fn format_attribution_bars(top: &[FeatureAttribution], width: usize, use_colors: bool) -> String {
    let max = top
        .iter()
        .map(|a| a.contribution.abs())
        .fold(0.0_f64, f64::max);

    top.iter()
        .map(|a| {
            let filled = if max > 0.0 {
                ((a.contribution.abs() / max) * width as f64).round() as usize
            } else {
                0
            };
            let bar = "█".repeat(filled);
            let label = format!("{:<w$}", truncate_label(&a.feature, LABEL_WIDTH), w = LABEL_WIDTH);
            let value = format!("{:>+9.4}", a.contribution);

            if use_colors {
                let bar = if a.contribution > 0.0 {
                    bar.red().to_string()
                } else {
                    bar.green().to_string()
                };
                format!("{} {}  {}", label, value.dimmed(), bar)
            } else {
                format!("{} {}  {}", label, value, bar)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_applicant(input: &ApplicantInput) -> String {
    format!(
        "  Age: {}\n  Credit limit: {}\n  Avg monthly payment: {}\n  Max bill amount: {}\n  Education: {}\n  Marital status: {}",
        input.age,
        input.credit_limit,
        input.avg_pay_amt,
        input.max_bill_amt,
        input.education,
        input.marital_status
    )
}

/// Multi-line report for the `score` command.
pub fn format_assessment(assessment: &Assessment, use_colors: bool) -> String {
    let mut out = Vec::new();

    out.push(if use_colors {
        "Applicant".bold().to_string()
    } else {
        "Applicant".to_string()
    });
    out.push(format_applicant(&assessment.applicant));
    out.push(String::new());

    let score = format_score(assessment.score);
    out.push(format!(
        "Risk Score: {}",
        if use_colors { score.bold().to_string() } else { score }
    ));
    out.push(format_level(assessment.level, use_colors));
    out.push(String::new());
    out.push(assessment.narrative.to_string());
    out.push(String::new());

    match &assessment.explanation {
        Ok(explanation) => {
            out.push(format!(
                "Top {} factors (log-odds, base {:+.4}):",
                explanation.top.len(),
                explanation.expected_value
            ));
            out.push(format_attribution_bars(&explanation.top, bar_width(), use_colors));
        }
        Err(e) => {
            let msg = format!("Explanation unavailable: {}", e);
            out.push(if use_colors { msg.yellow().to_string() } else { msg });
        }
    }

    out.join("\n")
}

#[derive(Serialize)]
struct AssessmentJson<'a> {
    applicant: &'a ApplicantInput,
    score: u32,
    level: RiskLevel,
    probability: f64,
    narrative: &'a str,
    features: &'a crate::features::FeatureVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<&'a crate::scoring::Explanation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation_error: Option<String>,
    assessed_at: String,
}

/// Pretty JSON for `score --json`.
pub fn format_assessment_json(assessment: &Assessment) -> serde_json::Result<String> {
    let (explanation, explanation_error) = match &assessment.explanation {
        Ok(e) => (Some(e), None),
        Err(e) => (None, Some(e.to_string())),
    };
    serde_json::to_string_pretty(&AssessmentJson {
        applicant: &assessment.applicant,
        score: assessment.score,
        level: assessment.level,
        probability: assessment.probability,
        narrative: assessment.narrative,
        features: &assessment.features,
        explanation,
        explanation_error,
        assessed_at: assessment.assessed_at.to_rfc3339(),
    })
}

/// Summary printed after `preprocess`.
pub fn format_preprocess_report(report: &PreprocessReport, use_colors: bool) -> String {
    let mut lines = vec![format!("Rows in: {}", report.rows_in)];
    for (column, rows) in &report.rows_after_filter {
        lines.push(format!("  after {} outlier filter: {}", column, rows));
    }
    let dropped = format!("{} dropped", report.rows_dropped());
    lines.push(format!(
        "Rows out: {} ({})",
        report.rows_out,
        if use_colors { dropped.dimmed().to_string() } else { dropped }
    ));
    lines.push(format!("Columns added: {}", report.columns_added.join(", ")));
    lines.push(format!("Took {}", format_elapsed(report.elapsed)));
    lines.join("\n")
}

/// Millisecond precision is plenty for a batch run.
fn format_elapsed(elapsed: Duration) -> String {
    let millis = Duration::from_millis(elapsed.as_millis() as u64);
    humantime::format_duration(millis).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureSchema, FeatureVector};
    use crate::scoring::{Explanation, ScoringError};
    use chrono::Utc;
    use std::sync::Arc;

    fn attribution(feature: &str, contribution: f64) -> FeatureAttribution {
        FeatureAttribution {
            feature: feature.to_string(),
            value: 1.0,
            contribution,
        }
    }

    fn sample_assessment(explanation: Result<Explanation, ScoringError>) -> Assessment {
        let schema = Arc::new(FeatureSchema::new(vec!["AGE".to_string(), "PAY_0".to_string()]).unwrap());
        let mut features = FeatureVector::zeros(schema);
        features.set("AGE", 35.0).unwrap();
        Assessment {
            applicant: ApplicantInput::default(),
            features,
            probability: 0.288,
            score: 712,
            level: RiskLevel::Low,
            narrative: RiskLevel::Low.narrative(),
            explanation,
            assessed_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(712), "712/1000");
        assert_eq!(format_score(0), "0/1000");
    }

    #[test]
    fn test_bars_scale_to_largest() {
        let top = vec![attribution("PAY_0", 0.8), attribution("AGE", -0.4), attribution("SEX", 0.0)];
        let out = format_attribution_bars(&top, 20, false);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].matches('█').count(), 20);
        assert_eq!(lines[1].matches('█').count(), 10);
        assert_eq!(lines[2].matches('█').count(), 0);
        assert!(lines[0].starts_with("PAY_0"));
        assert!(lines[1].contains("-0.4000"));
    }

    #[test]
    fn test_bars_all_zero() {
        let top = vec![attribution("AGE", 0.0)];
        let out = format_attribution_bars(&top, 20, false);
        assert_eq!(out.matches('█').count(), 0);
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("avg_pay_status", 16), "avg_pay_status");
        assert_eq!(truncate_label("a_very_long_feature_name", 10), "a_very_...");
    }

    #[test]
    fn test_assessment_report() {
        let explanation = Explanation {
            expected_value: -1.2,
            top: vec![attribution("AGE", -0.3)],
        };
        let out = format_assessment(&sample_assessment(Ok(explanation)), false);
        assert!(out.contains("Risk Score: 712/1000"));
        assert!(out.contains("Risk Level: Low"));
        assert!(out.contains("low credit risk"));
        assert!(out.contains("Top 1 factors"));
        assert!(out.contains("Education: Graduate"));
    }

    #[test]
    fn test_assessment_report_without_explanation() {
        let a = sample_assessment(Err(ScoringError::Attribution("boom".to_string())));
        let out = format_assessment(&a, false);
        assert!(out.contains("Risk Score: 712/1000"));
        assert!(out.contains("Risk Level: Low"));
        assert!(out.contains("Explanation unavailable"));
    }

    #[test]
    fn test_assessment_json() {
        let a = sample_assessment(Err(ScoringError::Attribution("boom".to_string())));
        let json: serde_json::Value = serde_json::from_str(&format_assessment_json(&a).unwrap()).unwrap();
        assert_eq!(json["score"], 712);
        assert_eq!(json["level"], "Low");
        assert_eq!(json["features"], serde_json::json!({ "AGE": 35.0 }));
        assert_eq!(json["applicant"]["education"], "graduate");
        assert!(json.get("explanation").is_none());
        assert!(json["explanation_error"].as_str().unwrap().contains("boom"));
    }

    #[test]
    fn test_preprocess_report() {
        let report = PreprocessReport {
            rows_in: 30000,
            rows_after_filter: vec![("LIMIT_BAL", 29833), ("AGE", 29561)],
            rows_out: 29561,
            columns_added: vec!["log_limit_bal", "avg_pay_status"],
            elapsed: Duration::from_millis(1500),
        };
        let out = format_preprocess_report(&report, false);
        assert!(out.contains("Rows in: 30000"));
        assert!(out.contains("after AGE outlier filter: 29561"));
        assert!(out.contains("Rows out: 29561 (439 dropped)"));
        assert!(out.contains("log_limit_bal, avg_pay_status"));
        assert!(out.contains("Took 1s 500ms"));
    }
}
