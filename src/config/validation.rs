use super::schema::Config;

pub const MIN_TICK_RATE_MS: u64 = 16;
pub const MAX_TICK_RATE_MS: u64 = 10_000;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let artifacts = &config.artifacts;
    let files = [
        ("classifier", &artifacts.classifier),
        ("explainer", &artifacts.explainer),
        ("features", &artifacts.features),
    ];
    for (key, file) in files {
        if file.trim().is_empty() {
            errors.push(format!("artifacts.{}: file name must not be empty", key));
        }
    }
    for (i, (key, file)) in files.iter().enumerate() {
        if let Some((other, _)) = files[..i].iter().find(|(_, f)| f == file) {
            errors.push(format!(
                "artifacts.{}: '{}' is already used by artifacts.{}",
                key, file, other
            ));
        }
    }

    if config.explanation.top_k == 0 {
        errors.push("explanation.top_k: must be at least 1".to_string());
    }

    let tick = config.dashboard.tick_rate_ms;
    if !(MIN_TICK_RATE_MS..=MAX_TICK_RATE_MS).contains(&tick) {
        errors.push(format!(
            "dashboard.tick_rate_ms: {} is outside [{}, {}]",
            tick, MIN_TICK_RATE_MS, MAX_TICK_RATE_MS
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = Config::default();
        config.artifacts.classifier = String::new();
        config.artifacts.explainer = "features.json".to_string();
        config.explanation.top_k = 0;
        config.dashboard.tick_rate_ms = 5;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("artifacts.classifier"));
        assert!(errors[1].contains("artifacts.explainer"));
        assert!(errors[2].starts_with("explanation.top_k"));
        assert!(errors[3].starts_with("dashboard.tick_rate_ms"));
    }
}
