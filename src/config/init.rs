use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, save_config, validate_config, Config};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Prompt until the answer parses and passes `check`.
fn prompt_parsed<T, F>(message: &str, default: T, check: F) -> Result<T>
where
    T: std::str::FromStr + ToString,
    F: Fn(&T) -> Result<(), String>,
{
    loop {
        let input = prompt_with_default(message, &default.to_string())?;
        match input.parse::<T>() {
            Ok(v) => match check(&v) {
                Ok(()) => return Ok(v),
                Err(e) => println!("  Invalid: {}. Try again.", e),
            },
            Err(_) => println!("  Invalid: not a number. Try again."),
        }
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Credit Scope Configuration Wizard");
    println!("=================================");
    println!();

    let defaults = Config::default();
    let mut config = Config::default();

    // 1. Artifacts
    println!("The dashboard loads three files written by the training run:");
    println!("  a feature list, a classifier and an explainer.");
    let dir = prompt_with_default(
        "Artifact directory",
        &defaults.artifacts.dir.display().to_string(),
    )?;
    config.artifacts.dir = PathBuf::from(dir);

    let use_default_names = prompt_yes_no("Use the default artifact file names?", true)?;
    if !use_default_names {
        config.artifacts.features =
            prompt_with_default("  Feature list file", &defaults.artifacts.features)?;
        config.artifacts.classifier =
            prompt_with_default("  Classifier file", &defaults.artifacts.classifier)?;
        config.artifacts.explainer =
            prompt_with_default("  Explainer file", &defaults.artifacts.explainer)?;
    }

    // 2. Explanation
    println!();
    println!("The explanation panel ranks features by how strongly they moved the score.");
    config.explanation.top_k = prompt_parsed(
        "How many features to show",
        defaults.explanation.top_k,
        |&k| if k == 0 { Err("must be at least 1".to_string()) } else { Ok(()) },
    )?;

    // 3. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            println!("  {}", error);
        }
        anyhow::bail!("Refusing to write an invalid config");
    }

    // 4. Write config
    save_config(&config, &config_path)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `credit-scope` to open the dashboard.");

    Ok(())
}
