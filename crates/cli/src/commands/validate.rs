//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::AnalysisConfig;
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    target_frequency_hz: f64,
    filter_order: usize,
    default_exercise: String,
    exercise_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_config(Some(&args.config)) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    target_frequency_hz: config.sync.target_frequency_hz,
                    filter_order: config.filter.order,
                    default_exercise: format!(
                        "contact {} N, GRF {:.1}-{:.1} BW",
                        config.default_exercise.contact_threshold_n,
                        config.default_exercise.grf_band_bw.min,
                        config.default_exercise.grf_band_bw.max
                    ),
                    exercise_count: config.exercises.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &AnalysisConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let nyquist = config.sync.target_frequency_hz / 2.0;

    for (name, cutoff) in [
        ("filter.imu_acc_cutoff_hz", config.filter.imu_acc_cutoff_hz),
        ("filter.imu_gyro_cutoff_hz", config.filter.imu_gyro_cutoff_hz),
        ("filter.force_cutoff_hz", config.filter.force_cutoff_hz),
    ] {
        if cutoff >= nyquist {
            warnings.push(format!(
                "{name} = {cutoff} Hz is at or above the grid Nyquist ({nyquist} Hz); the signal passes unfiltered"
            ));
        }
    }

    if !config.physics.estimate_knee_moment {
        warnings.push("physics.estimate_knee_moment is off - no dynamic metrics".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Grid: {} Hz", summary.target_frequency_hz);
            println!("  Filter order: {}", summary.filter_order);
            println!("  Default exercise: {}", summary.default_exercise);
            println!("  Exercises: {}", summary.exercise_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args_for(content: &str) -> (tempfile::NamedTempFile, ValidateArgs) {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };
        (file, args)
    }

    #[test]
    fn test_valid_config_with_warning() {
        let (_file, args) = args_for("[filter]\nforce_cutoff_hz = 60.0\n");
        let result = validate_config(&args);
        assert!(result.valid, "{:?}", result.error);
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("force_cutoff_hz")));
    }

    #[test]
    fn test_invalid_config() {
        let (_file, args) = args_for("[sync]\ntarget_frequency_hz = -1.0\n");
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_missing_file() {
        let args = ValidateArgs {
            config: "/nonexistent/analysis.toml".into(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("not found"));
    }
}
