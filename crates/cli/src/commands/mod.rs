//! Command implementations.

mod analyze;
mod generate;
mod info;
mod validate;

pub use analyze::run_analyze;
pub use generate::run_generate;
pub use info::run_info;
pub use validate::run_validate;

use std::path::Path;

use config_loader::ConfigLoader;
use contracts::{AnalysisConfig, SessionInput};
use ingestion::{SyntheticConfig, SyntheticSession};
use tracing::info;

use crate::cli::SyntheticArgs;
use crate::error::{CliError, Result};

/// Load the configuration file, or the built-in defaults when none is given
pub(crate) fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        info!("Using built-in analysis configuration");
        return Ok(AnalysisConfig::default());
    };
    if !path.exists() {
        return Err(CliError::config_not_found(path));
    }
    let config =
        ConfigLoader::load_from_path(path).map_err(|e| CliError::config_load(path, e))?;
    info!(config = %path.display(), exercises = config.exercises.len(), "Configuration loaded");
    Ok(config)
}

/// Build the synthetic session described by the CLI flags
pub(crate) fn synthetic_session(args: &SyntheticArgs) -> Result<SessionInput> {
    let exercise = args.exercise.to_ascii_lowercase();
    let template = match exercise.as_str() {
        "jump" | "cmj" | "squat_jump" => SyntheticSession::jump(),
        _ => SyntheticSession::squat(),
    };
    let mut generator = SyntheticSession::new(SyntheticConfig {
        exercise,
        duration_s: args.duration,
        body_mass_kg: args.mass,
        repetitions: args.reps,
        imu_offset_s: args.imu_offset,
        seed: args.seed,
        ..template.config().clone()
    });
    if let Some(spike) = args.spike_bw {
        generator = generator.with_spike(spike);
    }
    Ok(generator.build()?)
}
