//! `generate` command implementation.

use anyhow::Result;
use tracing::info;

use super::synthetic_session;
use crate::cli::GenerateArgs;
use crate::error::CliError;

/// Execute the `generate` command
pub fn run_generate(args: &GenerateArgs) -> Result<()> {
    let session = synthetic_session(&args.session)?;
    ingestion::save_session(&args.output, &session).map_err(CliError::from)?;

    info!(
        output = %args.output.display(),
        exercise = %session.exercise,
        imu_samples = session.imu.len(),
        force_samples = session.force.len(),
        "Synthetic capture written"
    );
    println!(
        "✓ Wrote {} ({} IMU samples, {} force samples)",
        args.output.display(),
        session.imu.len(),
        session.force.len()
    );
    Ok(())
}
