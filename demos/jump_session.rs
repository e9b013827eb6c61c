//! Jump Session Example
//!
//! Runs the full analysis pipeline on a synthetic countermovement jump
//! session with an alert observer attached, then prints the summary.
//!
//! Run with: cargo run -p demos --bin jump_session

use std::sync::Arc;

use analysis::AnalysisPipeline;
use contracts::{AlertRecord, AnalysisConfig, ContractError};
use ingestion::SyntheticSession;
use observability::{LogFormat, ObservabilityConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        default_log_level: "warn".to_string(),
        ..Default::default()
    })?;

    let session = SyntheticSession::jump()
        .with_repetitions(3)
        .with_duration(7.0)
        .build()?;

    // Observer runs synchronously inside the pipeline
    let observer = |alert: &AlertRecord| -> Result<(), ContractError> {
        println!(">> {} [{}] {}", alert.id, alert.severity, alert.title);
        Ok(())
    };
    let pipeline = AnalysisPipeline::new(AnalysisConfig::default()).with_observer(Arc::new(observer));

    let result = pipeline.run(&session);
    println!("{}", result.summary);

    if !result.success {
        return Err(format!("analysis failed in {:?}", result.failure_phase).into());
    }
    for (contact, height) in &result.jump_heights {
        println!("{contact}: {:.1} cm", height * 100.0);
    }
    Ok(())
}
