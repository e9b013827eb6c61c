//! `analyze` command implementation.

use anyhow::{Context, Result};
use analysis::AnalysisPipeline;
use contracts::{AnalysisResult, ProcessedSignals, SessionInput};
use ingestion::CaptureLoader;
use observability::AnalysisMetricsAggregator;
use serde::Serialize;
use tracing::{info, warn};

use super::{load_config, synthetic_session};
use crate::cli::AnalyzeArgs;
use crate::error::CliError;

/// One analyzed session for JSON output
#[derive(Serialize)]
struct SessionReport<'a> {
    source: &'a str,
    result: &'a AnalysisResult,
}

/// Execute the `analyze` command
pub fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)
            .context("Failed to start metrics endpoint")?;
    }

    let sessions = collect_sessions(args)?;
    let pipeline = AnalysisPipeline::new(config);
    let mut aggregator = AnalysisMetricsAggregator::new();
    let mut results = Vec::with_capacity(sessions.len());

    for (source, session) in &sessions {
        info!(source = %source, exercise = %session.exercise, "Analyzing session");
        let mut result = pipeline.run(session);
        aggregator.update(&result);
        if !result.success {
            warn!(source = %source, phase = ?result.failure_phase, "Session analysis failed");
        }
        if args.json && !args.signals {
            result.signals = ProcessedSignals::default();
        }
        results.push((source.as_str(), result));
    }

    if args.json {
        let reports: Vec<SessionReport<'_>> = results
            .iter()
            .map(|(source, result)| SessionReport { source, result })
            .collect();
        let json = serde_json::to_string_pretty(&reports)
            .context("Failed to serialize analysis results")?;
        println!("{}", json);
    } else {
        for (source, result) in &results {
            print_result(source, result);
        }
        if results.len() > 1 {
            println!("{}", aggregator.summary());
        }
    }

    let summary = aggregator.summary();
    if summary.failed_sessions > 0 {
        return Err(CliError::AnalysisFailed {
            failed: summary.failed_sessions,
            total: summary.total_sessions,
        }
        .into());
    }
    Ok(())
}

/// `(source label, session)` pairs in command-line order
fn collect_sessions(args: &AnalyzeArgs) -> Result<Vec<(String, SessionInput)>> {
    if args.synthetic {
        let session = synthetic_session(&args.session)?;
        return Ok(vec![("synthetic".to_string(), session)]);
    }

    let loader = CaptureLoader::default();
    let mut sessions = Vec::with_capacity(args.captures.len());
    for path in &args.captures {
        let loaded = loader.load(path).map_err(CliError::from)?;
        if !ingestion::has_vertical_force(&loaded.session) {
            warn!(capture = %path.display(), "Capture has no vertical force channel");
        }
        sessions.push((path.display().to_string(), loaded.session));
    }
    let stats = loader.metrics().snapshot();
    info!(
        captures = stats.captures_loaded,
        samples = stats.samples_loaded,
        out_of_range = stats.range_violations,
        "Captures loaded"
    );
    Ok(sessions)
}

fn print_result(source: &str, result: &AnalysisResult) {
    println!("── {} ──", source);
    println!("{}", result.summary);

    if !result.alerts.is_empty() {
        println!();
        for alert in &result.alerts {
            println!(
                "  [{}] {} ({}): {}",
                alert.severity, alert.title, alert.category, alert.message
            );
            println!("      → {}", alert.recommendation);
        }
    }
    println!();
}
