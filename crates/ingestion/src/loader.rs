//! JSON capture loading.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use contracts::SessionInput;
use tracing::{debug, info, instrument, warn};

use crate::error::{IngestionError, Result};
use crate::limits::{check_sample_ranges, RangeViolation, SampleLimits};
use crate::stats::IngestionMetrics;

/// A parsed session plus its range-check findings
#[derive(Debug, Clone)]
pub struct LoadedCapture {
    pub session: SessionInput,
    /// Non-fatal; the analysis' own quality rules decide what they mean
    pub violations: Vec<RangeViolation>,
}

/// Reads capture sessions and checks them before analysis
///
/// Shape errors (lengths, widths, non-increasing clocks) reject the capture;
/// out-of-range samples are only counted and logged.
#[derive(Debug, Clone, Default)]
pub struct CaptureLoader {
    limits: SampleLimits,
    metrics: Arc<IngestionMetrics>,
}

impl CaptureLoader {
    pub fn new(limits: SampleLimits) -> Self {
        Self {
            limits,
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Load one capture file
    #[instrument(name = "ingestion_load", skip(self), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> Result<LoadedCapture> {
        let text = fs::read_to_string(path).map_err(|source| {
            self.metrics.record_parse_error();
            IngestionError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        self.parse(&text, &path.display().to_string())
    }

    /// Parse a capture document; `origin` labels errors and logs
    pub fn parse(&self, json: &str, origin: &str) -> Result<LoadedCapture> {
        let session: SessionInput = serde_json::from_str(json).map_err(|source| {
            self.metrics.record_parse_error();
            IngestionError::ParseFailed {
                origin: origin.to_string(),
                source,
            }
        })?;
        self.accept(session, origin)
    }

    /// Check an in-memory session the same way a parsed one is checked
    pub fn accept(&self, session: SessionInput, origin: &str) -> Result<LoadedCapture> {
        let shape = session
            .imu
            .validate_shape()
            .and_then(|()| session.force.validate_shape())
            .and_then(|()| check_clock("imu", session.imu.is_time_increasing()))
            .and_then(|()| check_clock("force", session.force.is_time_increasing()));
        if let Err(source) = shape {
            self.metrics.record_parse_error();
            return Err(IngestionError::InvalidCapture {
                origin: origin.to_string(),
                source,
            });
        }

        let violations = check_sample_ranges(&session, &self.limits);
        for v in &violations {
            warn!(
                origin = origin,
                channel = %v.channel,
                count = v.count,
                total = v.total,
                rule = %v.rule,
                "Samples out of physical range"
            );
            self.metrics.record_range_violations(&v.channel, v.count);
        }

        let samples = session.imu.len() + session.force.len();
        self.metrics.record_loaded(samples);
        info!(
            origin = origin,
            exercise = %session.exercise,
            imu_samples = session.imu.len(),
            imu_locations = session.imu.sensors.len(),
            force_samples = session.force.len(),
            "Capture loaded"
        );
        Ok(LoadedCapture {
            session,
            violations,
        })
    }
}

fn check_clock(stream: &str, increasing: bool) -> std::result::Result<(), contracts::ContractError> {
    if increasing {
        Ok(())
    } else {
        Err(contracts::ContractError::validation(
            stream,
            "timestamps are not strictly increasing",
        ))
    }
}

/// Write a session as a pretty-printed capture document
pub fn save_session(path: &Path, session: &SessionInput) -> Result<()> {
    let json = serde_json::to_string_pretty(session).map_err(|source| {
        IngestionError::ParseFailed {
            origin: path.display().to_string(),
            source,
        }
    })?;
    fs::write(path, json).map_err(|source| IngestionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "Capture saved");
    Ok(())
}
