//! Ingestion counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Ingestion counters shared by every load of one loader
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Captures parsed and shape-checked
    pub captures_loaded: AtomicU64,

    /// Captures rejected at parse or shape check
    pub parse_errors: AtomicU64,

    /// IMU plus force samples accepted
    pub samples_loaded: AtomicU64,

    /// Samples outside their physical range
    pub range_violations: AtomicU64,
}

impl IngestionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_loaded(&self, samples: usize) {
        self.captures_loaded.fetch_add(1, Ordering::Relaxed);
        self.samples_loaded.fetch_add(samples as u64, Ordering::Relaxed);
        metrics::counter!("ingestion_captures_loaded_total").increment(1);
    }

    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("ingestion_parse_errors_total").increment(1);
    }

    pub fn record_range_violations(&self, channel: &str, count: usize) {
        self.range_violations.fetch_add(count as u64, Ordering::Relaxed);
        metrics::counter!(
            "ingestion_samples_out_of_range_total",
            "channel" => channel.to_string()
        )
        .increment(count as u64);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            captures_loaded: self.captures_loaded.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            samples_loaded: self.samples_loaded.load(Ordering::Relaxed),
            range_violations: self.range_violations.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`IngestionMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub captures_loaded: u64,
    pub parse_errors: u64,
    pub samples_loaded: u64,
    pub range_violations: u64,
}
