//! Metrics engine facade.

use contracts::{
    AnalysisConfig, Band, ContractError, DynamicMetrics, EventWindow, ForceMetrics,
    FunctionalScore, KinematicMetrics, ReferenceComparison, RepetitionStats, ScoringConfig,
    SymmetryMetrics, ValidationMetrics,
};
use tracing::instrument;

use crate::dynamics::try_dynamic_metrics;
use crate::force::try_force_metrics;
use crate::kinematics::try_kinematic_metrics;
use crate::score::functional_score;
use crate::statistics;
use crate::symmetry::{try_symmetry_from_values, try_symmetry_metrics};
use crate::validation::try_validation_metrics;

/// Zero-valued record on failure, logged and counted
fn or_empty<T: Default>(operation: &'static str, result: Result<T, ContractError>) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!(operation = operation, error = %e, "Metric computation failed, using empty record");
        observability::record_numeric_fallback(operation);
        T::default()
    })
}

/// Computes every metric family; never fails
///
/// Degenerate input yields the zero-valued record of the requested family.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    scoring: ScoringConfig,
}

impl MetricsEngine {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.scoring.clone())
    }

    #[instrument(name = "metrics_kinematic", skip_all, fields(samples = angle.len()))]
    pub fn kinematic(&self, time: &[f64], angle: &[f64]) -> KinematicMetrics {
        or_empty("kinematic_metrics", try_kinematic_metrics(time, angle))
    }

    #[instrument(name = "metrics_dynamic", skip_all, fields(samples = moment.len()))]
    pub fn dynamic(
        &self,
        time: &[f64],
        moment: &[f64],
        angular_velocity: &[f64],
        body_mass_kg: f64,
    ) -> DynamicMetrics {
        or_empty(
            "dynamic_metrics",
            try_dynamic_metrics(time, moment, angular_velocity, body_mass_kg),
        )
    }

    #[instrument(
        name = "metrics_force",
        skip(self, time, fz),
        fields(start = contact.start, end = contact.end)
    )]
    pub fn force(
        &self,
        time: &[f64],
        fz: &[f64],
        body_weight_n: f64,
        contact: EventWindow,
    ) -> ForceMetrics {
        or_empty(
            "force_metrics",
            try_force_metrics(time, fz, body_weight_n, contact),
        )
    }

    pub fn symmetry(&self, right: &[f64], left: &[f64]) -> SymmetryMetrics {
        or_empty("symmetry_metrics", try_symmetry_metrics(right, left))
    }

    pub fn symmetry_from_values(&self, right: f64, left: f64) -> SymmetryMetrics {
        or_empty("symmetry_metrics", try_symmetry_from_values(right, left))
    }

    pub fn validation(&self, measured: &[f64], reference: &[f64]) -> ValidationMetrics {
        or_empty(
            "validation_metrics",
            try_validation_metrics(measured, reference),
        )
    }

    pub fn repetition_statistics(&self, values: &[f64]) -> RepetitionStats {
        statistics::repetition_statistics(values)
    }

    pub fn rom_multiple_cycles(&self, angle: &[f64], cycles: &[EventWindow]) -> RepetitionStats {
        statistics::rom_multiple_cycles(angle, cycles)
    }

    pub fn grf_peaks_multiple_contacts(
        &self,
        fz: &[f64],
        contacts: &[EventWindow],
        body_weight_n: f64,
    ) -> RepetitionStats {
        statistics::grf_peaks_multiple_contacts(fz, contacts, body_weight_n)
    }

    pub fn compare_with_reference(&self, metric: &str, value: f64, band: Band) -> ReferenceComparison {
        statistics::compare_with_reference(metric, value, band)
    }

    pub fn functional_score(
        &self,
        rom_deg: f64,
        symmetry_index_pct: f64,
        peak_grf_bw: f64,
    ) -> FunctionalScore {
        functional_score(rom_deg, symmetry_index_pct, peak_grf_bw, &self.scoring)
    }
}
