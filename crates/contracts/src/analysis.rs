//! Analysis output handed to presentation/report layers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    AlertRecord, DynamicMetrics, EventSet, ForceMetrics, FunctionalScore, KinematicMetrics,
    ProcessedSignals, ReferenceComparison, RepetitionStats, SymmetryMetrics, SyncResult,
};

/// Ordered pipeline phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    Synchronization,
    Conditioning,
    EventDetection,
    Metrics,
    Alerts,
    Summary,
}

impl AnalysisPhase {
    pub const ALL: [AnalysisPhase; 6] = [
        AnalysisPhase::Synchronization,
        AnalysisPhase::Conditioning,
        AnalysisPhase::EventDetection,
        AnalysisPhase::Metrics,
        AnalysisPhase::Alerts,
        AnalysisPhase::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisPhase::Synchronization => "synchronization",
            AnalysisPhase::Conditioning => "conditioning",
            AnalysisPhase::EventDetection => "event_detection",
            AnalysisPhase::Metrics => "metrics",
            AnalysisPhase::Alerts => "alerts",
            AnalysisPhase::Summary => "summary",
        }
    }
}

impl fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated result of one session analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub exercise: String,
    pub sync: SyncResult,
    pub events: EventSet,
    /// Keyed by joint, e.g. `knee_right`
    pub kinematic: BTreeMap<String, KinematicMetrics>,
    /// Keyed by joint
    pub dynamic: BTreeMap<String, DynamicMetrics>,
    /// Keyed by contact, e.g. `contact_1`
    pub force: BTreeMap<String, ForceMetrics>,
    pub symmetry: Option<SymmetryMetrics>,
    pub functional_score: Option<FunctionalScore>,
    /// Metres, keyed by contact (jump-family exercises only)
    pub jump_heights: BTreeMap<String, f64>,
    /// e.g. `rom_knee_right`, `peak_grf`
    pub repetition_stats: BTreeMap<String, RepetitionStats>,
    pub reference_comparisons: Vec<ReferenceComparison>,
    pub alerts: Vec<AlertRecord>,
    pub signals: ProcessedSignals,
    pub summary: String,
    /// Phase that aborted the run
    pub failure_phase: Option<AnalysisPhase>,
}

impl AnalysisResult {
    /// Failure-tagged result carrying a diagnostic message
    pub fn failed(
        exercise: impl Into<String>,
        phase: AnalysisPhase,
        message: &str,
        alerts: Vec<AlertRecord>,
    ) -> Self {
        Self {
            success: false,
            exercise: exercise.into(),
            alerts,
            summary: format!("ANALYSIS FAILED: {message}"),
            failure_phase: Some(phase),
            ..Self::default()
        }
    }
}
