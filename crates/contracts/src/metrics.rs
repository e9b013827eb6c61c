//! Biomechanical metrics records
//!
//! Fixed-shape value types. `Default` is the zero-valued record returned on
//! degenerate input.

use serde::{Deserialize, Serialize};

/// Joint angle metrics (degrees, deg/s, deg/s²)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicMetrics {
    pub rom: f64,
    pub peak_flexion: f64,
    pub peak_extension: f64,
    pub mean_angle: f64,
    pub peak_angular_velocity: f64,
    pub peak_angular_acceleration: f64,
}

/// Mass-normalized joint kinetics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicMetrics {
    /// Nm/kg
    pub peak_moment: f64,
    /// Nm/kg
    pub mean_moment: f64,
    /// W/kg
    pub peak_power: f64,
    /// J/kg
    pub work: f64,
    /// Nm·s/kg
    pub moment_impulse: f64,
}

/// Ground reaction force metrics for one contact (BW-normalized)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceMetrics {
    /// BW
    pub peak_grf: f64,
    /// BW
    pub mean_grf: f64,
    /// Seconds
    pub contact_time: f64,
    /// Seconds
    pub time_to_peak: f64,
    /// BW/s
    pub loading_rate: f64,
    /// N·s (raw force)
    pub impulse: f64,
}

/// Bilateral comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymmetryMetrics {
    /// Percent
    pub symmetry_index: f64,
    /// Right / left
    pub asymmetry_ratio: f64,
    pub difference: f64,
    /// Percent
    pub bilateral_deficit: f64,
}

impl Default for SymmetryMetrics {
    fn default() -> Self {
        Self {
            symmetry_index: 0.0,
            asymmetry_ratio: 1.0,
            difference: 0.0,
            bilateral_deficit: 0.0,
        }
    }
}

/// Agreement between a measured and a reference series
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    pub rmse: f64,
    pub mae: f64,
    /// ICC(2,1), clamped to [0, 1]
    pub icc: f64,
    pub r_squared: f64,
    /// Percent
    pub cv: f64,
}

/// Descriptive statistics across repetitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RepetitionStats {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Percent
    pub cv: f64,
    pub count: usize,
}

/// Position of a value relative to a reference band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStatus {
    Normal,
    Below,
    Above,
}

/// Comparison of one metric against its reference band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceComparison {
    pub metric: String,
    pub value: f64,
    pub reference_min: f64,
    pub reference_max: f64,
    pub reference_mean: f64,
    pub status: ReferenceStatus,
    /// Percent of the reference mean
    pub deviation_percent: f64,
}

/// Composite 0–100 score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionalScore {
    pub total: f64,
    pub rom_component: f64,
    pub symmetry_component: f64,
    pub grf_component: f64,
}

/// Tagged union over the five metrics record shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricsRecord {
    Kinematic(KinematicMetrics),
    Dynamic(DynamicMetrics),
    Force(ForceMetrics),
    Symmetry(SymmetryMetrics),
    Validation(ValidationMetrics),
}

impl MetricsRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            MetricsRecord::Kinematic(_) => "kinematic",
            MetricsRecord::Dynamic(_) => "dynamic",
            MetricsRecord::Force(_) => "force",
            MetricsRecord::Symmetry(_) => "symmetry",
            MetricsRecord::Validation(_) => "validation",
        }
    }
}

macro_rules! impl_record_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for MetricsRecord {
                fn from(metrics: $ty) -> Self {
                    MetricsRecord::$variant(metrics)
                }
            }
        )*
    };
}

impl_record_from! {
    Kinematic => KinematicMetrics,
    Dynamic => DynamicMetrics,
    Force => ForceMetrics,
    Symmetry => SymmetryMetrics,
    Validation => ValidationMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_symmetry_has_unit_ratio() {
        let empty = SymmetryMetrics::default();
        assert_eq!(empty.asymmetry_ratio, 1.0);
        assert_eq!(empty.symmetry_index, 0.0);
    }

    #[test]
    fn test_record_tagging() {
        let record = MetricsRecord::Force(ForceMetrics {
            peak_grf: 2.0,
            ..Default::default()
        });
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["kind"], "force");
        assert_eq!(json["peak_grf"], 2.0);
        assert_eq!(record.kind(), "force");
    }
}
