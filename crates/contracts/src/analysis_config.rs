//! Analysis configuration contracts shared across crates.
//!
//! Fixed at construction and read-only afterwards. Every section defaults to
//! the clinical reference values, so a config file only lists overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::BodyLocation;

/// Top-level analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AnalysisConfig {
    #[validate(nested)]
    pub sync: SyncConfig,
    #[validate(nested)]
    pub filter: FilterConfig,
    #[validate(nested)]
    pub events: EventConfig,
    #[validate(nested)]
    pub quality: QualityConfig,
    #[validate(nested)]
    pub alerts: AlertThresholds,
    #[validate(nested)]
    pub physics: PhysicsConfig,
    #[validate(nested)]
    pub scoring: ScoringConfig,
    /// Profile used for exercise tags missing from `exercises`
    #[validate(nested)]
    pub default_exercise: ExerciseProfile,
    /// Per-exercise thresholds keyed by lowercase tag; entries read from a
    /// file are merged over the built-in catalog
    #[serde(deserialize_with = "merge_with_catalog")]
    pub exercises: BTreeMap<String, ExerciseProfile>,
}

fn merge_with_catalog<'de, D>(deserializer: D) -> Result<BTreeMap<String, ExerciseProfile>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<String, ExerciseProfile>::deserialize(deserializer)?;
    let mut catalog = default_exercise_catalog();
    catalog.extend(overrides);
    Ok(catalog)
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            filter: FilterConfig::default(),
            events: EventConfig::default(),
            quality: QualityConfig::default(),
            alerts: AlertThresholds::default(),
            physics: PhysicsConfig::default(),
            scoring: ScoringConfig::default(),
            default_exercise: ExerciseProfile::default(),
            exercises: default_exercise_catalog(),
        }
    }
}

impl AnalysisConfig {
    /// Profile for an exercise tag (case-insensitive), falling back to the default
    pub fn profile(&self, exercise: &str) -> &ExerciseProfile {
        self.exercises
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(exercise))
            .map(|(_, profile)| profile)
            .unwrap_or(&self.default_exercise)
    }
}

/// Temporal synchronization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SyncConfig {
    /// Common grid rate (Hz)
    #[validate(range(exclusive_min = 0.0))]
    pub target_frequency_hz: f64,
    pub interpolation: InterpolationKind,
    /// Offset magnitude clamp (seconds)
    #[validate(range(min = 0.0))]
    pub max_time_offset_s: f64,
    /// Offsets at or below this are not applied to the grid (seconds)
    #[validate(range(min = 0.0))]
    pub min_significant_offset_s: f64,
    /// Minimum samples per stream
    #[validate(range(min = 2))]
    pub min_samples: usize,
    /// IMU locations tried in order for the offset reference
    pub reference_priority: Vec<BodyLocation>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            target_frequency_hz: 100.0,
            interpolation: InterpolationKind::Cubic,
            max_time_offset_s: 0.5,
            min_significant_offset_s: 0.01,
            min_samples: 10,
            reference_priority: vec![
                BodyLocation::Pelvis,
                BodyLocation::FemurRight,
                BodyLocation::FemurLeft,
            ],
        }
    }
}

/// Resampling method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationKind {
    Linear,
    #[default]
    Cubic,
}

/// Low-pass filter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FilterConfig {
    /// Butterworth order
    #[validate(range(min = 1, max = 10))]
    pub order: usize,
    #[validate(range(exclusive_min = 0.0))]
    pub imu_acc_cutoff_hz: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub imu_gyro_cutoff_hz: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub force_cutoff_hz: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            order: 4,
            imu_acc_cutoff_hz: 20.0,
            imu_gyro_cutoff_hz: 15.0,
            force_cutoff_hz: 50.0,
        }
    }
}

/// Event detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EventConfig {
    /// Seconds
    #[validate(range(min = 0.0))]
    pub min_contact_duration_s: f64,
    /// Seconds
    #[validate(range(min = 0.0))]
    pub min_repetition_duration_s: f64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            min_contact_duration_s: 0.1,
            min_repetition_duration_s: 0.5,
        }
    }
}

/// Technical signal-quality rule settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct QualityConfig {
    /// Standard deviation below which a signal counts as constant
    #[validate(range(min = 0.0))]
    pub flat_std_threshold: f64,
    /// |z| above which a sample is an outlier
    #[validate(range(exclusive_min = 0.0))]
    pub outlier_z: f64,
    /// Outlier share (0–1) that raises a warning
    #[validate(range(min = 0.0, max = 1.0))]
    pub outlier_fraction: f64,
    /// Sync quality below this is an error
    #[validate(range(min = 0.0, max = 1.0))]
    pub sync_quality_error: f64,
    /// Sync quality below this is a warning
    #[validate(range(min = 0.0, max = 1.0))]
    pub sync_quality_warning: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            flat_std_threshold: 1e-6,
            outlier_z: 5.0,
            outlier_fraction: 0.05,
            sync_quality_error: 0.7,
            sync_quality_warning: 0.85,
        }
    }
}

/// Exercise-independent alert thresholds and escalation factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AlertThresholds {
    /// deg/s
    #[validate(range(exclusive_min = 0.0))]
    pub max_angular_velocity_deg_s: f64,
    #[validate(range(min = 1.0))]
    pub angular_velocity_critical_factor: f64,
    #[validate(range(min = 1.0))]
    pub moment_error_factor: f64,
    /// BW/s
    #[validate(range(exclusive_min = 0.0))]
    pub max_loading_rate_bw_s: f64,
    #[validate(range(min = 1.0))]
    pub loading_rate_critical_factor: f64,
    #[validate(range(min = 1.0))]
    pub grf_critical_factor: f64,
    /// ROM below `rom_min * fraction` is an error
    #[validate(range(min = 0.0, max = 1.0))]
    pub rom_error_fraction: f64,
    /// ROM above `rom_max * factor` is hypermobility
    #[validate(range(min = 1.0))]
    pub rom_hypermobility_factor: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_angular_velocity_deg_s: 500.0,
            angular_velocity_critical_factor: 1.5,
            moment_error_factor: 1.3,
            max_loading_rate_bw_s: 75.0,
            loading_rate_critical_factor: 1.5,
            grf_critical_factor: 1.5,
            rom_error_fraction: 0.7,
            rom_hypermobility_factor: 1.2,
        }
    }
}

/// Physical constants and anthropometric defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PhysicsConfig {
    /// m/s²
    #[validate(range(exclusive_min = 0.0))]
    pub gravity: f64,
    /// Shank length as a fraction of body height
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub shank_length_ratio: f64,
    /// Used when the subject height is unknown (m)
    #[validate(range(exclusive_min = 0.0))]
    pub default_height_m: f64,
    /// Derive a quasi-static knee moment from Fz and knee angle
    pub estimate_knee_moment: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            shank_length_ratio: 0.246,
            default_height_m: 1.75,
            estimate_knee_moment: true,
        }
    }
}

/// Functional score weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ScoringConfig {
    /// ROM that earns the full ROM component (deg)
    #[validate(range(exclusive_min = 0.0))]
    pub rom_ceiling_deg: f64,
    #[validate(range(min = 0.0))]
    pub rom_points: f64,
    #[validate(range(min = 0.0))]
    pub symmetry_points: f64,
    /// Symmetry index that zeroes the symmetry component (%)
    #[validate(range(exclusive_min = 0.0))]
    pub symmetry_zero_at_pct: f64,
    #[validate(range(min = 0.0))]
    pub grf_points: f64,
    /// Peak GRF band earning full GRF points (BW)
    pub grf_band_bw: Band,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            rom_ceiling_deg: 135.0,
            rom_points: 40.0,
            symmetry_points: 30.0,
            symmetry_zero_at_pct: 15.0,
            grf_points: 30.0,
            grf_band_bw: Band::new(1.5, 3.0),
        }
    }
}

/// Closed numeric interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Thresholds for one exercise type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ExerciseProfile {
    /// Vertical force above which the foot counts as in contact (N)
    #[validate(range(min = 0.0))]
    pub contact_threshold_n: f64,
    /// Expected peak GRF (BW)
    pub grf_band_bw: Band,
    /// Expected knee ROM (deg)
    pub rom_band_deg: Band,
    /// Knee moment ceiling (Nm/kg)
    #[validate(range(exclusive_min = 0.0))]
    pub max_moment_nm_kg: f64,
    /// Symmetry index raising a warning (%)
    #[validate(range(min = 0.0))]
    pub asymmetry_moderate_pct: f64,
    /// Symmetry index raising an error (%)
    #[validate(range(min = 0.0))]
    pub asymmetry_severe_pct: f64,
    /// Compute jump height per contact
    pub jump: bool,
}

impl Default for ExerciseProfile {
    fn default() -> Self {
        Self {
            contact_threshold_n: 30.0,
            grf_band_bw: Band::new(0.5, 3.0),
            rom_band_deg: Band::new(0.0, 135.0),
            max_moment_nm_kg: 3.5,
            asymmetry_moderate_pct: 10.0,
            asymmetry_severe_pct: 20.0,
            jump: false,
        }
    }
}

impl ExerciseProfile {
    fn with(contact_threshold_n: f64, grf_band_bw: Band, jump: bool) -> Self {
        Self {
            contact_threshold_n,
            grf_band_bw,
            jump,
            ..Self::default()
        }
    }
}

/// Built-in exercise catalog
pub fn default_exercise_catalog() -> BTreeMap<String, ExerciseProfile> {
    let jump_band = Band::new(1.5, 5.0);
    [
        ("squat", ExerciseProfile::with(50.0, Band::new(0.8, 2.5), false)),
        ("jump", ExerciseProfile::with(20.0, jump_band, true)),
        ("walk", ExerciseProfile::with(20.0, Band::new(0.8, 1.5), false)),
        ("lunge", ExerciseProfile::with(50.0, Band::new(0.5, 3.0), false)),
        ("cmj", ExerciseProfile::with(20.0, jump_band, true)),
        ("squat_jump", ExerciseProfile::with(20.0, jump_band, true)),
    ]
    .into_iter()
    .map(|(tag, profile)| (tag.to_string(), profile))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sync.target_frequency_hz, 100.0);
        assert_eq!(config.filter.order, 4);
        assert_eq!(config.exercises.len(), 6);
    }

    #[test]
    fn test_profile_lookup() {
        let config = AnalysisConfig::default();
        assert_eq!(config.profile("squat").contact_threshold_n, 50.0);
        assert_eq!(config.profile("JUMP").grf_band_bw, Band::new(1.5, 5.0));
        assert!(config.profile("cmj").jump);
        // Unknown tags use the default profile
        assert_eq!(config.profile("cycling").contact_threshold_n, 30.0);
    }

    #[test]
    fn test_derive_rules_reject_bad_values() {
        let mut config = AnalysisConfig::default();
        config.sync.target_frequency_hz = 0.0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("target_frequency_hz"), "got: {err}");
    }

    #[test]
    fn test_band() {
        let band = Band::new(0.8, 2.5);
        assert!(band.contains(0.8));
        assert!(band.contains(2.5));
        assert!(!band.contains(2.6));
        assert!((band.midpoint() - 1.65).abs() < 1e-12);
    }
}
