//! Threshold rules.
//!
//! Each rule maps one value to zero or one [`AlertDraft`]. Rules hold no
//! state; the engine assigns ids and timestamps.

use contracts::{
    AlertCategory, AlertThresholds, AnalysisConfig, ExerciseProfile, QualityConfig, Severity,
};

/// Alert content before it is logged
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub severity: Severity,
    pub category: AlertCategory,
    pub title: String,
    pub message: String,
    pub value: Option<f64>,
    pub threshold: Option<f64>,
    pub recommendation: String,
}

impl AlertDraft {
    fn new(severity: Severity, category: AlertCategory, title: &str, message: String) -> Self {
        Self {
            severity,
            category,
            title: title.to_string(),
            message,
            value: None,
            threshold: None,
            recommendation: String::new(),
        }
    }

    fn measured(mut self, value: f64, threshold: f64) -> Self {
        self.value = Some(value);
        self.threshold = Some(threshold);
        self
    }

    fn recommend(mut self, recommendation: &str) -> Self {
        self.recommendation = recommendation.to_string();
        self
    }
}

/// Threshold tables for one exercise
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRules {
    pub exercise: String,
    pub thresholds: AlertThresholds,
    pub quality: QualityConfig,
    pub profile: ExerciseProfile,
}

impl Default for AlertRules {
    fn default() -> Self {
        Self::for_exercise(&AnalysisConfig::default(), "squat")
    }
}

impl AlertRules {
    /// Rules for `exercise`, falling back to the default profile for unknown tags
    pub fn for_exercise(config: &AnalysisConfig, exercise: &str) -> Self {
        Self {
            exercise: exercise.to_ascii_lowercase(),
            thresholds: config.alerts.clone(),
            quality: config.quality.clone(),
            profile: config.profile(exercise).clone(),
        }
    }

    /// ROM outside the exercise band (deg)
    pub fn rom(&self, rom: f64, joint: &str) -> Option<AlertDraft> {
        let band = self.profile.rom_band_deg;
        let stiff = band.min * self.thresholds.rom_error_fraction;
        let hypermobile = band.max * self.thresholds.rom_hypermobility_factor;

        if rom < stiff {
            Some(
                AlertDraft::new(
                    Severity::Error,
                    AlertCategory::Kinematic,
                    "Limited ROM",
                    format!(
                        "{joint} range of motion is {rom:.1}°, well below the normal range ({:.1}-{:.1}°).",
                        band.min, band.max
                    ),
                )
                .measured(rom, stiff)
                .recommend("Assess joint stiffness, contracture or limiting pain. Consider progressive mobility work."),
            )
        } else if rom < band.min {
            Some(
                AlertDraft::new(
                    Severity::Warning,
                    AlertCategory::Kinematic,
                    "Reduced ROM",
                    format!(
                        "{joint} range of motion ({rom:.1}°) is below the normal range ({:.1}-{:.1}°).",
                        band.min, band.max
                    ),
                )
                .measured(rom, band.min)
                .recommend("Keep monitoring. Consider a mobility protocol if it persists."),
            )
        } else if rom > hypermobile {
            Some(
                AlertDraft::new(
                    Severity::Warning,
                    AlertCategory::Kinematic,
                    "Hypermobility Detected",
                    format!(
                        "{joint} range of motion ({rom:.1}°) is well above the normal range ({:.1}-{:.1}°).",
                        band.min, band.max
                    ),
                )
                .measured(rom, hypermobile)
                .recommend("Assess ligament laxity and joint instability. Consider periarticular strengthening."),
            )
        } else {
            None
        }
    }

    /// Peak angular velocity ceiling (deg/s)
    pub fn angular_velocity(&self, peak_deg_s: f64) -> Option<AlertDraft> {
        let threshold = self.thresholds.max_angular_velocity_deg_s;
        if peak_deg_s <= threshold {
            return None;
        }
        let severity = if peak_deg_s > threshold * self.thresholds.angular_velocity_critical_factor {
            Severity::Critical
        } else {
            Severity::Warning
        };
        Some(
            AlertDraft::new(
                severity,
                AlertCategory::Kinematic,
                "Excessive Angular Velocity",
                format!(
                    "Angular velocity of {peak_deg_s:.1} deg/s exceeds the safe limit ({threshold:.1} deg/s)."
                ),
            )
            .measured(peak_deg_s, threshold)
            .recommend("Slow the movement down. Uncontrolled ballistic motion raises ligament and meniscus injury risk."),
        )
    }

    /// Mass-normalized knee moment ceiling (Nm/kg)
    pub fn moment(&self, moment_nm_kg: f64) -> Option<AlertDraft> {
        let threshold = self.profile.max_moment_nm_kg;
        if moment_nm_kg <= threshold {
            return None;
        }
        let severity = if moment_nm_kg > threshold * self.thresholds.moment_error_factor {
            Severity::Error
        } else {
            Severity::Warning
        };
        Some(
            AlertDraft::new(
                severity,
                AlertCategory::Dynamic,
                "High Joint Moment",
                format!(
                    "Knee moment ({moment_nm_kg:.2} Nm/kg) exceeds the recommended limit ({threshold:.2} Nm/kg)."
                ),
            )
            .measured(moment_nm_kg, threshold)
            .recommend("Joint overload detected. Reduce external load or range. Review technique and progressive strengthening."),
        )
    }

    /// Peak GRF against the exercise band (BW)
    pub fn grf(&self, peak_bw: f64) -> Option<AlertDraft> {
        let band = self.profile.grf_band_bw;
        let exercise = &self.exercise;
        if peak_bw < band.min {
            Some(
                AlertDraft::new(
                    Severity::Warning,
                    AlertCategory::Force,
                    "Insufficient Load",
                    format!(
                        "Peak GRF ({peak_bw:.2} BW) is below the expected minimum for {exercise} ({:.2} BW).",
                        band.min
                    ),
                )
                .measured(peak_bw, band.min)
                .recommend("Check that the movement is completed. The patient may be avoiding full loading."),
            )
        } else if peak_bw > band.max {
            let severity = if peak_bw > band.max * self.thresholds.grf_critical_factor {
                Severity::Critical
            } else {
                Severity::Error
            };
            Some(
                AlertDraft::new(
                    severity,
                    AlertCategory::Force,
                    "Excessive Impact",
                    format!(
                        "Peak GRF ({peak_bw:.2} BW) exceeds the recommended maximum for {exercise} ({:.2} BW).",
                        band.max
                    ),
                )
                .measured(peak_bw, band.max)
                .recommend("Reduce intensity or height. High impact injury risk. Teach soft landing and force absorption."),
            )
        } else {
            None
        }
    }

    /// Loading rate ceiling (BW/s)
    pub fn loading_rate(&self, rate_bw_s: f64) -> Option<AlertDraft> {
        let threshold = self.thresholds.max_loading_rate_bw_s;
        if rate_bw_s <= threshold {
            return None;
        }
        let severity = if rate_bw_s > threshold * self.thresholds.loading_rate_critical_factor {
            Severity::Critical
        } else {
            Severity::Error
        };
        Some(
            AlertDraft::new(
                severity,
                AlertCategory::Force,
                "High Loading Rate",
                format!(
                    "Loading rate ({rate_bw_s:.1} BW/s) exceeds the safe limit ({threshold:.1} BW/s)."
                ),
            )
            .measured(rate_bw_s, threshold)
            .recommend("High impact injury risk. Teach gradual absorption. Consider a softer surface or lower height."),
        )
    }

    /// Bilateral symmetry index bands (%)
    pub fn symmetry(&self, symmetry_index_pct: f64) -> Option<AlertDraft> {
        let severe = self.profile.asymmetry_severe_pct;
        let moderate = self.profile.asymmetry_moderate_pct;
        if symmetry_index_pct > severe {
            Some(
                AlertDraft::new(
                    Severity::Error,
                    AlertCategory::Symmetry,
                    "Severe Asymmetry",
                    format!(
                        "Bilateral asymmetry of {symmetry_index_pct:.1}% exceeds the critical limit ({severe:.1}%)."
                    ),
                )
                .measured(symmetry_index_pct, severe)
                .recommend("Assess compensation, muscle weakness or unilateral pain. Prioritize bilateral balance work."),
            )
        } else if symmetry_index_pct > moderate {
            Some(
                AlertDraft::new(
                    Severity::Warning,
                    AlertCategory::Symmetry,
                    "Moderate Asymmetry",
                    format!(
                        "Bilateral asymmetry of {symmetry_index_pct:.1}% is above the acceptable limit ({moderate:.1}%)."
                    ),
                )
                .measured(symmetry_index_pct, moderate)
                .recommend("Monitor asymmetry. Consider unilateral work for the weaker limb."),
            )
        } else {
            None
        }
    }

    /// Non-finite samples, flat signal or excessive outliers
    pub fn data_quality(&self, signal: &[f64], name: &str) -> Option<AlertDraft> {
        if signal.is_empty() {
            return None;
        }
        if signal.iter().any(|v| !v.is_finite()) {
            return Some(
                AlertDraft::new(
                    Severity::Error,
                    AlertCategory::Technical,
                    "Invalid Data",
                    format!("{name} contains NaN or infinite values."),
                )
                .recommend("Check sensor connection and calibration. Restart the capture if it persists."),
            );
        }

        let n = signal.len() as f64;
        let mean = signal.iter().sum::<f64>() / n;
        let std = (signal.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        if std < self.quality.flat_std_threshold {
            return Some(
                AlertDraft::new(
                    Severity::Error,
                    AlertCategory::Technical,
                    "Constant Signal",
                    format!(
                        "{name} shows no variation (std < {:e}).",
                        self.quality.flat_std_threshold
                    ),
                )
                .recommend("The sensor may be disconnected or frozen. Check the connection and restart the device."),
            );
        }

        let outliers = signal
            .iter()
            .filter(|v| ((*v - mean) / std).abs() > self.quality.outlier_z)
            .count();
        let fraction = outliers as f64 / n;
        if fraction > self.quality.outlier_fraction {
            return Some(
                AlertDraft::new(
                    Severity::Warning,
                    AlertCategory::Technical,
                    "Excessive Noise",
                    format!("{name} contains {:.1}% extreme outliers.", fraction * 100.0),
                )
                .measured(fraction, self.quality.outlier_fraction)
                .recommend("Signal quality is compromised. Check interference, calibration and sensor attachment."),
            );
        }
        None
    }

    /// Synchronization quality score in [0, 1]
    pub fn sync_quality(&self, quality: f64) -> Option<AlertDraft> {
        let error = self.quality.sync_quality_error;
        let warning = self.quality.sync_quality_warning;
        if quality < error {
            Some(
                AlertDraft::new(
                    Severity::Error,
                    AlertCategory::Technical,
                    "Poor Synchronization",
                    format!("Synchronization quality ({:.1}%) is insufficient.", quality * 100.0),
                )
                .measured(quality, error)
                .recommend("IMU and force platform data may be misaligned. Check time markers and repeat the capture."),
            )
        } else if quality < warning {
            Some(
                AlertDraft::new(
                    Severity::Warning,
                    AlertCategory::Technical,
                    "Suboptimal Synchronization",
                    format!(
                        "Synchronization quality ({:.1}%) is acceptable but not ideal.",
                        quality * 100.0
                    ),
                )
                .measured(quality, warning)
                .recommend("Consider repeating the capture to improve timing accuracy."),
            )
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squat() -> AlertRules {
        AlertRules::default()
    }

    #[test]
    fn test_rom_bands() {
        let mut rules = squat();
        rules.profile.rom_band_deg = contracts::Band::new(60.0, 130.0);
        assert_eq!(rules.rom(30.0, "knee").map(|a| a.severity), Some(Severity::Error));
        assert_eq!(rules.rom(50.0, "knee").map(|a| a.severity), Some(Severity::Warning));
        assert!(rules.rom(90.0, "knee").is_none());
        let hyper = rules.rom(170.0, "knee").unwrap();
        assert_eq!(hyper.title, "Hypermobility Detected");
        assert!((hyper.threshold.unwrap() - 156.0).abs() < 1e-9);
    }

    #[test]
    fn test_angular_velocity_escalates() {
        let rules = squat();
        assert!(rules.angular_velocity(400.0).is_none());
        assert_eq!(rules.angular_velocity(600.0).unwrap().severity, Severity::Warning);
        assert_eq!(rules.angular_velocity(800.0).unwrap().severity, Severity::Critical);
    }

    #[test]
    fn test_moment_escalates() {
        let rules = squat();
        assert!(rules.moment(3.0).is_none());
        assert_eq!(rules.moment(4.0).unwrap().severity, Severity::Warning);
        assert_eq!(rules.moment(5.0).unwrap().severity, Severity::Error);
    }

    #[test]
    fn test_grf_uses_exercise_band() {
        let rules = squat();
        assert!(rules.grf(2.0).is_none());
        assert_eq!(rules.grf(0.5).unwrap().severity, Severity::Warning);
        assert_eq!(rules.grf(3.0).unwrap().severity, Severity::Error);
        assert_eq!(rules.grf(6.0).unwrap().severity, Severity::Critical);

        let jump = AlertRules::for_exercise(&AnalysisConfig::default(), "Jump");
        assert!(jump.grf(4.5).is_none());
        assert!(jump.grf(6.0).unwrap().message.contains("jump"));
    }

    #[test]
    fn test_loading_rate_and_symmetry() {
        let rules = squat();
        assert!(rules.loading_rate(50.0).is_none());
        assert_eq!(rules.loading_rate(80.0).unwrap().severity, Severity::Error);
        assert_eq!(rules.loading_rate(120.0).unwrap().severity, Severity::Critical);

        assert!(rules.symmetry(5.0).is_none());
        assert_eq!(rules.symmetry(15.0).unwrap().severity, Severity::Warning);
        assert_eq!(rules.symmetry(25.0).unwrap().severity, Severity::Error);
    }

    #[test]
    fn test_data_quality() {
        let rules = squat();
        assert_eq!(
            rules.data_quality(&[1.0, f64::NAN], "fz").unwrap().title,
            "Invalid Data"
        );
        assert_eq!(rules.data_quality(&[2.0; 50], "fz").unwrap().title, "Constant Signal");

        let smooth: Vec<f64> = (0..200).map(|i| (i as f64 * 0.1).sin()).collect();
        assert!(rules.data_quality(&smooth, "acc").is_none());
        assert!(rules.data_quality(&[], "acc").is_none());
    }

    #[test]
    fn test_outlier_fraction() {
        let mut rules = squat();
        rules.quality.outlier_z = 2.0;
        // Every tenth sample spikes: |z| = 3 for 10% of samples
        let spiky: Vec<f64> = (0..500).map(|i| if i % 10 == 0 { 100.0 } else { 0.0 }).collect();
        let alert = rules.data_quality(&spiky, "acc").unwrap();
        assert_eq!(alert.title, "Excessive Noise");
        assert_eq!(alert.severity, Severity::Warning);

        // A single spike is far out but rare
        let mut single = vec![0.0; 500];
        single[250] = 100.0;
        assert!(squat().data_quality(&single, "acc").is_none());
    }

    #[test]
    fn test_sync_quality() {
        let rules = squat();
        assert_eq!(rules.sync_quality(0.5).unwrap().severity, Severity::Error);
        assert_eq!(rules.sync_quality(0.8).unwrap().severity, Severity::Warning);
        assert!(rules.sync_quality(0.95).is_none());
    }
}
