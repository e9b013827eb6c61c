//! Synthetic capture sessions
//!
//! Generates a deterministic (seeded) IMU + force platform session for tests
//! and demos without hardware. The subject steps onto the platform after
//! `step_on_s`, performs the repetitions, and steps off `step_on_s` before the
//! end.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use contracts::{
    BodyLocation, Channel, ForceCapture, ForceChannel, ImuCapture, ImuChannel, ImuChannels,
    SessionInput, SubjectInfo,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{IngestionError, Result};

const GRAVITY: f64 = 9.81;
/// Flight phase of one jump repetition
const FLIGHT_S: f64 = 0.35;
/// Width of an injected impact spike
const SPIKE_WIDTH_S: f64 = 0.04;

/// Synthetic session parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    /// Exercise tag; `jump`, `cmj` and `squat_jump` add flight phases
    pub exercise: String,
    pub duration_s: f64,
    pub imu_rate_hz: f64,
    pub force_rate_hz: f64,
    pub body_mass_kg: f64,
    pub height_m: Option<f64>,
    pub repetitions: usize,
    /// Peak vertical load per repetition (BW)
    pub peak_load_bw: f64,
    /// Right knee flexion at the bottom of each repetition (deg)
    pub knee_rom_deg: f64,
    /// Left knee ROM as a fraction of the right
    pub left_ratio: f64,
    /// IMU clock reads this much later than the force clock (s)
    pub imu_offset_s: f64,
    /// Impact spike injected into the first repetition (BW)
    pub spike_bw: Option<f64>,
    /// Time off the platform at each end (s)
    pub step_on_s: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            exercise: "squat".to_string(),
            duration_s: 6.0,
            imu_rate_hz: 60.0,
            force_rate_hz: 1000.0,
            body_mass_kg: 70.0,
            height_m: Some(1.75),
            repetitions: 2,
            peak_load_bw: 2.0,
            knee_rom_deg: 90.0,
            left_ratio: 0.96,
            imu_offset_s: 0.0,
            spike_bw: None,
            step_on_s: 0.3,
            seed: 42,
        }
    }
}

/// Builder for a synthetic [`SessionInput`]
#[derive(Debug, Clone, Default)]
pub struct SyntheticSession {
    config: SyntheticConfig,
}

impl SyntheticSession {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    /// Bodyweight squats
    pub fn squat() -> Self {
        Self::default()
    }

    /// Countermovement jumps landing back on the platform
    pub fn jump() -> Self {
        Self::new(SyntheticConfig {
            exercise: "jump".to_string(),
            peak_load_bw: 2.5,
            knee_rom_deg: 70.0,
            ..SyntheticConfig::default()
        })
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.config.repetitions = repetitions;
        self
    }

    pub fn with_duration(mut self, duration_s: f64) -> Self {
        self.config.duration_s = duration_s;
        self
    }

    pub fn with_body_mass(mut self, body_mass_kg: f64) -> Self {
        self.config.body_mass_kg = body_mass_kg;
        self
    }

    pub fn with_imu_offset(mut self, offset_s: f64) -> Self {
        self.config.imu_offset_s = offset_s;
        self
    }

    pub fn with_spike(mut self, spike_bw: f64) -> Self {
        self.config.spike_bw = Some(spike_bw);
        self
    }

    fn is_jump(&self) -> bool {
        matches!(self.config.exercise.as_str(), "jump" | "cmj" | "squat_jump")
    }

    fn validate(&self) -> Result<()> {
        let c = &self.config;
        let positive = [
            ("duration_s", c.duration_s),
            ("imu_rate_hz", c.imu_rate_hz),
            ("force_rate_hz", c.force_rate_hz),
            ("body_mass_kg", c.body_mass_kg),
            ("peak_load_bw", c.peak_load_bw),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(IngestionError::invalid_parameter(
                    name,
                    format!("must be positive, got {value}"),
                ));
            }
        }
        if c.repetitions == 0 {
            return Err(IngestionError::invalid_parameter(
                "repetitions",
                "at least one repetition required",
            ));
        }
        let active = c.duration_s - 2.0 * c.step_on_s;
        let min_cycle = if self.is_jump() { FLIGHT_S + 0.6 } else { 0.6 };
        if active / c.repetitions as f64 <= min_cycle {
            return Err(IngestionError::invalid_parameter(
                "duration_s",
                format!(
                    "{}s leaves too little time for {} repetitions",
                    c.duration_s, c.repetitions
                ),
            ));
        }
        if c.imu_offset_s.abs() >= c.duration_s / 2.0 {
            return Err(IngestionError::invalid_parameter(
                "imu_offset_s",
                "offset must stay below half the duration",
            ));
        }
        Ok(())
    }

    /// Seconds per repetition on the platform
    fn cycle_s(&self) -> f64 {
        (self.config.duration_s - 2.0 * self.config.step_on_s) / self.config.repetitions as f64
    }

    /// Repetition index and phase in [0, 1), or `None` off the platform
    fn phase(&self, t: f64) -> Option<(usize, f64)> {
        let start = self.config.step_on_s;
        let end = self.config.duration_s - self.config.step_on_s;
        if t < start || t >= end {
            return None;
        }
        let cycle = self.cycle_s();
        let elapsed = t - start;
        let rep = ((elapsed / cycle) as usize).min(self.config.repetitions - 1);
        Some((rep, (elapsed - rep as f64 * cycle) / cycle))
    }

    /// Right knee flexion (rad) at true time `t`
    fn knee_angle(&self, t: f64) -> f64 {
        let amplitude = self.config.knee_rom_deg.to_radians() / 2.0;
        self.phase(t)
            .map_or(0.0, |(_, u)| amplitude * (1.0 - (2.0 * PI * u).cos()))
    }

    /// d/dt of [`knee_angle`](Self::knee_angle)
    fn knee_rate(&self, t: f64) -> f64 {
        let amplitude = self.config.knee_rom_deg.to_radians() / 2.0;
        let omega = 2.0 * PI / self.cycle_s();
        self.phase(t)
            .map_or(0.0, |(_, u)| amplitude * omega * (2.0 * PI * u).sin())
    }

    /// Noise-free vertical force (N) at true time `t`
    fn vertical_force(&self, t: f64) -> f64 {
        let body_weight = self.config.body_mass_kg * GRAVITY;
        let Some((rep, u)) = self.phase(t) else {
            return 0.0;
        };
        let extra = self.config.peak_load_bw - 1.0;

        let mut force = if self.is_jump() {
            let cycle = self.cycle_s();
            let flight = FLIGHT_S / cycle;
            let push_end = (1.0 - flight) / 2.0;
            if u < push_end {
                body_weight * (1.0 + extra * (PI * u / push_end).sin())
            } else if u < push_end + flight {
                0.0
            } else {
                let v = (u - push_end - flight) / (1.0 - push_end - flight);
                body_weight * (1.0 + extra * (PI * v).sin())
            }
        } else {
            body_weight * (1.0 + extra * (PI * u).sin().powi(2))
        };

        if let Some(spike) = self.config.spike_bw.filter(|_| rep == 0) {
            // Flat top over the middle half of the spike window
            let centre = self.config.step_on_s + self.cycle_s() * 0.25;
            let d = (t - centre).abs();
            let half = SPIKE_WIDTH_S / 2.0;
            if d < half {
                let shape = ((half - d) / (half / 2.0)).min(1.0);
                force = force.max(spike * body_weight * shape);
            }
        }
        force
    }

    /// Generate the session
    pub fn build(&self) -> Result<SessionInput> {
        self.validate()?;
        let c = &self.config;
        let mut rng = StdRng::seed_from_u64(c.seed);

        let force_time = clock(c.duration_s, c.force_rate_hz);
        let fz: Vec<f64> = force_time
            .iter()
            .map(|&t| {
                let clean = self.vertical_force(t);
                if clean > 0.0 {
                    (clean + gaussian(&mut rng, 5.0)).max(0.0)
                } else {
                    0.0
                }
            })
            .collect();
        let mut channels = BTreeMap::new();
        for (kind, sigma) in [
            (ForceChannel::Fx, 15.0),
            (ForceChannel::Fy, 15.0),
            (ForceChannel::Mx, 4.0),
            (ForceChannel::My, 4.0),
            (ForceChannel::Mz, 2.0),
        ] {
            let values = force_time.iter().map(|_| gaussian(&mut rng, sigma)).collect();
            channels.insert(kind, values);
        }
        channels.insert(ForceChannel::Fz, fz);

        // IMU samples taken at true time t carry the timestamp t + offset
        let true_time = clock(c.duration_s, c.imu_rate_hz);
        let imu_time: Vec<f64> = true_time.iter().map(|t| t + c.imu_offset_s).collect();

        let mut sensors = BTreeMap::new();
        let pelvis_acc = triad(&true_time, &mut rng, 0.3, |t| self.vertical_force(t) / c.body_mass_kg);
        let pelvis_gyro = triad(&true_time, &mut rng, 0.05, |_| 0.0);
        let pelvis_quat = self.trunk_orientation(&true_time, &mut rng);
        sensors.insert(
            BodyLocation::Pelvis,
            ImuChannels::from([
                (ImuChannel::Acceleration, pelvis_acc),
                (ImuChannel::Gyroscope, pelvis_gyro),
                (ImuChannel::Quaternion, pelvis_quat),
            ]),
        );

        for (femur, tibia, gain) in [
            (BodyLocation::FemurRight, BodyLocation::TibiaRight, 1.0),
            (BodyLocation::FemurLeft, BodyLocation::TibiaLeft, c.left_ratio),
        ] {
            // Sagittal rotation lives on axis 1; the femur carries the relative motion
            let femur_gyro = sagittal(&true_time, &mut rng, 0.02, |t| gain * self.knee_rate(t));
            let femur_acc = triad(&true_time, &mut rng, 0.3, |_| GRAVITY);
            let tibia_gyro = sagittal(&true_time, &mut rng, 0.02, |_| 0.0);
            sensors.insert(
                femur,
                ImuChannels::from([
                    (ImuChannel::Acceleration, femur_acc),
                    (ImuChannel::Gyroscope, femur_gyro),
                ]),
            );
            sensors.insert(tibia, ImuChannels::from([(ImuChannel::Gyroscope, tibia_gyro)]));
        }

        debug!(
            exercise = %c.exercise,
            repetitions = c.repetitions,
            imu_samples = imu_time.len(),
            force_samples = force_time.len(),
            imu_offset_s = c.imu_offset_s,
            spike_bw = ?c.spike_bw,
            "Synthetic session generated"
        );

        Ok(SessionInput {
            imu: ImuCapture {
                time: imu_time,
                sensors,
            },
            force: ForceCapture {
                time: force_time,
                channels,
            },
            subject: SubjectInfo {
                body_mass_kg: c.body_mass_kg,
                height_m: c.height_m,
            },
            exercise: c.exercise.clone(),
        })
    }

    /// Unit quaternion leaning the trunk forward with knee flexion
    fn trunk_orientation(&self, time: &[f64], rng: &mut StdRng) -> Channel {
        let rows: Vec<[f64; 4]> = time
            .iter()
            .map(|&t| {
                let lean = 0.3 * self.knee_angle(t);
                let q = [
                    (lean / 2.0).cos(),
                    gaussian(rng, 0.005),
                    (lean / 2.0).sin(),
                    gaussian(rng, 0.005),
                ];
                let norm = q.iter().map(|v| v * v).sum::<f64>().sqrt();
                q.map(|v| v / norm)
            })
            .collect();
        Channel::from_rows(&rows)
    }

    /// Clock offset the synchronizer should report for this session
    pub fn expected_time_offset(&self) -> f64 {
        -self.config.imu_offset_s
    }
}

/// `0, 1/rate, ...` up to and including `duration`
fn clock(duration_s: f64, rate_hz: f64) -> Vec<f64> {
    let n = (duration_s * rate_hz).floor() as usize + 1;
    (0..n).map(|i| i as f64 / rate_hz).collect()
}

/// Box–Muller standard normal scaled by `sigma`
fn gaussian(rng: &mut StdRng, sigma: f64) -> f64 {
    let u1: f64 = rng.random_range(f64::EPSILON..1.0);
    let u2: f64 = rng.random();
    sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Noisy 3-axis channel with `vertical(t)` on axis 2
fn triad(time: &[f64], rng: &mut StdRng, sigma: f64, vertical: impl Fn(f64) -> f64) -> Channel {
    let rows: Vec<[f64; 3]> = time
        .iter()
        .map(|&t| {
            [
                gaussian(rng, sigma),
                gaussian(rng, sigma),
                vertical(t) + gaussian(rng, sigma),
            ]
        })
        .collect();
    Channel::from_rows(&rows)
}

/// Noisy 3-axis channel with `sagittal(t)` on axis 1
fn sagittal(time: &[f64], rng: &mut StdRng, sigma: f64, sagittal: impl Fn(f64) -> f64) -> Channel {
    let rows: Vec<[f64; 3]> = time
        .iter()
        .map(|&t| {
            [
                gaussian(rng, sigma * 2.0),
                sagittal(t) + gaussian(rng, sigma),
                gaussian(rng, sigma * 2.0),
            ]
        })
        .collect();
    Channel::from_rows(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_sessions_repeat() {
        let a = SyntheticSession::squat().with_seed(7).build().unwrap();
        let b = SyntheticSession::squat().with_seed(7).build().unwrap();
        let c = SyntheticSession::squat().with_seed(8).build().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_session_shape() {
        let session = SyntheticSession::squat().build().unwrap();
        assert_eq!(session.imu.len(), 361);
        assert_eq!(session.force.len(), 6001);
        assert!(session.imu.validate_shape().is_ok());
        assert!(session.force.validate_shape().is_ok());
        assert_eq!(session.imu.sensors.len(), 5);
        assert_eq!(session.force.channels.len(), 6);
        assert_eq!(session.exercise, "squat");
    }

    #[test]
    fn test_vertical_force_profile() {
        let session = SyntheticSession::squat().build().unwrap();
        let fz = session.force.channel(ForceChannel::Fz).unwrap();
        let body_weight = 70.0 * GRAVITY;
        let peak = fz.iter().cloned().fold(f64::MIN, f64::max);
        assert!((peak / body_weight - 2.0).abs() < 0.05, "peak {}", peak / body_weight);
        // Off the platform at both ends
        assert_eq!(fz[0], 0.0);
        assert_eq!(fz[fz.len() - 1], 0.0);
    }

    #[test]
    fn test_jump_has_flight_phases() {
        let generator = SyntheticSession::jump();
        let session = generator.build().unwrap();
        let fz = session.force.channel(ForceChannel::Fz).unwrap();
        let rising_edges = fz.windows(2).filter(|w| w[0] <= 0.0 && w[1] > 0.0).count();
        // Step on plus one landing per repetition
        assert_eq!(rising_edges, 1 + generator.config().repetitions);
    }

    #[test]
    fn test_spike_and_offset() {
        let generator = SyntheticSession::squat().with_spike(6.0).with_imu_offset(0.03);
        let session = generator.build().unwrap();
        let fz = session.force.channel(ForceChannel::Fz).unwrap();
        let peak = fz.iter().cloned().fold(f64::MIN, f64::max) / (70.0 * GRAVITY);
        assert!(peak > 5.8, "peak {peak}");
        assert!((session.imu.time[0] - 0.03).abs() < 1e-12);
        assert_eq!(generator.expected_time_offset(), -0.03);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(SyntheticSession::squat().with_repetitions(0).build().is_err());
        assert!(SyntheticSession::squat().with_body_mass(-1.0).build().is_err());
        assert!(SyntheticSession::squat().with_repetitions(50).build().is_err());
        assert!(SyntheticSession::squat().with_imu_offset(4.0).build().is_err());
    }
}
