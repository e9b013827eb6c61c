//! Knee joint estimates from segment gyroscopes and vertical force.

use conditioning::cumulative_trapezoid;
use contracts::{imu_signal_key, BodyLocation, ProcessedSignals};

/// Sagittal (flexion/extension) gyroscope axis
pub const SAGITTAL_AXIS: usize = 1;

/// Body side of a knee
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Side {
    Right,
    Left,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Right, Side::Left];

    /// Map key, e.g. `knee_right`
    pub fn joint(&self) -> &'static str {
        match self {
            Side::Right => "knee_right",
            Side::Left => "knee_left",
        }
    }

    fn segments(&self) -> (BodyLocation, BodyLocation) {
        match self {
            Side::Right => (BodyLocation::FemurRight, BodyLocation::TibiaRight),
            Side::Left => (BodyLocation::FemurLeft, BodyLocation::TibiaLeft),
        }
    }
}

/// Knee kinematics on the common grid
#[derive(Debug, Clone, PartialEq)]
pub struct KneeTrace {
    pub side: Side,
    /// deg
    pub angle: Vec<f64>,
    /// rad/s, femur minus tibia
    pub angular_velocity: Vec<f64>,
}

/// Relative sagittal angular velocity integrated to a knee angle
///
/// `None` unless both femur and tibia gyroscopes of that side were processed.
pub fn knee_trace(signals: &ProcessedSignals, side: Side, dt: f64) -> Option<KneeTrace> {
    let (femur, tibia) = side.segments();
    let femur_gyro = signals.axis(&imu_signal_key(femur, "gyro"), SAGITTAL_AXIS)?;
    let tibia_gyro = signals.axis(&imu_signal_key(tibia, "gyro"), SAGITTAL_AXIS)?;
    let angular_velocity: Vec<f64> = femur_gyro
        .iter()
        .zip(tibia_gyro)
        .map(|(f, t)| f - t)
        .collect();
    let angle = cumulative_trapezoid(&angular_velocity, dt, 0.0)
        .into_iter()
        .map(f64::to_degrees)
        .collect();
    Some(KneeTrace {
        side,
        angle,
        angular_velocity,
    })
}

/// Quasi-static knee moment (Nm)
///
/// `M = fz_share · shank_length · sin(θ / 2)`: the share of vertical force
/// carried by one knee acting at the horizontal reach of the shank. Knee
/// flexion splits evenly between shank and thigh tilt in a symmetric squat,
/// so the shank leans by half the knee angle.
pub fn quasi_static_moment(fz: &[f64], angle_deg: &[f64], shank_length_m: f64, share: f64) -> Vec<f64> {
    fz.iter()
        .zip(angle_deg)
        .map(|(f, a)| f * share * shank_length_m * shank_tilt(*a).sin())
        .collect()
}

/// Shank inclination from vertical (rad) for a knee angle in degrees
fn shank_tilt(knee_angle_deg: f64) -> f64 {
    0.5 * knee_angle_deg.to_radians()
}
