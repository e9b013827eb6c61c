//! Raw capture input
//!
//! Produced by the acquisition layer and treated as immutable input.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{is_strictly_increasing, Channel, ContractError};

/// Anatomical sensor placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyLocation {
    Pelvis,
    FemurRight,
    FemurLeft,
    TibiaRight,
    TibiaLeft,
    FootRight,
    FootLeft,
}

impl BodyLocation {
    pub const ALL: [BodyLocation; 7] = [
        BodyLocation::Pelvis,
        BodyLocation::FemurRight,
        BodyLocation::FemurLeft,
        BodyLocation::TibiaRight,
        BodyLocation::TibiaLeft,
        BodyLocation::FootRight,
        BodyLocation::FootLeft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyLocation::Pelvis => "pelvis",
            BodyLocation::FemurRight => "femur_right",
            BodyLocation::FemurLeft => "femur_left",
            BodyLocation::TibiaRight => "tibia_right",
            BodyLocation::TibiaLeft => "tibia_left",
            BodyLocation::FootRight => "foot_right",
            BodyLocation::FootLeft => "foot_left",
        }
    }
}

impl fmt::Display for BodyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// IMU channel kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImuChannel {
    /// N×3, m/s²
    Acceleration,
    /// N×3, rad/s
    Gyroscope,
    /// N×4, unit quaternion [w, x, y, z]
    Quaternion,
}

impl ImuChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImuChannel::Acceleration => "acceleration",
            ImuChannel::Gyroscope => "gyroscope",
            ImuChannel::Quaternion => "quaternion",
        }
    }

    /// Expected number of axes
    pub fn width(&self) -> usize {
        match self {
            ImuChannel::Acceleration | ImuChannel::Gyroscope => 3,
            ImuChannel::Quaternion => 4,
        }
    }

    /// Key suffix used in processed signal maps
    pub fn signal_suffix(&self) -> &'static str {
        match self {
            ImuChannel::Acceleration => "acc",
            ImuChannel::Gyroscope => "gyro",
            ImuChannel::Quaternion => "quat",
        }
    }
}

impl fmt::Display for ImuChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Force platform channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceChannel {
    Fx,
    Fy,
    Fz,
    Mx,
    My,
    Mz,
}

impl ForceChannel {
    pub const ALL: [ForceChannel; 6] = [
        ForceChannel::Fx,
        ForceChannel::Fy,
        ForceChannel::Fz,
        ForceChannel::Mx,
        ForceChannel::My,
        ForceChannel::Mz,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ForceChannel::Fx => "fx",
            ForceChannel::Fy => "fy",
            ForceChannel::Fz => "fz",
            ForceChannel::Mx => "mx",
            ForceChannel::My => "my",
            ForceChannel::Mz => "mz",
        }
    }

    /// Force (N) as opposed to moment (N·m)
    pub fn is_force(&self) -> bool {
        matches!(self, ForceChannel::Fx | ForceChannel::Fy | ForceChannel::Fz)
    }
}

impl fmt::Display for ForceChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channels recorded by one IMU
pub type ImuChannels = BTreeMap<ImuChannel, Channel>;

/// All IMUs sharing one acquisition clock
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuCapture {
    /// Seconds
    pub time: Vec<f64>,
    pub sensors: BTreeMap<BodyLocation, ImuChannels>,
}

impl ImuCapture {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn channel(&self, location: BodyLocation, channel: ImuChannel) -> Option<&Channel> {
        self.sensors.get(&location).and_then(|c| c.get(&channel))
    }

    /// Check every channel against the clock length and its expected width
    pub fn validate_shape(&self) -> Result<(), ContractError> {
        for (location, channels) in &self.sensors {
            for (kind, channel) in channels {
                let name = format!("{location}.{kind}");
                if channel.len() != self.time.len() {
                    return Err(ContractError::validation(
                        name,
                        format!(
                            "{} samples but clock has {}",
                            channel.len(),
                            self.time.len()
                        ),
                    ));
                }
                if channel.width() != kind.width() {
                    return Err(ContractError::validation(
                        name,
                        format!("width {} expected {}", channel.width(), kind.width()),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn is_time_increasing(&self) -> bool {
        is_strictly_increasing(&self.time)
    }
}

/// Force platform recording
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceCapture {
    /// Seconds
    pub time: Vec<f64>,
    pub channels: BTreeMap<ForceChannel, Vec<f64>>,
}

impl ForceCapture {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn channel(&self, channel: ForceChannel) -> Option<&[f64]> {
        self.channels.get(&channel).map(Vec::as_slice)
    }

    pub fn validate_shape(&self) -> Result<(), ContractError> {
        for (kind, values) in &self.channels {
            if values.len() != self.time.len() {
                return Err(ContractError::validation(
                    format!("force.{kind}"),
                    format!(
                        "{} samples but clock has {}",
                        values.len(),
                        self.time.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn is_time_increasing(&self) -> bool {
        is_strictly_increasing(&self.time)
    }
}

/// Subject anthropometrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectInfo {
    pub body_mass_kg: f64,
    #[serde(default)]
    pub height_m: Option<f64>,
}

impl SubjectInfo {
    /// Body weight in newtons
    pub fn body_weight_n(&self, gravity: f64) -> f64 {
        self.body_mass_kg * gravity
    }
}

impl Default for SubjectInfo {
    fn default() -> Self {
        Self {
            body_mass_kg: 70.0,
            height_m: None,
        }
    }
}

/// Everything one analysis run consumes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionInput {
    pub imu: ImuCapture,
    pub force: ForceCapture,
    #[serde(default)]
    pub subject: SubjectInfo,
    /// Exercise tag, e.g. "squat" or "jump"
    #[serde(default = "default_exercise")]
    pub exercise: String,
}

fn default_exercise() -> String {
    "squat".to_string()
}
