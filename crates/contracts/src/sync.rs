//! Synchronization output and derived signal containers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{BodyLocation, Channel, ForceChannel, ImuChannels, TimeSeries};

/// Result of aligning the IMU and force platform streams
///
/// Created once per run, read-only thereafter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    /// Uniform common grid (seconds); empty on failure
    pub time_common: Vec<f64>,
    /// Resampled IMU channels per location
    pub imu: BTreeMap<BodyLocation, ImuChannels>,
    /// Resampled force platform channels
    pub force: BTreeMap<ForceChannel, Vec<f64>>,
    /// Detected clock offset (seconds), clamped to the configured maximum
    pub time_offset: f64,
    /// Alignment quality in [0, 1]
    pub quality: f64,
    pub success: bool,
    /// IMU location used for the global offset estimate
    #[serde(default)]
    pub reference_location: Option<BodyLocation>,
    /// Per-location offset estimates (diagnostic only)
    #[serde(default)]
    pub sensor_offsets: BTreeMap<BodyLocation, f64>,
    /// Diagnostic message when `success` is false
    #[serde(default)]
    pub failure: Option<String>,
}

impl SyncResult {
    /// Failed result: empty containers, zero offset and quality
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Grid spacing in seconds, if the grid has at least two points
    pub fn grid_spacing(&self) -> Option<f64> {
        match self.time_common.as_slice() {
            [a, b, ..] => Some(b - a),
            _ => None,
        }
    }
}

/// Named conditioned signals on the common grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedSignals {
    pub time: Vec<f64>,
    pub channels: BTreeMap<String, Channel>,
}

impl ProcessedSignals {
    pub fn new(time: Vec<f64>) -> Self {
        Self {
            time,
            channels: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, channel: Channel) {
        self.channels.insert(name.into(), channel);
    }

    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    /// Axis `index` of the named signal
    pub fn axis(&self, name: &str, index: usize) -> Option<&[f64]> {
        self.channels.get(name).and_then(|c| c.axis(index))
    }

    /// Owned time series view of one signal
    pub fn series(&self, name: &str) -> Option<TimeSeries> {
        self.channels.get(name).map(|values| TimeSeries {
            time: self.time.clone(),
            values: values.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Key for an IMU-derived processed signal, e.g. `femur_right_gyro`
pub fn imu_signal_key(location: BodyLocation, suffix: &str) -> String {
    format!("{}_{}", location.as_str(), suffix)
}

/// Index window of a detected event; `end > start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventWindow {
    pub start: usize,
    pub end: usize,
}

impl EventWindow {
    /// `None` unless `end > start`
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Events detected in one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSet {
    /// Foot contacts on the force platform
    pub contacts: Vec<EventWindow>,
    /// Movement repetitions
    pub repetitions: Vec<EventWindow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_is_empty() {
        let result = SyncResult::failed("no overlap");
        assert!(!result.success);
        assert!(result.time_common.is_empty());
        assert!(result.imu.is_empty());
        assert!(result.force.is_empty());
        assert_eq!(result.time_offset, 0.0);
        assert_eq!(result.quality, 0.0);
        assert_eq!(result.failure.as_deref(), Some("no overlap"));
    }

    #[test]
    fn test_event_window_ordering() {
        assert!(EventWindow::new(5, 5).is_none());
        let a = EventWindow::new(1, 4).unwrap();
        let b = EventWindow::new(2, 3).unwrap();
        let mut events = vec![b, a];
        events.sort();
        assert_eq!(events, vec![a, b]);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_signal_key() {
        assert_eq!(imu_signal_key(BodyLocation::FemurRight, "gyro"), "femur_right_gyro");
    }
}
