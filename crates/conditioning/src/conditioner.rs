//! Configured signal conditioner used by the analysis pipeline.

use contracts::{AnalysisConfig, Channel, EventConfig, EventWindow, FilterConfig};
use tracing::instrument;

use crate::decimate::downsample;
use crate::events::detect_threshold_events;
use crate::filter::{filter_channel, filter_low_pass};
use crate::integrate::compute_jump_height;

/// Subtract `gravity` along `vertical_axis` (scalar channels: the only axis)
pub fn remove_gravity(acceleration: &Channel, vertical_axis: usize, gravity: f64) -> Channel {
    let single = acceleration.width() == 1;
    let mut index = 0;
    acceleration.map_axes(|axis| {
        let is_vertical = single || index == vertical_axis;
        index += 1;
        if is_vertical {
            axis.iter().map(|v| v - gravity).collect()
        } else {
            axis.to_vec()
        }
    })
}

/// Filtering and event detection with fixed cutoffs and durations
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    filter: FilterConfig,
    events: EventConfig,
    gravity: f64,
}

impl Default for SignalConditioner {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl SignalConditioner {
    pub fn new(filter: FilterConfig, events: EventConfig, gravity: f64) -> Self {
        Self {
            filter,
            events,
            gravity,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.filter.clone(),
            config.events.clone(),
            config.physics.gravity,
        )
    }

    pub fn filter_config(&self) -> &FilterConfig {
        &self.filter
    }

    /// Zero-phase low-pass at the configured order
    pub fn filter_low_pass(&self, signal: &[f64], cutoff_hz: f64, sample_rate_hz: f64) -> Vec<f64> {
        filter_low_pass(signal, cutoff_hz, sample_rate_hz, self.filter.order)
    }

    pub fn filter_imu_acceleration(&self, acceleration: &Channel, sample_rate_hz: f64) -> Channel {
        filter_channel(
            acceleration,
            self.filter.imu_acc_cutoff_hz,
            sample_rate_hz,
            self.filter.order,
        )
    }

    pub fn filter_imu_gyro(&self, angular_velocity: &Channel, sample_rate_hz: f64) -> Channel {
        filter_channel(
            angular_velocity,
            self.filter.imu_gyro_cutoff_hz,
            sample_rate_hz,
            self.filter.order,
        )
    }

    pub fn filter_force(&self, force: &[f64], sample_rate_hz: f64) -> Vec<f64> {
        self.filter_low_pass(force, self.filter.force_cutoff_hz, sample_rate_hz)
    }

    pub fn remove_gravity(&self, acceleration: &Channel, vertical_axis: usize) -> Channel {
        remove_gravity(acceleration, vertical_axis, self.gravity)
    }

    /// Foot contacts: `fz` above `threshold_n` for at least the minimum contact time
    #[instrument(
        name = "conditioning_detect_contacts",
        skip(self, fz),
        fields(samples = fz.len())
    )]
    pub fn detect_grf_contacts(
        &self,
        fz: &[f64],
        threshold_n: f64,
        sample_rate_hz: f64,
    ) -> Vec<EventWindow> {
        let contacts = detect_threshold_events(
            fz,
            threshold_n,
            Some(self.events.min_contact_duration_s),
            Some(sample_rate_hz),
        );
        tracing::info!(contacts = contacts.len(), "GRF contacts detected");
        contacts
    }

    /// Repetitions: `signal` above `threshold` for at least the minimum repetition time
    pub fn segment_repetitions(
        &self,
        signal: &[f64],
        threshold: f64,
        sample_rate_hz: f64,
    ) -> Vec<EventWindow> {
        let repetitions = detect_threshold_events(
            signal,
            threshold,
            Some(self.events.min_repetition_duration_s),
            Some(sample_rate_hz),
        );
        tracing::info!(repetitions = repetitions.len(), "Repetitions segmented");
        repetitions
    }

    /// Jump height over one contact, from touchdown to liftoff inclusive
    pub fn jump_height(
        &self,
        time: &[f64],
        fz: &[f64],
        body_mass_kg: f64,
        contact: EventWindow,
    ) -> f64 {
        compute_jump_height(
            time,
            fz,
            body_mass_kg,
            contact.start,
            contact.end,
            self.gravity,
        )
    }

    pub fn downsample(&self, signal: &[f64], original_rate_hz: f64, target_rate_hz: f64) -> Vec<f64> {
        downsample(signal, original_rate_hz, target_rate_hz, self.filter.order)
    }
}
