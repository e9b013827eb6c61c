//! Temporal synchronizer implementation.

use std::collections::BTreeMap;

use contracts::{
    is_strictly_increasing, BodyLocation, ContractError, ForceCapture, ForceChannel, ImuCapture,
    ImuChannel, ImuChannels, SyncConfig, SyncResult,
};
use tracing::instrument;

use crate::correlation::estimate_offset;
use crate::grid::{clamp_offset, overlap_window, sync_quality, uniform_grid};
use crate::interpolate::resample;

/// Vertical axis of IMU acceleration
const VERTICAL_AXIS: usize = 2;

/// Aligns an IMU capture and a force platform capture on one uniform clock
#[derive(Debug, Clone)]
pub struct TemporalSynchronizer {
    config: SyncConfig,
}

impl Default for TemporalSynchronizer {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl TemporalSynchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Synchronize both streams
    ///
    /// Never fails: invalid input yields `SyncResult::failed` with the reason.
    #[instrument(
        name = "sync_engine_synchronize",
        skip(self, imu, force),
        fields(imu_samples = imu.len(), force_samples = force.len())
    )]
    pub fn synchronize(&self, imu: &ImuCapture, force: &ForceCapture) -> SyncResult {
        let result = match self.try_synchronize(imu, force) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "Synchronization failed");
                SyncResult::failed(e.to_string())
            }
        };
        observability::record_sync_result(&result);
        result
    }

    /// Synchronize both streams, reporting why validation failed
    pub fn try_synchronize(
        &self,
        imu: &ImuCapture,
        force: &ForceCapture,
    ) -> Result<SyncResult, ContractError> {
        self.validate_clock("imu", &imu.time)?;
        self.validate_clock("force", &force.time)?;
        imu.validate_shape()?;
        force.validate_shape()?;

        let (start, end) = overlap_window(&imu.time, &force.time).ok_or_else(|| {
            ContractError::validation("synchronize", "no temporal overlap between streams")
        })?;
        let time_common = uniform_grid(start, end, self.config.target_frequency_hz);
        tracing::info!(
            start_s = start,
            end_s = end,
            samples = time_common.len(),
            frequency_hz = self.config.target_frequency_hz,
            "Common time grid built"
        );

        let imu_synced = self.resample_imu(imu, &time_common);
        let force_synced = self.resample_force(force, &time_common);

        let fz = force_synced.get(&ForceChannel::Fz).ok_or_else(|| {
            ContractError::validation("synchronize", "force capture has no fz channel")
        })?;
        let dt = 1.0 / self.config.target_frequency_hz;

        let sensor_offsets = self.sensor_offsets(fz, &imu_synced, dt);
        let (reference_location, raw_offset) = self.reference_offset(&imu_synced, &sensor_offsets);

        let time_offset = clamp_offset(raw_offset, self.config.max_time_offset_s);
        if time_offset != raw_offset {
            tracing::warn!(
                raw_offset_ms = raw_offset * 1000.0,
                clamped_ms = time_offset * 1000.0,
                "Offset exceeds maximum, clamped"
            );
        }

        let mut time_common = time_common;
        if time_offset.abs() > self.config.min_significant_offset_s {
            tracing::warn!(offset_ms = time_offset * 1000.0, "Applying clock offset to grid");
            time_common.iter_mut().for_each(|t| *t += time_offset);
        }

        let quality = sync_quality(time_offset);
        tracing::info!(
            offset_ms = time_offset * 1000.0,
            quality = quality,
            reference = ?reference_location,
            "Synchronization completed"
        );

        Ok(SyncResult {
            time_common,
            imu: imu_synced,
            force: force_synced,
            time_offset,
            quality,
            success: true,
            reference_location,
            sensor_offsets,
            failure: None,
        })
    }

    fn validate_clock(&self, stream: &str, time: &[f64]) -> Result<(), ContractError> {
        if time.len() < self.config.min_samples {
            return Err(ContractError::validation(
                "synchronize",
                format!(
                    "{stream} stream has {} samples, need at least {}",
                    time.len(),
                    self.config.min_samples
                ),
            ));
        }
        if !is_strictly_increasing(time) {
            return Err(ContractError::validation(
                "synchronize",
                format!("{stream} timestamps are not strictly increasing"),
            ));
        }
        Ok(())
    }

    fn resample_imu(
        &self,
        imu: &ImuCapture,
        grid: &[f64],
    ) -> BTreeMap<BodyLocation, ImuChannels> {
        let kind = self.config.interpolation;
        imu.sensors
            .iter()
            .map(|(location, channels)| {
                let resampled = channels
                    .iter()
                    .map(|(kind_of, channel)| {
                        let channel =
                            channel.map_axes(|axis| resample(&imu.time, axis, grid, kind));
                        (*kind_of, channel)
                    })
                    .collect();
                tracing::debug!(location = %location, "IMU channels resampled");
                (*location, resampled)
            })
            .collect()
    }

    fn resample_force(
        &self,
        force: &ForceCapture,
        grid: &[f64],
    ) -> BTreeMap<ForceChannel, Vec<f64>> {
        force
            .channels
            .iter()
            .map(|(channel, values)| {
                let resampled = resample(&force.time, values, grid, self.config.interpolation);
                (*channel, resampled)
            })
            .collect()
    }

    /// Global offset from the first priority location carrying acceleration
    ///
    /// Reuses the per-location estimate; a location missing from `offsets`
    /// had a degenerate correlation.
    fn reference_offset(
        &self,
        imu: &BTreeMap<BodyLocation, ImuChannels>,
        offsets: &BTreeMap<BodyLocation, f64>,
    ) -> (Option<BodyLocation>, f64) {
        let reference = self.config.reference_priority.iter().copied().find(|location| {
            imu.get(location)
                .and_then(|c| c.get(&ImuChannel::Acceleration))
                .and_then(|acc| acc.axis(VERTICAL_AXIS))
                .is_some()
        });

        let Some(location) = reference else {
            tracing::warn!("No vertical acceleration available for offset estimation");
            return (None, 0.0);
        };

        match offsets.get(&location) {
            Some(offset) => (Some(location), *offset),
            None => {
                tracing::warn!(location = %location, "Offset estimation degenerate, assuming 0");
                observability::record_numeric_fallback("cross_correlation");
                (Some(location), 0.0)
            }
        }
    }

    /// Diagnostic offset for every location with acceleration
    fn sensor_offsets(
        &self,
        fz: &[f64],
        imu: &BTreeMap<BodyLocation, ImuChannels>,
        dt: f64,
    ) -> BTreeMap<BodyLocation, f64> {
        imu.iter()
            .filter_map(|(location, channels)| {
                let acc = channels.get(&ImuChannel::Acceleration)?.axis(VERTICAL_AXIS)?;
                let offset = estimate_offset(fz, acc, dt).ok()?;
                tracing::debug!(location = %location, offset_ms = offset * 1000.0, "Sensor offset");
                Some((*location, offset))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Channel, InterpolationKind};

    const IMU_HZ: f64 = 60.0;
    const FORCE_HZ: f64 = 1000.0;

    /// Two smooth loading bumps
    fn load(t: f64) -> f64 {
        700.0
            + 600.0 * (-(t - 1.5).powi(2) / 0.05).exp()
            + 400.0 * (-(t - 3.2).powi(2) / 0.08).exp()
    }

    fn clock(rate: f64, start: f64, duration: f64) -> Vec<f64> {
        let n = (duration * rate) as usize;
        (0..n).map(|i| start + i as f64 / rate).collect()
    }

    /// IMU whose vertical acceleration follows the load; `lag` delays the IMU clock
    fn make_imu(locations: &[BodyLocation], lag: f64) -> ImuCapture {
        let time = clock(IMU_HZ, 0.0, 5.0);
        let rows: Vec<[f64; 3]> = time
            .iter()
            .map(|t| [0.1, 0.0, 9.81 + (load(t - lag) - 700.0) / 70.0])
            .collect();
        let sensors = locations
            .iter()
            .map(|loc| {
                let mut channels = ImuChannels::new();
                channels.insert(ImuChannel::Acceleration, Channel::from_rows(&rows));
                (*loc, channels)
            })
            .collect();
        ImuCapture { time, sensors }
    }

    fn make_force(start: f64) -> ForceCapture {
        let time = clock(FORCE_HZ, start, 5.0);
        let fz = time.iter().map(|t| load(*t)).collect();
        let fx = time.iter().map(|t| 0.01 * load(*t)).collect();
        let mut channels = BTreeMap::new();
        channels.insert(ForceChannel::Fz, fz);
        channels.insert(ForceChannel::Fx, fx);
        ForceCapture { time, channels }
    }

    #[test]
    fn test_aligned_streams() {
        let sync = TemporalSynchronizer::default();
        let result = sync.synchronize(&make_imu(&[BodyLocation::Pelvis], 0.0), &make_force(0.0));

        assert!(result.success, "failure: {:?}", result.failure);
        assert!(result.time_offset.abs() < 0.011);
        assert!(result.quality > 0.85);
        assert_eq!(result.reference_location, Some(BodyLocation::Pelvis));

        let n = result.time_common.len();
        assert!(n > 400);
        for w in result.time_common.windows(2) {
            assert!((w[1] - w[0] - 0.01).abs() < 1e-9);
        }
        assert_eq!(result.force[&ForceChannel::Fz].len(), n);
        let acc = result.imu[&BodyLocation::Pelvis][&ImuChannel::Acceleration].clone();
        assert_eq!(acc.len(), n);
        assert_eq!(acc.width(), 3);
    }

    #[test]
    fn test_offset_detection_sign_and_magnitude() {
        let sync = TemporalSynchronizer::new(SyncConfig {
            interpolation: InterpolationKind::Linear,
            ..Default::default()
        });
        let result = sync.synchronize(&make_imu(&[BodyLocation::Pelvis], 0.05), &make_force(0.0));

        assert!(result.success);
        assert!(
            (result.time_offset + 0.05).abs() <= 0.011,
            "offset {}",
            result.time_offset
        );
        // Grid shifted by the significant offset
        assert!((result.time_common[0] - result.time_offset).abs() < 1e-9);
        assert!(result.quality < 0.7);
    }

    #[test]
    fn test_reference_priority_and_diagnostics() {
        let imu = make_imu(&[BodyLocation::FemurLeft, BodyLocation::FemurRight], 0.0);
        let result = TemporalSynchronizer::default().synchronize(&imu, &make_force(0.0));

        assert!(result.success);
        assert_eq!(result.reference_location, Some(BodyLocation::FemurRight));
        assert_eq!(result.sensor_offsets.len(), 2);
    }

    #[test]
    fn test_reference_reuses_sensor_offset() {
        let imu = make_imu(&[BodyLocation::Pelvis, BodyLocation::FemurRight], 0.03);
        let result = TemporalSynchronizer::default().synchronize(&imu, &make_force(0.0));

        assert!(result.success);
        assert_eq!(result.reference_location, Some(BodyLocation::Pelvis));
        assert_eq!(result.time_offset, result.sensor_offsets[&BodyLocation::Pelvis]);
    }

    #[test]
    fn test_flat_reference_falls_back_to_zero() {
        let mut imu = make_imu(&[BodyLocation::Pelvis, BodyLocation::FemurRight], 0.03);
        let n = imu.time.len();
        imu.sensors.get_mut(&BodyLocation::Pelvis).unwrap().insert(
            ImuChannel::Acceleration,
            Channel::from_axes(vec![vec![0.0; n], vec![0.0; n], vec![9.81; n]]).unwrap(),
        );
        let result = TemporalSynchronizer::default().synchronize(&imu, &make_force(0.0));

        assert!(result.success);
        assert_eq!(result.reference_location, Some(BodyLocation::Pelvis));
        assert_eq!(result.time_offset, 0.0);
        assert!(!result.sensor_offsets.contains_key(&BodyLocation::Pelvis));
        assert!(result.sensor_offsets.contains_key(&BodyLocation::FemurRight));
    }

    #[test]
    fn test_missing_reference_means_zero_offset() {
        let imu = make_imu(&[BodyLocation::TibiaRight], 0.0);
        let result = TemporalSynchronizer::default().synchronize(&imu, &make_force(0.0));

        assert!(result.success);
        assert_eq!(result.reference_location, None);
        assert_eq!(result.time_offset, 0.0);
        assert_eq!(result.quality, 1.0);
    }

    #[test]
    fn test_too_few_samples() {
        let mut imu = make_imu(&[BodyLocation::Pelvis], 0.0);
        imu.time.truncate(9);
        for channels in imu.sensors.values_mut() {
            for channel in channels.values_mut() {
                let axes = channel.axes().iter().map(|a| a[..9].to_vec()).collect();
                *channel = Channel::from_axes(axes).unwrap();
            }
        }
        let result = TemporalSynchronizer::default().synchronize(&imu, &make_force(0.0));

        assert!(!result.success);
        assert!(result.time_common.is_empty());
        assert_eq!(result.quality, 0.0);
        assert!(result.failure.unwrap().contains("at least 10"));
    }

    #[test]
    fn test_non_monotonic_clock() {
        let mut force = make_force(0.0);
        force.time.swap(3, 4);
        let result =
            TemporalSynchronizer::default().synchronize(&make_imu(&[BodyLocation::Pelvis], 0.0), &force);
        assert!(!result.success);
        assert!(result.failure.unwrap().contains("strictly increasing"));
    }

    #[test]
    fn test_no_overlap() {
        let result = TemporalSynchronizer::default()
            .synchronize(&make_imu(&[BodyLocation::Pelvis], 0.0), &make_force(10.0));
        assert!(!result.success);
        assert!(result.imu.is_empty());
        assert!(result.force.is_empty());
        assert!(result.failure.unwrap().contains("overlap"));
    }

    #[test]
    fn test_missing_fz() {
        let mut force = make_force(0.0);
        force.channels.remove(&ForceChannel::Fz);
        let err = TemporalSynchronizer::default()
            .try_synchronize(&make_imu(&[BodyLocation::Pelvis], 0.0), &force)
            .unwrap_err();
        assert!(err.to_string().contains("fz"));
    }
}
