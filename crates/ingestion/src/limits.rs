//! Physical range checks on raw capture samples.

use contracts::{ForceChannel, ImuChannel, SessionInput};

/// Per-sample physical limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleLimits {
    /// Exclusive bounds on the quaternion norm
    pub quaternion_norm: (f64, f64),
    /// |a| per axis, m/s²
    pub max_acceleration: f64,
    /// |ω| per axis, rad/s
    pub max_angular_velocity: f64,
    /// |F| per channel, N
    pub max_force: f64,
    /// |M| per channel, N·m
    pub max_moment: f64,
}

impl Default for SampleLimits {
    fn default() -> Self {
        Self {
            quaternion_norm: (0.9, 1.1),
            max_acceleration: 200.0,
            max_angular_velocity: 35.0,
            max_force: 10_000.0,
            max_moment: 1_000.0,
        }
    }
}

/// Samples of one channel outside their limit
#[derive(Debug, Clone, PartialEq)]
pub struct RangeViolation {
    /// e.g. `pelvis.acceleration`, `force.fz`
    pub channel: String,
    pub count: usize,
    pub total: usize,
    pub rule: String,
}

/// Count out-of-range samples per channel; channels within range are omitted
pub fn check_sample_ranges(session: &SessionInput, limits: &SampleLimits) -> Vec<RangeViolation> {
    let mut violations = Vec::new();

    for (location, channels) in &session.imu.sensors {
        for (kind, channel) in channels {
            let total = channel.len();
            let (count, rule) = match kind {
                ImuChannel::Quaternion => {
                    let (lo, hi) = limits.quaternion_norm;
                    let count = (0..total)
                        .filter_map(|i| channel.row(i))
                        .filter(|q| {
                            let norm = q.iter().map(|v| v * v).sum::<f64>().sqrt();
                            !(norm > lo && norm < hi)
                        })
                        .count();
                    (count, format!("norm outside ({lo}, {hi})"))
                }
                ImuChannel::Acceleration => (
                    count_exceeding(channel.axes(), limits.max_acceleration),
                    format!("|a| > {} m/s²", limits.max_acceleration),
                ),
                ImuChannel::Gyroscope => (
                    count_exceeding(channel.axes(), limits.max_angular_velocity),
                    format!("|ω| > {} rad/s", limits.max_angular_velocity),
                ),
            };
            if count > 0 {
                violations.push(RangeViolation {
                    channel: format!("{location}.{kind}"),
                    count,
                    total,
                    rule,
                });
            }
        }
    }

    for (kind, values) in &session.force.channels {
        let (limit, unit) = if kind.is_force() {
            (limits.max_force, "N")
        } else {
            (limits.max_moment, "N·m")
        };
        let count = values.iter().filter(|v| v.abs() > limit).count();
        if count > 0 {
            violations.push(RangeViolation {
                channel: format!("force.{kind}"),
                count,
                total: values.len(),
                rule: format!("|{kind}| > {limit} {unit}"),
            });
        }
    }

    violations
}

/// Samples where any axis exceeds `limit` in magnitude
fn count_exceeding(axes: &[Vec<f64>], limit: f64) -> usize {
    let n = axes.first().map_or(0, Vec::len);
    (0..n)
        .filter(|&i| axes.iter().any(|axis| axis[i].abs() > limit))
        .count()
}

/// Whether the force capture carries the vertical channel
pub fn has_vertical_force(session: &SessionInput) -> bool {
    session.force.channels.contains_key(&ForceChannel::Fz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BodyLocation, Channel};
    use std::collections::BTreeMap;

    fn session() -> SessionInput {
        let mut session = SessionInput::default();
        session.imu.time = vec![0.0, 0.1, 0.2];
        let mut channels = BTreeMap::new();
        channels.insert(
            ImuChannel::Quaternion,
            Channel::from_rows(&[[1.0, 0.0, 0.0, 0.0], [0.5, 0.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]]),
        );
        channels.insert(
            ImuChannel::Acceleration,
            Channel::from_rows(&[[0.0, 0.0, 9.81], [250.0, 0.0, 9.81], [0.0, -300.0, 9.81]]),
        );
        channels.insert(
            ImuChannel::Gyroscope,
            Channel::from_rows(&[[0.0, 1.0, 0.0], [0.0, 2.0, 0.0], [0.0, 3.0, 0.0]]),
        );
        session.imu.sensors.insert(BodyLocation::Pelvis, channels);

        session.force.time = vec![0.0, 0.001, 0.002];
        session.force.channels.insert(ForceChannel::Fz, vec![700.0, 12_000.0, 700.0]);
        session.force.channels.insert(ForceChannel::Mz, vec![0.0, 1_500.0, -1_500.0]);
        session
    }

    #[test]
    fn test_counts_per_channel() {
        let violations = check_sample_ranges(&session(), &SampleLimits::default());
        let find = |name: &str| violations.iter().find(|v| v.channel == name).map(|v| v.count);

        assert_eq!(find("pelvis.quaternion"), Some(1));
        assert_eq!(find("pelvis.acceleration"), Some(2));
        assert_eq!(find("pelvis.gyroscope"), None);
        assert_eq!(find("force.fz"), Some(1));
        assert_eq!(find("force.mz"), Some(2));
    }

    #[test]
    fn test_clean_session_has_no_violations() {
        let mut clean = session();
        clean.imu.sensors.clear();
        clean.force.channels.insert(ForceChannel::Fz, vec![700.0; 3]);
        clean.force.channels.remove(&ForceChannel::Mz);
        assert!(check_sample_ranges(&clean, &SampleLimits::default()).is_empty());
        assert!(has_vertical_force(&clean));
    }
}
