//! Joint angle metrics.

use contracts::{ContractError, KinematicMetrics};

/// Numerical derivative with uniform spacing `dt`
///
/// Central differences in the interior, one-sided at the ends; a single
/// sample has zero derivative.
pub fn gradient(y: &[f64], dt: f64) -> Vec<f64> {
    let n = y.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n)
            .map(|i| {
                if i == 0 {
                    (y[1] - y[0]) / dt
                } else if i == n - 1 {
                    (y[n - 1] - y[n - 2]) / dt
                } else {
                    (y[i + 1] - y[i - 1]) / (2.0 * dt)
                }
            })
            .collect(),
    }
}

/// Mean sample spacing of a time vector
pub fn mean_spacing(time: &[f64]) -> Option<f64> {
    if time.len() < 2 {
        return None;
    }
    let dt = (time[time.len() - 1] - time[0]) / (time.len() - 1) as f64;
    (dt.is_finite() && dt > 0.0).then_some(dt)
}

pub(crate) fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Range of motion: `max - min` (0 for an empty series)
pub fn range_of_motion(angle: &[f64]) -> f64 {
    if angle.is_empty() {
        return 0.0;
    }
    let (min, max) = angle
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    max - min
}

/// ROM, peaks and derivative peaks of an angle trace (degrees)
pub fn try_kinematic_metrics(time: &[f64], angle: &[f64]) -> Result<KinematicMetrics, ContractError> {
    if angle.is_empty() || time.len() != angle.len() {
        return Err(ContractError::validation(
            "kinematic_metrics",
            format!("{} timestamps for {} angle samples", time.len(), angle.len()),
        ));
    }
    if angle.iter().any(|v| !v.is_finite()) {
        return Err(ContractError::numeric(
            "kinematic_metrics",
            "angle contains NaN or infinite samples",
        ));
    }
    let dt = mean_spacing(time).ok_or_else(|| {
        ContractError::numeric("kinematic_metrics", "time vector has no positive spacing")
    })?;

    let peak_flexion = angle.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let peak_extension = angle.iter().copied().fold(f64::INFINITY, f64::min);
    let velocity = gradient(angle, dt);
    let acceleration = gradient(&velocity, dt);

    let metrics = KinematicMetrics {
        rom: peak_flexion - peak_extension,
        peak_flexion,
        peak_extension,
        mean_angle: mean(angle),
        peak_angular_velocity: max_abs(&velocity),
        peak_angular_acceleration: max_abs(&acceleration),
    };
    tracing::debug!(
        rom = metrics.rom,
        peak_flexion = metrics.peak_flexion,
        "Kinematic metrics computed"
    );
    Ok(metrics)
}
