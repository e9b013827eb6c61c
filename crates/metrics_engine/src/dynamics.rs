//! Mass-normalized joint kinetics.

use conditioning::trapezoid;
use contracts::{ContractError, DynamicMetrics};

use crate::kinematics::{max_abs, mean};

/// Moment (Nm) and angular velocity (rad/s) to Nm/kg, W/kg and J/kg
pub fn try_dynamic_metrics(
    time: &[f64],
    moment: &[f64],
    angular_velocity: &[f64],
    body_mass_kg: f64,
) -> Result<DynamicMetrics, ContractError> {
    if moment.is_empty() || time.len() != moment.len() || angular_velocity.len() != moment.len() {
        return Err(ContractError::validation(
            "dynamic_metrics",
            format!(
                "length mismatch: time {}, moment {}, angular velocity {}",
                time.len(),
                moment.len(),
                angular_velocity.len()
            ),
        ));
    }
    if body_mass_kg <= 0.0 || !body_mass_kg.is_finite() {
        return Err(ContractError::numeric(
            "dynamic_metrics",
            format!("body mass {body_mass_kg} kg"),
        ));
    }

    let moment_abs: Vec<f64> = moment.iter().map(|m| m.abs() / body_mass_kg).collect();
    let power: Vec<f64> = moment
        .iter()
        .zip(angular_velocity)
        .map(|(m, w)| m * w)
        .collect();
    let power_abs: Vec<f64> = power.iter().map(|p| p.abs()).collect();

    let metrics = DynamicMetrics {
        peak_moment: max_abs(&moment_abs),
        mean_moment: mean(&moment_abs),
        peak_power: max_abs(&power) / body_mass_kg,
        work: trapezoid(&power_abs, time) / body_mass_kg,
        moment_impulse: trapezoid(&moment_abs, time),
    };
    if [metrics.peak_moment, metrics.peak_power, metrics.work]
        .iter()
        .any(|v| !v.is_finite())
    {
        return Err(ContractError::numeric(
            "dynamic_metrics",
            "non-finite moment or power",
        ));
    }
    tracing::debug!(
        peak_moment = metrics.peak_moment,
        peak_power = metrics.peak_power,
        "Dynamic metrics computed"
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_moment_and_velocity() {
        // 140 Nm at 2 rad/s for 1 s on 70 kg
        let time: Vec<f64> = (0..=100).map(|i| i as f64 * 0.01).collect();
        let moment = vec![140.0; 101];
        let omega = vec![2.0; 101];
        let m = try_dynamic_metrics(&time, &moment, &omega, 70.0).unwrap();
        assert!((m.peak_moment - 2.0).abs() < 1e-12);
        assert!((m.mean_moment - 2.0).abs() < 1e-12);
        assert!((m.peak_power - 4.0).abs() < 1e-12);
        assert!((m.work - 4.0).abs() < 1e-9);
        assert!((m.moment_impulse - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_power_counts_as_work() {
        let time = [0.0, 1.0];
        let m = try_dynamic_metrics(&time, &[-10.0, -10.0], &[1.0, 1.0], 10.0).unwrap();
        assert!((m.work - 1.0).abs() < 1e-12);
        assert!((m.peak_moment - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_input() {
        assert!(try_dynamic_metrics(&[], &[], &[], 70.0).is_err());
        assert!(try_dynamic_metrics(&[0.0, 1.0], &[1.0, 1.0], &[1.0], 70.0).is_err());
        assert!(try_dynamic_metrics(&[0.0, 1.0], &[1.0, 1.0], &[1.0, 1.0], 0.0).is_err());
    }
}
