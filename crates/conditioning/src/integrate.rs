//! Trapezoidal integration and impulse-momentum jump height.

use contracts::ContractError;

/// Cumulative trapezoid with uniform step `dt`; `out[0] == initial`
pub fn cumulative_trapezoid(signal: &[f64], dt: f64, initial: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(signal.len());
    let mut acc = initial;
    for (i, value) in signal.iter().enumerate() {
        if i > 0 {
            acc += 0.5 * (value + signal[i - 1]) * dt;
        }
        out.push(acc);
    }
    out
}

/// Velocity from acceleration
pub fn calculate_velocity(acceleration: &[f64], dt: f64, initial_velocity: f64) -> Vec<f64> {
    cumulative_trapezoid(acceleration, dt, initial_velocity)
}

/// Displacement from velocity
pub fn calculate_displacement(velocity: &[f64], dt: f64, initial_position: f64) -> Vec<f64> {
    cumulative_trapezoid(velocity, dt, initial_position)
}

/// Trapezoidal integral of `y` over sample points `x` (0 for fewer than two points)
pub fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    y.windows(2)
        .zip(x.windows(2))
        .map(|(y, x)| 0.5 * (y[0] + y[1]) * (x[1] - x[0]))
        .sum()
}

/// Trapezoidal integral of `y` with uniform step `dt`
pub fn trapezoid_uniform(y: &[f64], dt: f64) -> f64 {
    y.windows(2).map(|w| 0.5 * (w[0] + w[1]) * dt).sum()
}

/// Jump height (m) from the vertical force between contact and liftoff
///
/// Integrates `fz - m·g` over `[contact, liftoff]` (inclusive); takeoff
/// velocity is impulse / mass and height `v² / 2g`, never negative.
pub fn try_compute_jump_height(
    time: &[f64],
    fz: &[f64],
    body_mass_kg: f64,
    contact: usize,
    liftoff: usize,
    gravity: f64,
) -> Result<f64, ContractError> {
    if time.len() != fz.len() {
        return Err(ContractError::validation(
            "jump_height",
            format!("{} timestamps but {} force samples", time.len(), fz.len()),
        ));
    }
    if contact > liftoff || liftoff >= fz.len() {
        return Err(ContractError::validation(
            "jump_height",
            format!("segment [{contact}, {liftoff}] outside {} samples", fz.len()),
        ));
    }
    if body_mass_kg <= 0.0 || gravity <= 0.0 {
        return Err(ContractError::numeric(
            "jump_height",
            "body mass and gravity must be positive",
        ));
    }

    let body_weight = body_mass_kg * gravity;
    let net: Vec<f64> = fz[contact..=liftoff].iter().map(|f| f - body_weight).collect();
    let impulse = trapezoid(&net, &time[contact..=liftoff]);
    let takeoff_velocity = impulse / body_mass_kg;
    let height = takeoff_velocity.powi(2) / (2.0 * gravity);

    tracing::debug!(
        height_m = height,
        takeoff_velocity = takeoff_velocity,
        "Jump height computed"
    );
    Ok(height.max(0.0))
}

/// [`try_compute_jump_height`], 0 on invalid input
pub fn compute_jump_height(
    time: &[f64],
    fz: &[f64],
    body_mass_kg: f64,
    contact: usize,
    liftoff: usize,
    gravity: f64,
) -> f64 {
    try_compute_jump_height(time, fz, body_mass_kg, contact, liftoff, gravity).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Jump height unavailable");
        observability::record_numeric_fallback("jump_height");
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: f64 = 9.81;

    #[test]
    fn test_cumulative_trapezoid() {
        let out = cumulative_trapezoid(&[1.0, 1.0, 1.0, 1.0], 0.5, 2.0);
        assert_eq!(out, vec![2.0, 2.5, 3.0, 3.5]);
        assert!(cumulative_trapezoid(&[], 0.1, 1.0).is_empty());
    }

    #[test]
    fn test_velocity_then_displacement() {
        // Constant 2 m/s² from rest: v = 2t, x = t²
        let dt = 0.01;
        let acc = vec![2.0; 101];
        let v = calculate_velocity(&acc, dt, 0.0);
        let x = calculate_displacement(&v, dt, 0.0);
        assert!((v[100] - 2.0).abs() < 1e-9);
        assert!((x[100] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_trapezoid_non_uniform() {
        let x = [0.0, 1.0, 3.0];
        let y = [0.0, 2.0, 2.0];
        assert!((trapezoid(&y, &x) - 5.0).abs() < 1e-12);
        assert_eq!(trapezoid(&[1.0], &[0.0]), 0.0);
        assert!((trapezoid_uniform(&[0.0, 2.0, 2.0], 1.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_net_force_gives_zero_height() {
        let mass = 70.0;
        let time: Vec<f64> = (0..100).map(|i| i as f64 * 0.001).collect();
        let fz = vec![mass * G; 100];
        let h = compute_jump_height(&time, &fz, mass, 0, 99, G);
        assert_eq!(h, 0.0);
    }

    #[test]
    fn test_known_impulse() {
        // Net 700 N for 0.2 s on 70 kg: v = 2 m/s, h = 4 / 19.62
        let mass = 70.0;
        let time: Vec<f64> = (0..=200).map(|i| i as f64 * 0.001).collect();
        let fz = vec![mass * G + 700.0; 201];
        let h = compute_jump_height(&time, &fz, mass, 0, 200, G);
        assert!((h - 4.0 / (2.0 * G)).abs() < 1e-9, "h = {h}");
    }

    #[test]
    fn test_invalid_segment() {
        let time = [0.0, 0.1, 0.2];
        let fz = [1.0, 2.0, 3.0];
        assert!(try_compute_jump_height(&time, &fz, 70.0, 2, 5, G).is_err());
        assert!(try_compute_jump_height(&time, &fz, 0.0, 0, 2, G).is_err());
        assert_eq!(compute_jump_height(&time, &fz, 70.0, 2, 1, G), 0.0);
    }
}
