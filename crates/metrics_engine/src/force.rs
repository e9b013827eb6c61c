//! Ground reaction force metrics per contact.

use conditioning::trapezoid;
use contracts::{ContractError, EventWindow, ForceMetrics};

use crate::kinematics::mean;

/// Inclusive `[start, end]` slice of a contact, `end` clamped to the last sample
fn contact_range(len: usize, window: EventWindow) -> Option<std::ops::RangeInclusive<usize>> {
    let end = window.end.min(len.checked_sub(1)?);
    (window.start < end).then_some(window.start..=end)
}

/// Peak, mean, timing, loading rate and impulse of `fz` over one contact
///
/// Force values are divided by `body_weight_n`; the impulse stays in N·s.
pub fn try_force_metrics(
    time: &[f64],
    fz: &[f64],
    body_weight_n: f64,
    contact: EventWindow,
) -> Result<ForceMetrics, ContractError> {
    if time.len() != fz.len() {
        return Err(ContractError::validation(
            "force_metrics",
            format!("{} timestamps but {} force samples", time.len(), fz.len()),
        ));
    }
    if body_weight_n <= 0.0 || !body_weight_n.is_finite() {
        return Err(ContractError::numeric(
            "force_metrics",
            format!("body weight {body_weight_n} N"),
        ));
    }
    let range = contact_range(fz.len(), contact).ok_or_else(|| {
        ContractError::validation(
            "force_metrics",
            format!(
                "contact [{}, {}] outside {} samples",
                contact.start,
                contact.end,
                fz.len()
            ),
        )
    })?;

    let t = &time[range.clone()];
    let f = &fz[range];
    let normalized: Vec<f64> = f.iter().map(|v| v / body_weight_n).collect();

    // First maximum
    let (peak_idx, peak) = normalized
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best });

    let time_to_peak = t[peak_idx] - t[0];
    let loading_rate = if peak_idx > 0 && time_to_peak > 0.0 {
        (peak - normalized[0]) / time_to_peak
    } else {
        0.0
    };

    let metrics = ForceMetrics {
        peak_grf: peak,
        mean_grf: mean(&normalized),
        contact_time: t[t.len() - 1] - t[0],
        time_to_peak,
        loading_rate,
        impulse: trapezoid(f, t),
    };
    tracing::debug!(
        peak_grf = metrics.peak_grf,
        loading_rate = metrics.loading_rate,
        "Force metrics computed"
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Vec<f64>, Vec<f64>) {
        // 0 → 1400 N over 0.5 s, back to 0 over 0.5 s
        let time: Vec<f64> = (0..=100).map(|i| i as f64 * 0.01).collect();
        let fz = time
            .iter()
            .map(|t| if *t <= 0.5 { 2800.0 * t } else { 2800.0 * (1.0 - t) })
            .collect();
        (time, fz)
    }

    #[test]
    fn test_triangle_contact() {
        let (time, fz) = triangle();
        let m = try_force_metrics(&time, &fz, 700.0, EventWindow { start: 0, end: 100 }).unwrap();
        assert!((m.peak_grf - 2.0).abs() < 1e-9);
        assert!((m.time_to_peak - 0.5).abs() < 1e-9);
        assert!((m.contact_time - 1.0).abs() < 1e-9);
        assert!((m.loading_rate - 4.0).abs() < 1e-9);
        assert!((m.impulse - 700.0).abs() < 1e-6);
        assert!((m.mean_grf - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_end_clamped_to_last_sample() {
        let (time, fz) = triangle();
        let m = try_force_metrics(&time, &fz, 700.0, EventWindow { start: 50, end: 500 }).unwrap();
        assert_eq!(m.time_to_peak, 0.0);
        assert_eq!(m.loading_rate, 0.0);
        assert!((m.contact_time - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_input() {
        let (time, fz) = triangle();
        let window = EventWindow { start: 200, end: 300 };
        assert!(try_force_metrics(&time, &fz, 700.0, window).is_err());
        let window = EventWindow { start: 0, end: 10 };
        assert!(try_force_metrics(&time, &fz, 0.0, window).is_err());
        assert!(try_force_metrics(&time[..5], &fz, 700.0, window).is_err());
    }
}
