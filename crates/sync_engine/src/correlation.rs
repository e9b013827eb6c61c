//! Cross-correlation clock offset estimation.

use contracts::ContractError;
use nalgebra::DVector;
use rustfft::{num_complex::Complex, FftPlanner};

/// Zero-mean, unit-variance copy (population standard deviation)
fn standardize(values: &[f64]) -> Result<DVector<f64>, ContractError> {
    let v = DVector::from_column_slice(values);
    let mean = v.mean();
    let std = v.variance().sqrt();
    if !std.is_finite() || std <= f64::EPSILON {
        return Err(ContractError::numeric(
            "cross_correlation",
            "signal has zero variance",
        ));
    }
    Ok(v.map(|x| (x - mean) / std))
}

/// Full linear cross-correlation `c[k] = Σ signal[m + k] · reference[m]`
///
/// Computed through zero-padded FFTs. Index `k` holds lag `k` for
/// `k >= 0` and lag `k - len` for the upper half.
fn fft_correlation(signal: &DVector<f64>, reference: &DVector<f64>) -> Vec<f64> {
    let n = signal.len();
    let fft_size = (2 * n).next_power_of_two();
    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(fft_size);
    let inverse = planner.plan_fft_inverse(fft_size);

    let pad = |values: &DVector<f64>| -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> = values.iter().map(|&x| Complex::new(x, 0.0)).collect();
        buffer.resize(fft_size, Complex::new(0.0, 0.0));
        buffer
    };
    let mut s = pad(signal);
    let mut r = pad(reference);
    forward.process(&mut s);
    forward.process(&mut r);

    let mut spectrum: Vec<Complex<f64>> = s.iter().zip(&r).map(|(a, b)| a * b.conj()).collect();
    inverse.process(&mut spectrum);
    let scale = 1.0 / fft_size as f64;
    spectrum.iter().map(|c| c.re * scale).collect()
}

/// Lag (samples) of the maximum absolute normalized cross-correlation
///
/// Lags span `-(n/2) ..= n - n/2 - 1` for `n = signal.len()`, and
/// `c[k] = Σ signal[m + k] · reference[m]`. A negative lag means `reference`
/// trails `signal`.
pub fn best_lag(signal: &[f64], reference: &[f64]) -> Result<i64, ContractError> {
    if signal.len() != reference.len() {
        return Err(ContractError::validation(
            "cross_correlation",
            format!(
                "length mismatch: {} vs {}",
                signal.len(),
                reference.len()
            ),
        ));
    }
    let n = signal.len() as i64;
    if n < 2 {
        return Err(ContractError::validation(
            "cross_correlation",
            "need at least two samples",
        ));
    }

    let s = standardize(signal)?;
    let r = standardize(reference)?;
    let correlation = fft_correlation(&s, &r);
    let size = correlation.len() as i64;

    let first = -(n / 2);
    let last = n - n / 2 - 1;
    // Relative slack so FFT rounding cannot reorder equal peaks
    let tolerance = 1e-9 * n as f64;
    let mut best = (0_i64, f64::NEG_INFINITY);
    for lag in first..=last {
        let c = correlation[lag.rem_euclid(size) as usize].abs();
        // First maximum wins on ties
        if c > best.1 + tolerance {
            best = (lag, c);
        }
    }
    Ok(best.0)
}

/// Offset in seconds between `signal` and `reference` sampled every `dt`
pub fn estimate_offset(signal: &[f64], reference: &[f64], dt: f64) -> Result<f64, ContractError> {
    Ok(best_lag(signal, reference)? as f64 * dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse_train(n: usize, shift: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64 - shift as f64;
                (-(t - 100.0).powi(2) / 50.0).exp() + 0.6 * (-(t - 260.0).powi(2) / 80.0).exp()
            })
            .collect()
    }

    #[test]
    fn test_identical_signals_have_zero_lag() {
        let a = pulse_train(400, 0);
        assert_eq!(best_lag(&a, &a).unwrap(), 0);
    }

    #[test]
    fn test_delayed_reference_gives_negative_lag() {
        let signal = pulse_train(400, 0);
        let delayed = pulse_train(400, 7);
        assert_eq!(best_lag(&signal, &delayed).unwrap(), -7);
        assert_eq!(best_lag(&delayed, &signal).unwrap(), 7);
    }

    #[test]
    fn test_offset_in_seconds() {
        let signal = pulse_train(400, 0);
        let delayed = pulse_train(400, 5);
        let offset = estimate_offset(&signal, &delayed, 0.01).unwrap();
        assert!((offset + 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_anti_correlation_counts() {
        let signal = pulse_train(400, 0);
        let inverted: Vec<f64> = pulse_train(400, 3).iter().map(|v| -v).collect();
        assert_eq!(best_lag(&signal, &inverted).unwrap(), -3);
    }

    #[test]
    fn test_constant_signal_is_degenerate() {
        let flat = vec![1.0; 50];
        let other = pulse_train(50, 0);
        let err = best_lag(&flat, &other).unwrap_err();
        assert!(matches!(err, ContractError::NumericDegeneration { .. }));
    }

    fn direct_lag(signal: &[f64], reference: &[f64]) -> i64 {
        let s = standardize(signal).unwrap();
        let r = standardize(reference).unwrap();
        let n = signal.len() as i64;
        let mut best = (0_i64, f64::NEG_INFINITY);
        for lag in -(n / 2)..=(n - n / 2 - 1) {
            let c: f64 = (0.max(-lag)..n.min(n - lag))
                .map(|m| s[(m + lag) as usize] * r[m as usize])
                .sum();
            if c.abs() > best.1 + 1e-9 * n as f64 {
                best = (lag, c.abs());
            }
        }
        best.0
    }

    #[test]
    fn test_matches_direct_sum() {
        for (n, shift) in [(400, 0), (401, 9), (333, 17)] {
            let a = pulse_train(n, 0);
            let b: Vec<f64> = pulse_train(n, shift)
                .iter()
                .enumerate()
                .map(|(i, v)| v + 0.05 * (i as f64 * 0.37).sin())
                .collect();
            assert_eq!(best_lag(&a, &b).unwrap(), direct_lag(&a, &b), "n={n} shift={shift}");
            assert_eq!(best_lag(&b, &a).unwrap(), direct_lag(&b, &a), "n={n} shift={shift}");
        }
    }

    #[test]
    fn test_long_signals() {
        // Ten minutes at 100 Hz
        let n: usize = 60_000;
        let signal: Vec<f64> = (0..n)
            .map(|i| (i as f64 * 0.013).sin() + 0.5 * (i as f64 * 0.0071).cos() + (i % 977) as f64 / 977.0)
            .collect();
        let delayed: Vec<f64> = (0..n).map(|i| signal[i.saturating_sub(12)]).collect();
        assert_eq!(best_lag(&signal, &delayed).unwrap(), -12);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(best_lag(&[1.0, 2.0, 3.0], &[1.0, 2.0]).is_err());
    }
}
