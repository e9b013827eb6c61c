//! Butterworth low-pass design and zero-phase second-order-section filtering.

use contracts::ContractError;

/// One second-order section, `a0` normalized to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Biquad {
    /// Gain at 0 Hz
    pub fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// Direct-form-II-transposed state reached by a unit step at steady state
    fn step_state(&self) -> [f64; 2] {
        let g = self.dc_gain();
        let z1 = self.b2 - self.a2 * g;
        let z0 = self.b1 - self.a1 * g + z1;
        [z0, z1]
    }

    #[inline]
    fn tick(&self, x: f64, state: &mut [f64; 2]) -> f64 {
        let y = self.b0 * x + state[0];
        state[0] = self.b1 * x - self.a1 * y + state[1];
        state[1] = self.b2 * x - self.a2 * y;
        y
    }

    /// True for the first-order section of an odd-order design
    fn is_first_order(&self) -> bool {
        self.b2 == 0.0 && self.a2 == 0.0
    }
}

/// Digital Butterworth low-pass of `order` as cascaded sections
///
/// Bilinear transform with frequency prewarping; unity gain at DC.
pub fn design_lowpass(
    order: usize,
    cutoff_hz: f64,
    sample_rate_hz: f64,
) -> Result<Vec<Biquad>, ContractError> {
    if order == 0 {
        return Err(ContractError::validation("butterworth", "order must be >= 1"));
    }
    let in_band = cutoff_hz > 0.0 && sample_rate_hz > 0.0 && cutoff_hz < sample_rate_hz / 2.0;
    if !in_band {
        return Err(ContractError::validation(
            "butterworth",
            format!("cutoff {cutoff_hz} Hz outside (0, {}) Hz", sample_rate_hz / 2.0),
        ));
    }

    let k = (std::f64::consts::PI * cutoff_hz / sample_rate_hz).tan();
    let k2 = k * k;
    let n = order as f64;

    let mut sections: Vec<Biquad> = (0..order / 2)
        .map(|i| {
            let angle = std::f64::consts::PI * (n - 1.0 - 2.0 * i as f64) / (2.0 * n);
            let q = 1.0 / (2.0 * angle.cos());
            let norm = 1.0 / (1.0 + k / q + k2);
            let b0 = k2 * norm;
            Biquad {
                b0,
                b1: 2.0 * b0,
                b2: b0,
                a1: 2.0 * (k2 - 1.0) * norm,
                a2: (1.0 - k / q + k2) * norm,
            }
        })
        .collect();

    if order % 2 == 1 {
        let b = k / (k + 1.0);
        sections.push(Biquad {
            b0: b,
            b1: b,
            b2: 0.0,
            a1: (k - 1.0) / (k + 1.0),
            a2: 0.0,
        });
    }

    Ok(sections)
}

/// Edge padding used by [`filtfilt`]
pub fn pad_length(sections: &[Biquad]) -> usize {
    let first_order = sections.iter().filter(|s| s.is_first_order()).count();
    3 * (2 * sections.len() + 1 - first_order)
}

/// Causal cascade filter starting from `state`
fn run(sections: &[Biquad], input: &[f64], mut state: Vec<[f64; 2]>) -> Vec<f64> {
    input
        .iter()
        .map(|&x| {
            sections
                .iter()
                .zip(state.iter_mut())
                .fold(x, |acc, (section, s)| section.tick(acc, s))
        })
        .collect()
}

/// Per-section initial state for a step of height `level`
fn steady_state(sections: &[Biquad], level: f64) -> Vec<[f64; 2]> {
    let mut scale = level;
    sections
        .iter()
        .map(|section| {
            let [z0, z1] = section.step_state();
            let state = [z0 * scale, z1 * scale];
            scale *= section.dc_gain();
            state
        })
        .collect()
}

/// Zero-phase forward-backward filtering
///
/// The signal is extended at both ends by odd reflection and each pass
/// starts from the steady state of its first sample, so edges carry no
/// start-up transient.
pub fn filtfilt(sections: &[Biquad], x: &[f64]) -> Result<Vec<f64>, ContractError> {
    let pad = pad_length(sections);
    let n = x.len();
    if n <= pad {
        return Err(ContractError::validation(
            "filtfilt",
            format!("{n} samples, need more than {pad}"),
        ));
    }

    let first = x[0];
    let last = x[n - 1];
    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first - x[i]));
    extended.extend_from_slice(x);
    extended.extend((1..=pad).map(|i| 2.0 * last - x[n - 1 - i]));

    let forward = run(sections, &extended, steady_state(sections, extended[0]));

    let mut reversed: Vec<f64> = forward.into_iter().rev().collect();
    let backward = run(sections, &reversed, steady_state(sections, reversed[0]));
    reversed = backward;
    reversed.reverse();

    Ok(reversed[pad..pad + n].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unity_dc_gain() {
        for order in 1..=6 {
            let sections = design_lowpass(order, 10.0, 100.0).unwrap();
            assert_eq!(sections.len(), order.div_ceil(2));
            let gain: f64 = sections.iter().map(Biquad::dc_gain).product();
            assert!((gain - 1.0).abs() < 1e-12, "order {order}: {gain}");
        }
    }

    #[test]
    fn test_order_two_matches_reference_coefficients() {
        // Second-order Butterworth, fc = fs / 4: b = [0.2929, 0.5858, 0.2929], a = [1, 0, 0.1716]
        let sections = design_lowpass(2, 25.0, 100.0).unwrap();
        let s = sections[0];
        assert!((s.b0 - 0.292_893_2).abs() < 1e-6);
        assert!((s.b1 - 0.585_786_4).abs() < 1e-6);
        assert!(s.a1.abs() < 1e-12);
        assert!((s.a2 - 0.171_572_9).abs() < 1e-6);
    }

    #[test]
    fn test_pad_length() {
        assert_eq!(pad_length(&design_lowpass(4, 10.0, 100.0).unwrap()), 15);
        assert_eq!(pad_length(&design_lowpass(3, 10.0, 100.0).unwrap()), 12);
        assert_eq!(pad_length(&design_lowpass(1, 10.0, 100.0).unwrap()), 6);
    }

    #[test]
    fn test_constant_passes_unchanged() {
        let sections = design_lowpass(4, 5.0, 100.0).unwrap();
        let out = filtfilt(&sections, &vec![3.5; 200]).unwrap();
        for v in out {
            assert!((v - 3.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_linear_ramp_passes_unchanged() {
        let sections = design_lowpass(4, 5.0, 100.0).unwrap();
        let ramp: Vec<f64> = (0..400).map(|i| 0.25 * i as f64).collect();
        let out = filtfilt(&sections, &ramp).unwrap();
        for (a, b) in out.iter().zip(&ramp).skip(100).take(200) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn test_high_frequency_removed() {
        let fs = 1000.0;
        let sections = design_lowpass(4, 50.0, fs).unwrap();
        let x: Vec<f64> = (0..2000)
            .map(|i| {
                let t = i as f64 / fs;
                (std::f64::consts::TAU * 2.0 * t).sin() + 0.5 * (std::f64::consts::TAU * 300.0 * t).sin()
            })
            .collect();
        let out = filtfilt(&sections, &x).unwrap();
        for (i, v) in out.iter().enumerate().skip(200).take(1600) {
            let t = i as f64 / fs;
            let expected = (std::f64::consts::TAU * 2.0 * t).sin();
            assert!((v - expected).abs() < 0.01, "sample {i}: {v} vs {expected}");
        }
    }

    #[test]
    fn test_short_signal_rejected() {
        let sections = design_lowpass(4, 5.0, 100.0).unwrap();
        assert!(filtfilt(&sections, &[1.0; 15]).is_err());
        assert!(filtfilt(&sections, &[1.0; 16]).is_ok());
    }

    #[test]
    fn test_invalid_design() {
        assert!(design_lowpass(0, 5.0, 100.0).is_err());
        assert!(design_lowpass(4, 50.0, 100.0).is_err());
        assert!(design_lowpass(4, -1.0, 100.0).is_err());
    }
}
