//! Piecewise resampling onto a new time base.
//!
//! Both methods extrapolate past the knots with their end segment.

use contracts::InterpolationKind;

/// Knots required for a cubic spline; shorter inputs fall back to linear
const MIN_SPLINE_KNOTS: usize = 4;

/// Resample `(x, y)` at `xq`
///
/// `x` must be strictly increasing with at least two knots and `y.len() == x.len()`;
/// otherwise the output is empty.
pub fn resample(x: &[f64], y: &[f64], xq: &[f64], kind: InterpolationKind) -> Vec<f64> {
    if x.len() < 2 || x.len() != y.len() {
        return Vec::new();
    }
    match kind {
        InterpolationKind::Cubic if x.len() >= MIN_SPLINE_KNOTS => {
            let spline = NaturalSpline::fit(x, y);
            xq.iter().map(|&q| spline.eval(q)).collect()
        }
        _ => xq.iter().map(|&q| linear_at(x, y, q)).collect(),
    }
}

/// Index `i` of the segment `[x[i], x[i+1]]` used for `q` (end segments extend outward)
fn segment(x: &[f64], q: f64) -> usize {
    let upper = x.partition_point(|&knot| knot <= q);
    upper.saturating_sub(1).min(x.len() - 2)
}

fn linear_at(x: &[f64], y: &[f64], q: f64) -> f64 {
    let i = segment(x, q);
    let slope = (y[i + 1] - y[i]) / (x[i + 1] - x[i]);
    y[i] + slope * (q - x[i])
}

/// Natural cubic spline (zero second derivative at both ends)
struct NaturalSpline<'a> {
    x: &'a [f64],
    y: &'a [f64],
    /// Second derivatives at the knots
    m: Vec<f64>,
}

impl<'a> NaturalSpline<'a> {
    fn fit(x: &'a [f64], y: &'a [f64]) -> Self {
        let n = x.len();
        let mut m = vec![0.0; n];
        let interior = n - 2;

        // Tridiagonal system for m[1..n-1], solved with the Thomas algorithm
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let mut diag = vec![0.0; interior];
        let mut upper = vec![0.0; interior];
        let mut rhs = vec![0.0; interior];
        for k in 0..interior {
            let i = k + 1;
            diag[k] = 2.0 * (h[i - 1] + h[i]);
            upper[k] = h[i];
            rhs[k] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }

        // Forward sweep; the sub-diagonal entry for row k is h[k]
        for k in 1..interior {
            let w = h[k] / diag[k - 1];
            diag[k] -= w * upper[k - 1];
            rhs[k] -= w * rhs[k - 1];
        }

        // Back substitution
        for k in (0..interior).rev() {
            let next = if k + 1 < interior { m[k + 2] } else { 0.0 };
            m[k + 1] = (rhs[k] - upper[k] * next) / diag[k];
        }

        Self { x, y, m }
    }

    fn eval(&self, q: f64) -> f64 {
        let i = segment(self.x, q);
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        let (m0, m1) = (self.m[i], self.m[i + 1]);
        let h = x1 - x0;
        let a = x1 - q;
        let b = q - x0;

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knots(n: usize, dt: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * dt).collect()
    }

    #[test]
    fn test_linear_passes_through_knots_and_extrapolates() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, 2.0, 3.0];
        let out = resample(&x, &y, &[0.0, 0.5, 2.0, 3.0, -1.0], InterpolationKind::Linear);
        assert_eq!(out, vec![0.0, 1.0, 3.0, 4.0, -2.0]);
    }

    #[test]
    fn test_spline_reproduces_knots() {
        let x = knots(20, 0.1);
        let y: Vec<f64> = x.iter().map(|t| (2.0 * t).sin()).collect();
        let out = resample(&x, &y, &x, InterpolationKind::Cubic);
        for (a, b) in out.iter().zip(&y) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_spline_reproduces_straight_line() {
        // A natural spline is exact for linear data, including extrapolation
        let x = [0.0, 0.3, 0.7, 1.0, 1.6];
        let y: Vec<f64> = x.iter().map(|t| 3.0 * t - 1.0).collect();
        let q = [-0.5, 0.1, 0.5, 1.3, 2.0];
        let out = resample(&x, &y, &q, InterpolationKind::Cubic);
        for (value, t) in out.iter().zip(q) {
            assert!((value - (3.0 * t - 1.0)).abs() < 1e-10);
        }
    }

    #[test]
    fn test_spline_tracks_smooth_signal() {
        // 60 Hz knots, 100 Hz query, 1 Hz sine
        let x = knots(121, 1.0 / 60.0);
        let y: Vec<f64> = x.iter().map(|t| (std::f64::consts::TAU * t).sin()).collect();
        let q: Vec<f64> = (0..=200).map(|i| 0.1 + i as f64 * 0.009).collect();
        let out = resample(&x, &y, &q, InterpolationKind::Cubic);
        for (value, t) in out.iter().zip(&q) {
            let expected = (std::f64::consts::TAU * t).sin();
            assert!((value - expected).abs() < 1e-4, "t={t}: {value} vs {expected}");
        }
    }

    #[test]
    fn test_short_input_falls_back_to_linear() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, 1.0, 0.0];
        let cubic = resample(&x, &y, &[0.5, 1.5], InterpolationKind::Cubic);
        assert_eq!(cubic, vec![0.5, 0.5]);
    }

    #[test]
    fn test_invalid_input_is_empty() {
        assert!(resample(&[0.0], &[1.0], &[0.0], InterpolationKind::Linear).is_empty());
        assert!(resample(&[0.0, 1.0], &[1.0], &[0.0], InterpolationKind::Cubic).is_empty());
    }
}
