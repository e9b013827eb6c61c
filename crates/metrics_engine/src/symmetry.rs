//! Bilateral symmetry.

use contracts::{ContractError, SymmetryMetrics};

use crate::kinematics::mean;

/// `|R - L| / (0.5 (R + L)) · 100`
pub fn symmetry_index(right: f64, left: f64) -> f64 {
    (right - left).abs() / (0.5 * (right + left)) * 100.0
}

/// Symmetry of two scalar limb values
pub fn try_symmetry_from_values(right: f64, left: f64) -> Result<SymmetryMetrics, ContractError> {
    if !right.is_finite() || !left.is_finite() {
        return Err(ContractError::numeric("symmetry_metrics", "non-finite limb value"));
    }
    if (right + left).abs() <= f64::EPSILON {
        return Err(ContractError::numeric(
            "symmetry_metrics",
            "limb values sum to zero",
        ));
    }
    let max_limb = right.max(left);
    let metrics = SymmetryMetrics {
        symmetry_index: symmetry_index(right, left),
        asymmetry_ratio: if left != 0.0 { right / left } else { 1.0 },
        difference: (right - left).abs(),
        bilateral_deficit: ((right + left) / (2.0 * max_limb) - 1.0) * 100.0,
    };
    tracing::debug!(
        symmetry_index = metrics.symmetry_index,
        asymmetry_ratio = metrics.asymmetry_ratio,
        "Symmetry metrics computed"
    );
    Ok(metrics)
}

/// Symmetry of the means of two limb series
pub fn try_symmetry_metrics(right: &[f64], left: &[f64]) -> Result<SymmetryMetrics, ContractError> {
    if right.is_empty() || left.is_empty() {
        return Err(ContractError::validation(
            "symmetry_metrics",
            "empty limb series",
        ));
    }
    try_symmetry_from_values(mean(right), mean(left))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetry_index_by_formula() {
        assert_eq!(symmetry_index(100.0, 100.0), 0.0);
        assert_eq!(symmetry_index(120.0, 80.0), 40.0);
    }

    #[test]
    fn test_series_means() {
        let m = try_symmetry_metrics(&[110.0, 130.0], &[70.0, 90.0]).unwrap();
        assert_eq!(m.symmetry_index, 40.0);
        assert_eq!(m.asymmetry_ratio, 1.5);
        assert_eq!(m.difference, 40.0);
        // (120 + 80) / 240 - 1
        assert!((m.bilateral_deficit - (200.0 / 240.0 - 1.0) * 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_left_gives_unit_ratio() {
        let m = try_symmetry_from_values(10.0, 0.0).unwrap();
        assert_eq!(m.asymmetry_ratio, 1.0);
        assert_eq!(m.symmetry_index, 200.0);
    }

    #[test]
    fn test_degenerate_input() {
        assert!(try_symmetry_metrics(&[], &[1.0]).is_err());
        assert!(try_symmetry_from_values(0.0, 0.0).is_err());
        assert!(try_symmetry_from_values(f64::NAN, 1.0).is_err());
    }
}
