//! Agreement between measured and reference series.

use contracts::{ContractError, ValidationMetrics};
use nalgebra::{DMatrix, DVector};

/// ICC(2,1): two-way random effects, absolute agreement, single rater
///
/// Subjects are rows, the two series are raters. Clamped to `[0, 1]`.
pub fn icc(x: &[f64], y: &[f64]) -> Result<f64, ContractError> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Err(ContractError::validation("icc", "need at least two paired samples"));
    }
    let data = DMatrix::from_columns(&[
        DVector::from_column_slice(&x[..n]),
        DVector::from_column_slice(&y[..n]),
    ]);
    let k = 2.0;
    let rows = n as f64;
    let grand_mean = data.mean();

    let ss_total: f64 = data.iter().map(|v| (v - grand_mean).powi(2)).sum();
    let ss_rows: f64 = k * data
        .row_iter()
        .map(|row| (row.mean() - grand_mean).powi(2))
        .sum::<f64>();
    let ss_cols: f64 = rows * data
        .column_iter()
        .map(|col| (col.mean() - grand_mean).powi(2))
        .sum::<f64>();
    let ss_error = ss_total - ss_rows - ss_cols;

    let ms_rows = ss_rows / (rows - 1.0);
    let ms_cols = ss_cols / (k - 1.0);
    let ms_error = ss_error / ((rows - 1.0) * (k - 1.0));
    let denominator = ms_rows + (k - 1.0) * ms_error + k * (ms_cols - ms_error) / rows;
    if denominator.abs() <= f64::EPSILON {
        return Err(ContractError::numeric("icc", "series have no variance"));
    }
    let value = (ms_rows - ms_error) / denominator;
    if !value.is_finite() {
        return Err(ContractError::numeric("icc", "non-finite coefficient"));
    }
    Ok(value.clamp(0.0, 1.0))
}

/// Pearson correlation
fn pearson(x: &DVector<f64>, y: &DVector<f64>) -> Result<f64, ContractError> {
    let xc = x.add_scalar(-x.mean());
    let yc = y.add_scalar(-y.mean());
    let denominator = xc.norm() * yc.norm();
    if denominator <= f64::EPSILON {
        return Err(ContractError::numeric("r_squared", "series has zero variance"));
    }
    Ok(xc.dot(&yc) / denominator)
}

/// RMSE, MAE, ICC, R² and CV; the longer series is truncated
pub fn try_validation_metrics(
    measured: &[f64],
    reference: &[f64],
) -> Result<ValidationMetrics, ContractError> {
    let n = measured.len().min(reference.len());
    if measured.len() != reference.len() {
        tracing::warn!(
            measured = measured.len(),
            reference = reference.len(),
            "Length mismatch, truncating to shorter series"
        );
    }
    if n < 2 {
        return Err(ContractError::validation(
            "validation_metrics",
            "need at least two paired samples",
        ));
    }
    let m = DVector::from_column_slice(&measured[..n]);
    let r = DVector::from_column_slice(&reference[..n]);
    let diff = &m - &r;
    let samples = n as f64;

    let mean = m.mean();
    let cv = if mean != 0.0 {
        m.variance().sqrt() / mean * 100.0
    } else {
        0.0
    };
    let metrics = ValidationMetrics {
        rmse: (diff.norm_squared() / samples).sqrt(),
        mae: diff.abs().sum() / samples,
        icc: icc(&measured[..n], &reference[..n])?,
        r_squared: pearson(&m, &r)?.powi(2),
        cv,
    };
    tracing::debug!(rmse = metrics.rmse, icc = metrics.icc, "Validation metrics computed");
    Ok(metrics)
}
