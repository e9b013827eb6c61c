//! Zero-phase low-pass filtering with safe degradation.

use contracts::{Channel, ContractError};

use crate::butterworth::{design_lowpass, filtfilt};

/// Relative margin under which a cutoff counts as Nyquist
const NYQUIST_TOLERANCE: f64 = 1e-9;

/// Zero-phase Butterworth low-pass
///
/// A cutoff at or above Nyquist is not an error: the input is returned
/// unchanged.
pub fn try_filter_low_pass(
    signal: &[f64],
    cutoff_hz: f64,
    sample_rate_hz: f64,
    order: usize,
) -> Result<Vec<f64>, ContractError> {
    if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
        return Err(ContractError::validation(
            "filter_low_pass",
            format!("invalid sample rate {sample_rate_hz}"),
        ));
    }
    let nyquist = sample_rate_hz / 2.0;
    // Grids derived from mean spacing land a hair off the nominal rate
    if cutoff_hz >= nyquist * (1.0 - NYQUIST_TOLERANCE) {
        tracing::warn!(
            cutoff_hz = cutoff_hz,
            nyquist_hz = nyquist,
            "Cutoff at or above Nyquist, returning signal unchanged"
        );
        return Ok(signal.to_vec());
    }
    if signal.iter().any(|v| !v.is_finite()) {
        return Err(ContractError::numeric(
            "filter_low_pass",
            "input contains NaN or infinite samples",
        ));
    }

    let sections = design_lowpass(order, cutoff_hz, sample_rate_hz)?;
    let filtered = filtfilt(&sections, signal)?;
    if filtered.iter().any(|v| !v.is_finite()) {
        return Err(ContractError::numeric(
            "filter_low_pass",
            "filter output is not finite",
        ));
    }

    tracing::debug!(cutoff_hz = cutoff_hz, order = order, "Low-pass applied");
    Ok(filtered)
}

/// [`try_filter_low_pass`], falling back to the unmodified input on failure
pub fn filter_low_pass(
    signal: &[f64],
    cutoff_hz: f64,
    sample_rate_hz: f64,
    order: usize,
) -> Vec<f64> {
    try_filter_low_pass(signal, cutoff_hz, sample_rate_hz, order).unwrap_or_else(|e| {
        tracing::warn!(error = %e, samples = signal.len(), "Filtering failed, keeping raw signal");
        observability::record_numeric_fallback("filter_low_pass");
        signal.to_vec()
    })
}

/// Filter every axis of a channel independently
pub fn filter_channel(
    channel: &Channel,
    cutoff_hz: f64,
    sample_rate_hz: f64,
    order: usize,
) -> Channel {
    channel.map_axes(|axis| filter_low_pass(axis, cutoff_hz, sample_rate_hz, order))
}
