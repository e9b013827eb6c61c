//! Anti-aliased downsampling.

use contracts::Channel;

use crate::filter::filter_low_pass;

/// Low-pass at `target_rate_hz / 2`, then keep every `floor(from / to)`-th sample
///
/// No-op when the target rate is not below the original.
pub fn downsample(signal: &[f64], original_rate_hz: f64, target_rate_hz: f64, order: usize) -> Vec<f64> {
    let Some(factor) = decimation_factor(original_rate_hz, target_rate_hz) else {
        return signal.to_vec();
    };
    let filtered = filter_low_pass(signal, target_rate_hz / 2.0, original_rate_hz, order);
    let out: Vec<f64> = filtered.into_iter().step_by(factor).collect();
    tracing::debug!(
        from_hz = original_rate_hz,
        to_hz = target_rate_hz,
        factor = factor,
        samples = out.len(),
        "Downsampled"
    );
    out
}

/// Downsample every axis of a channel
pub fn downsample_channel(
    channel: &Channel,
    original_rate_hz: f64,
    target_rate_hz: f64,
    order: usize,
) -> Channel {
    channel.map_axes(|axis| downsample(axis, original_rate_hz, target_rate_hz, order))
}

fn decimation_factor(original_rate_hz: f64, target_rate_hz: f64) -> Option<usize> {
    if target_rate_hz <= 0.0 || target_rate_hz >= original_rate_hz {
        tracing::warn!(
            from_hz = original_rate_hz,
            to_hz = target_rate_hz,
            "Target rate not below original, skipping downsampling"
        );
        return None;
    }
    Some(((original_rate_hz / target_rate_hz) as usize).max(1))
}
