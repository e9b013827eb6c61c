//! Repetition statistics and reference comparisons.

use contracts::{Band, EventWindow, ReferenceComparison, ReferenceStatus, RepetitionStats};

use crate::kinematics::range_of_motion;

/// Mean, population std, min, max, median, CV and count
///
/// All-zero stats for an empty input; CV is 0 when the mean is 0.
pub fn repetition_statistics(values: &[f64]) -> RepetitionStats {
    if values.is_empty() {
        return RepetitionStats::default();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    RepetitionStats {
        mean,
        std,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        median,
        cv: if mean != 0.0 { std / mean * 100.0 } else { 0.0 },
        count: values.len(),
    }
}

/// Slices `signal[start..end]` for each window that fits
fn window_slices<'a>(
    signal: &'a [f64],
    windows: &'a [EventWindow],
) -> impl Iterator<Item = &'a [f64]> + 'a {
    windows
        .iter()
        .filter_map(move |w| signal.get(w.start..w.end.min(signal.len())))
        .filter(|segment| !segment.is_empty())
}

/// ROM of each cycle, summarized
pub fn rom_multiple_cycles(angle: &[f64], cycles: &[EventWindow]) -> RepetitionStats {
    let roms: Vec<f64> = window_slices(angle, cycles).map(range_of_motion).collect();
    repetition_statistics(&roms)
}

/// Peak `fz / body_weight_n` of each contact, summarized
pub fn grf_peaks_multiple_contacts(
    fz: &[f64],
    contacts: &[EventWindow],
    body_weight_n: f64,
) -> RepetitionStats {
    if body_weight_n <= 0.0 {
        return RepetitionStats::default();
    }
    let peaks: Vec<f64> = window_slices(fz, contacts)
        .map(|segment| segment.iter().copied().fold(f64::NEG_INFINITY, f64::max) / body_weight_n)
        .collect();
    repetition_statistics(&peaks)
}

/// Position of `value` relative to `band`, deviation in percent of the band midpoint
pub fn compare_with_reference(metric: &str, value: f64, band: Band) -> ReferenceComparison {
    let reference_mean = band.midpoint();
    let (status, deviation) = if band.contains(value) {
        (ReferenceStatus::Normal, 0.0)
    } else if value < band.min {
        (ReferenceStatus::Below, band.min - value)
    } else {
        (ReferenceStatus::Above, value - band.max)
    };
    let deviation_percent = if reference_mean != 0.0 {
        deviation / reference_mean * 100.0
    } else {
        0.0
    };
    ReferenceComparison {
        metric: metric.to_string(),
        value,
        reference_min: band.min,
        reference_max: band.max,
        reference_mean,
        status,
        deviation_percent,
    }
}
