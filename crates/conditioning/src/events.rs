//! Threshold crossing event detection.

use contracts::EventWindow;

/// Windows where `signal > threshold`
///
/// A window starts at the first sample above the threshold and ends at the
/// first sample back at or below it. A falling edge before the first rising
/// edge and an unmatched trailing rising edge are discarded. When both
/// `min_duration_s` and `sample_rate_hz` are given, windows shorter than
/// `floor(min_duration_s * sample_rate_hz)` samples are dropped.
pub fn detect_threshold_events(
    signal: &[f64],
    threshold: f64,
    min_duration_s: Option<f64>,
    sample_rate_hz: Option<f64>,
) -> Vec<EventWindow> {
    let mut starts = Vec::new();
    let mut ends = Vec::new();
    for (i, pair) in signal.windows(2).enumerate() {
        match (pair[0] > threshold, pair[1] > threshold) {
            (false, true) => starts.push(i + 1),
            (true, false) => ends.push(i + 1),
            _ => {}
        }
    }

    if let (Some(&first_start), Some(&first_end)) = (starts.first(), ends.first()) {
        if first_start > first_end {
            ends.remove(0);
        }
    }

    let min_samples = match (min_duration_s, sample_rate_hz) {
        (Some(duration), Some(rate)) => (duration * rate).max(0.0) as usize,
        _ => 0,
    };

    let events: Vec<EventWindow> = starts
        .into_iter()
        .zip(ends)
        .filter(|(start, end)| end - start >= min_samples)
        .filter_map(|(start, end)| EventWindow::new(start, end))
        .collect();

    tracing::debug!(events = events.len(), threshold = threshold, "Threshold events detected");
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulses() -> Vec<f64> {
        let mut x = vec![0.0; 5];
        x.extend(vec![10.0; 8]);
        x.extend(vec![0.0; 6]);
        x.extend(vec![10.0; 4]);
        x.extend(vec![0.0; 5]);
        x
    }

    #[test]
    fn test_two_clean_pulses() {
        let events = detect_threshold_events(&pulses(), 5.0, None, None);
        assert_eq!(
            events,
            vec![EventWindow { start: 5, end: 13 }, EventWindow { start: 19, end: 23 }]
        );
        assert!(events.iter().all(|e| e.end > e.start));
    }

    #[test]
    fn test_minimum_duration_filter() {
        // 0.05 s at 100 Hz = 5 samples: the 4-sample pulse is dropped
        let events = detect_threshold_events(&pulses(), 5.0, Some(0.05), Some(100.0));
        assert_eq!(events, vec![EventWindow { start: 5, end: 13 }]);

        // Duration without a rate is ignored
        assert_eq!(detect_threshold_events(&pulses(), 5.0, Some(0.05), None).len(), 2);
    }

    #[test]
    fn test_leading_and_trailing_edges_discarded() {
        // Starts high, ends high: only the complete middle pulse survives
        let x = [9.0, 9.0, 0.0, 0.0, 9.0, 9.0, 0.0, 9.0, 9.0];
        let events = detect_threshold_events(&x, 5.0, None, None);
        assert_eq!(events, vec![EventWindow { start: 4, end: 6 }]);
    }

    #[test]
    fn test_no_crossings() {
        assert!(detect_threshold_events(&[1.0; 10], 5.0, None, None).is_empty());
        assert!(detect_threshold_events(&[9.0; 10], 5.0, None, None).is_empty());
        assert!(detect_threshold_events(&[], 5.0, None, None).is_empty());
    }

    #[test]
    fn test_equal_to_threshold_is_not_above() {
        let x = [0.0, 5.0, 6.0, 5.0, 0.0];
        let events = detect_threshold_events(&x, 5.0, None, None);
        assert_eq!(events, vec![EventWindow { start: 2, end: 3 }]);
    }
}
