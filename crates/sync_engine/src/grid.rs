//! Common time grid and offset scoring helpers.

/// Offsets below this are treated as perfect alignment (seconds)
const PERFECT_OFFSET_S: f64 = 0.001;
/// Offsets above this score zero (seconds)
const WORST_OFFSET_S: f64 = 0.1;

/// Overlap `[start, end]` of two clocks, `None` when `end <= start`
pub fn overlap_window(a: &[f64], b: &[f64]) -> Option<(f64, f64)> {
    let (a0, a1) = (*a.first()?, *a.last()?);
    let (b0, b1) = (*b.first()?, *b.last()?);
    let start = a0.max(b0);
    let end = a1.min(b1);
    (end > start).then_some((start, end))
}

/// Uniform grid `start + i / frequency` for `i = 0..=floor((end - start) * frequency)`
///
/// Every step equals `1 / frequency` up to rounding; the last point never
/// exceeds `end` by more than rounding error.
pub fn uniform_grid(start: f64, end: f64, frequency_hz: f64) -> Vec<f64> {
    if !start.is_finite() || !end.is_finite() || end < start || frequency_hz <= 0.0 {
        return Vec::new();
    }
    // Guard against (end - start) * f landing a hair below an integer
    let steps = ((end - start) * frequency_hz + 1e-9).floor() as usize;
    (0..=steps)
        .map(|i| start + i as f64 / frequency_hz)
        .collect()
}

/// Clamp an offset to `±max_abs`, preserving its sign
pub fn clamp_offset(offset: f64, max_abs: f64) -> f64 {
    if offset.abs() > max_abs {
        max_abs.copysign(offset)
    } else {
        offset
    }
}

/// Alignment quality in [0, 1]
///
/// 1.0 below 1 ms, 0.0 above 100 ms, linear in between.
pub fn sync_quality(offset: f64) -> f64 {
    let magnitude = offset.abs();
    if magnitude < PERFECT_OFFSET_S {
        1.0
    } else if magnitude > WORST_OFFSET_S {
        0.0
    } else {
        1.0 - (magnitude - PERFECT_OFFSET_S) / (WORST_OFFSET_S - PERFECT_OFFSET_S)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_window() {
        let a = [0.0, 1.0, 2.0, 3.0];
        let b = [1.5, 2.5, 4.0];
        assert_eq!(overlap_window(&a, &b), Some((1.5, 3.0)));

        let c = [5.0, 6.0];
        assert_eq!(overlap_window(&a, &c), None);
        // Touching clocks have no overlap
        let d = [3.0, 4.0];
        assert_eq!(overlap_window(&a, &d), None);
        assert_eq!(overlap_window(&[], &a), None);
    }

    #[test]
    fn test_uniform_grid_spacing() {
        let grid = uniform_grid(0.25, 2.0, 100.0);
        assert_eq!(grid.len(), 176);
        assert!((grid[0] - 0.25).abs() < 1e-12);
        assert!((grid[175] - 2.0).abs() < 1e-9);
        for w in grid.windows(2) {
            assert!((w[1] - w[0] - 0.01).abs() < 1e-9, "step {}", w[1] - w[0]);
        }
    }

    #[test]
    fn test_uniform_grid_partial_step() {
        // 0.995 s at 100 Hz: last point stays inside the window
        let grid = uniform_grid(0.0, 0.995, 100.0);
        assert_eq!(grid.len(), 100);
        assert!(*grid.last().unwrap() <= 0.995);
    }

    #[test]
    fn test_uniform_grid_degenerate() {
        assert!(uniform_grid(1.0, 0.0, 100.0).is_empty());
        assert!(uniform_grid(0.0, 1.0, 0.0).is_empty());
        assert_eq!(uniform_grid(1.0, 1.0, 100.0), vec![1.0]);
    }

    #[test]
    fn test_clamp_offset() {
        assert_eq!(clamp_offset(0.2, 0.5), 0.2);
        assert_eq!(clamp_offset(0.8, 0.5), 0.5);
        assert_eq!(clamp_offset(-0.8, 0.5), -0.5);
    }

    #[test]
    fn test_quality_bounds() {
        assert_eq!(sync_quality(0.0), 1.0);
        assert_eq!(sync_quality(0.0005), 1.0);
        assert_eq!(sync_quality(0.1001), 0.0);
        assert_eq!(sync_quality(-0.5), 0.0);
        assert!((sync_quality(0.0505) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_quality_non_increasing() {
        let mut previous = f64::INFINITY;
        for i in 0..=200 {
            let q = sync_quality(i as f64 * 0.001);
            assert!((0.0..=1.0).contains(&q));
            assert!(q <= previous, "quality rose at {} ms", i);
            previous = q;
        }
    }
}
