//! Composite functional score.

use contracts::{FunctionalScore, ScoringConfig};

/// ROM, symmetry and GRF components summed to a 0–100 score
///
/// - ROM earns `rom_points` at the ceiling, proportionally below
/// - Symmetry loses all `symmetry_points` at `symmetry_zero_at_pct`
/// - GRF earns `grf_points` inside the band, scaled down linearly outside
pub fn functional_score(
    rom_deg: f64,
    symmetry_index_pct: f64,
    peak_grf_bw: f64,
    config: &ScoringConfig,
) -> FunctionalScore {
    let rom_component = (rom_deg / config.rom_ceiling_deg * config.rom_points)
        .clamp(0.0, config.rom_points);
    let symmetry_component = (config.symmetry_points
        - symmetry_index_pct / config.symmetry_zero_at_pct * config.symmetry_points)
        .max(0.0);

    let band = config.grf_band_bw;
    let grf_component = if band.contains(peak_grf_bw) {
        config.grf_points
    } else if peak_grf_bw < band.min {
        (peak_grf_bw / band.min * config.grf_points).max(0.0)
    } else {
        (config.grf_points - (peak_grf_bw - band.max) / band.max * config.grf_points).max(0.0)
    };

    let score = FunctionalScore {
        total: rom_component + symmetry_component + grf_component,
        rom_component,
        symmetry_component,
        grf_component,
    };
    tracing::debug!(total = score.total, "Functional score computed");
    score
}
