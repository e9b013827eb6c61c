//! Human-readable analysis summary.

use contracts::{AlertSummary, AnalysisResult, Severity, SubjectInfo};

pub(crate) const HEADER: &str = "=== KNEE BIOMECHANICS ANALYSIS SUMMARY ===";

/// Multi-line report over a completed result
pub fn render_summary(result: &AnalysisResult, subject: &SubjectInfo, alerts: &AlertSummary) -> String {
    let mut lines = vec![HEADER.to_string(), String::new()];

    lines.push(format!("Exercise: {}", result.exercise));
    let height = subject
        .height_m
        .map(|h| format!("{h:.2} m"))
        .unwrap_or_else(|| "unknown".to_string());
    lines.push(format!(
        "Subject: {:.1} kg | Height: {height}",
        subject.body_mass_kg
    ));
    lines.push(format!(
        "Synchronization: offset {:.1} ms | quality {:.2}{}",
        result.sync.time_offset * 1000.0,
        result.sync.quality,
        result
            .sync
            .reference_location
            .map(|loc| format!(" | reference {loc}"))
            .unwrap_or_default()
    ));
    lines.push(String::new());

    if !result.kinematic.is_empty() {
        lines.push("--- KINEMATICS ---".to_string());
        for (joint, m) in &result.kinematic {
            lines.push(format!(
                "{}: ROM = {:.1}°, Peak flexion = {:.1}°, Peak angular velocity = {:.1} deg/s",
                joint.to_uppercase(),
                m.rom,
                m.peak_flexion,
                m.peak_angular_velocity
            ));
        }
        if !result.events.repetitions.is_empty() {
            lines.push(format!("Repetitions: {}", result.events.repetitions.len()));
        }
        lines.push(String::new());
    }

    if !result.force.is_empty() || !result.dynamic.is_empty() {
        lines.push("--- KINETICS ---".to_string());
        for (contact, m) in &result.force {
            lines.push(format!(
                "{}: Peak GRF = {:.2} BW, Loading rate = {:.1} BW/s, Contact time = {:.3} s",
                contact.to_uppercase(),
                m.peak_grf,
                m.loading_rate,
                m.contact_time
            ));
        }
        for (contact, height) in &result.jump_heights {
            lines.push(format!("{}: Jump height = {:.3} m", contact.to_uppercase(), height));
        }
        for (joint, m) in &result.dynamic {
            lines.push(format!(
                "{}: Peak moment = {:.2} Nm/kg, Peak power = {:.2} W/kg",
                joint.to_uppercase(),
                m.peak_moment,
                m.peak_power
            ));
        }
        lines.push(String::new());
    }

    if let Some(symmetry) = &result.symmetry {
        lines.push("--- SYMMETRY ---".to_string());
        lines.push(format!("Symmetry index: {:.1}%", symmetry.symmetry_index));
        lines.push(format!("Asymmetry ratio: {:.2}", symmetry.asymmetry_ratio));
        lines.push(String::new());
    }

    if let Some(score) = &result.functional_score {
        lines.push("--- FUNCTIONAL SCORE ---".to_string());
        lines.push(format!(
            "Total: {:.1}/100 (ROM {:.1}, Symmetry {:.1}, GRF {:.1})",
            score.total, score.rom_component, score.symmetry_component, score.grf_component
        ));
        lines.push(String::new());
    }

    if alerts.total > 0 {
        lines.push("--- ALERTS ---".to_string());
        lines.push(format!(
            "Total: {} | Critical: {} | Errors: {} | Warnings: {}",
            alerts.total,
            alerts.count(Severity::Critical),
            alerts.count(Severity::Error),
            alerts.count(Severity::Warning)
        ));
    }

    lines.join("\n")
}
