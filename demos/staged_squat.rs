//! Staged Squat Example
//!
//! Runs each analysis stage by hand on a synthetic squat session, the way the
//! pipeline does internally, and prints what every stage produced.
//!
//! Run with: cargo run -p demos --bin staged_squat [config.toml]

use alert_engine::{AlertContext, AlertEngine, AlertRules};
use analysis::{knee_trace, Side};
use conditioning::SignalConditioner;
use config_loader::ConfigLoader;
use contracts::{
    imu_signal_key, AnalysisConfig, Channel, ForceChannel, ImuChannel, MetricsRecord, ProcessedSignals,
};
use ingestion::SyntheticSession;
use metrics_engine::{mean_spacing, MetricsEngine};
use observability::{LogFormat, ObservabilityConfig};
use sync_engine::TemporalSynchronizer;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        ..Default::default()
    })?;

    tracing::info!("Starting staged squat demo");

    // ==== Stage 0: Configuration and input ====
    let config = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading analysis config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        AnalysisConfig::default()
    };
    let session = SyntheticSession::squat().with_imu_offset(0.02).build()?;

    // ==== Stage 1: Synchronization ====
    let sync = TemporalSynchronizer::new(config.sync.clone()).try_synchronize(&session.imu, &session.force)?;
    println!(
        "Sync: {} samples, offset {:.1} ms, quality {:.2}",
        sync.time_common.len(),
        sync.time_offset * 1000.0,
        sync.quality
    );

    // ==== Stage 2: Conditioning ====
    let dt = mean_spacing(&sync.time_common).ok_or("common grid too short")?;
    let conditioner = SignalConditioner::from_config(&config);
    let fz_raw = sync.force.get(&ForceChannel::Fz).ok_or("no vertical force")?;
    let fz = conditioner.filter_force(fz_raw, 1.0 / dt);

    let mut signals = ProcessedSignals::new(sync.time_common.clone());
    for (location, channels) in &sync.imu {
        if let Some(gyro) = channels.get(&ImuChannel::Gyroscope) {
            signals.insert(
                imu_signal_key(*location, "gyro"),
                conditioner.filter_imu_gyro(gyro, 1.0 / dt),
            );
        }
    }
    signals.insert("fz", Channel::scalar(fz.clone()));
    println!("Conditioned {} signals at {:.1} Hz", signals.len(), 1.0 / dt);

    // ==== Stage 3: Events ====
    let profile = config.profile(&session.exercise);
    let contacts = conditioner.detect_grf_contacts(&fz, profile.contact_threshold_n, 1.0 / dt);
    let right = knee_trace(&signals, Side::Right, dt).ok_or("right knee sensors missing")?;
    let left = knee_trace(&signals, Side::Left, dt).ok_or("left knee sensors missing")?;
    println!("Contacts: {:?}", contacts);

    // ==== Stage 4: Metrics ====
    let metrics = MetricsEngine::from_config(&config);
    let body_weight = session.subject.body_weight_n(config.physics.gravity);
    let kinematic = metrics.kinematic(&sync.time_common, &right.angle);
    let symmetry = metrics.symmetry(&right.angle, &left.angle);
    println!(
        "Right knee: ROM {:.1}°, peak flexion {:.1}°, peak angular velocity {:.1} deg/s",
        kinematic.rom, kinematic.peak_flexion, kinematic.peak_angular_velocity
    );
    println!(
        "Symmetry: index {:.1}%, ratio {:.2}",
        symmetry.symmetry_index, symmetry.asymmetry_ratio
    );

    // ==== Stage 5: Alerts ====
    let mut alerts = AlertEngine::new(AlertRules::for_exercise(&config, &session.exercise));
    alerts.check_sync_quality(sync.quality);
    alerts.evaluate_record(&MetricsRecord::from(kinematic), &AlertContext::new("knee_right"));
    alerts.evaluate_record(&MetricsRecord::from(symmetry), &AlertContext::new("knees"));
    for contact in &contacts {
        let force = metrics.force(&sync.time_common, &fz, body_weight, *contact);
        println!(
            "Contact {}..{}: peak {:.2} BW, loading rate {:.1} BW/s, impulse {:.0} N·s",
            contact.start, contact.end, force.peak_grf, force.loading_rate, force.impulse
        );
        alerts.evaluate_record(&MetricsRecord::from(force), &AlertContext::new("contact"));
    }

    let summary = alerts.summary();
    println!("Alerts: {} total, {} active", summary.total, summary.active);
    for alert in alerts.alerts() {
        println!("  [{}] {}: {}", alert.severity, alert.title, alert.message);
    }

    Ok(())
}
