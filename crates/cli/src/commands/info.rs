//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use contracts::{AnalysisConfig, ExerciseProfile};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo<'a> {
    source: String,
    sync: SyncInfo,
    filter: FilterInfo,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    exercises: BTreeMap<&'a str, &'a ExerciseProfile>,
}

#[derive(Serialize)]
struct SyncInfo {
    target_frequency_hz: f64,
    interpolation: String,
    max_time_offset_ms: f64,
    reference_priority: Vec<String>,
}

#[derive(Serialize)]
struct FilterInfo {
    order: usize,
    imu_acc_cutoff_hz: f64,
    imu_gyro_cutoff_hz: f64,
    force_cutoff_hz: f64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let source = args
        .config
        .as_ref()
        .map_or_else(|| "built-in defaults".to_string(), |p| p.display().to_string());
    info!(source = %source, "Loading configuration info");

    if args.json {
        let info = build_config_info(&config, source, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, &source, args);
    }

    Ok(())
}

fn build_config_info<'a>(config: &'a AnalysisConfig, source: String, args: &InfoArgs) -> ConfigInfo<'a> {
    let exercises = if args.exercises {
        config
            .exercises
            .iter()
            .map(|(tag, profile)| (tag.as_str(), profile))
            .collect()
    } else {
        BTreeMap::new()
    };

    ConfigInfo {
        source,
        sync: SyncInfo {
            target_frequency_hz: config.sync.target_frequency_hz,
            interpolation: format!("{:?}", config.sync.interpolation),
            max_time_offset_ms: config.sync.max_time_offset_s * 1000.0,
            reference_priority: config
                .sync
                .reference_priority
                .iter()
                .map(|l| l.to_string())
                .collect(),
        },
        filter: FilterInfo {
            order: config.filter.order,
            imu_acc_cutoff_hz: config.filter.imu_acc_cutoff_hz,
            imu_gyro_cutoff_hz: config.filter.imu_gyro_cutoff_hz,
            force_cutoff_hz: config.filter.force_cutoff_hz,
        },
        exercises,
    }
}

fn print_config_info(config: &AnalysisConfig, source: &str, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Knee Analyzer Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("📄 Source: {}", source);

    let sync = &config.sync;
    println!("\n⏱  Synchronization");
    println!("   ├─ Grid: {} Hz ({:?})", sync.target_frequency_hz, sync.interpolation);
    println!("   ├─ Max offset: {:.0} ms", sync.max_time_offset_s * 1000.0);
    let priority: Vec<&str> = sync.reference_priority.iter().map(|l| l.as_str()).collect();
    println!("   └─ Reference: {}", priority.join(" → "));

    let filter = &config.filter;
    println!("\n🎚  Butterworth (order {})", filter.order);
    println!("   ├─ IMU acceleration: {} Hz", filter.imu_acc_cutoff_hz);
    println!("   ├─ IMU gyroscope: {} Hz", filter.imu_gyro_cutoff_hz);
    println!("   └─ Force: {} Hz", filter.force_cutoff_hz);

    let physics = &config.physics;
    println!("\n⚖️  Physics");
    println!("   ├─ Gravity: {} m/s²", physics.gravity);
    println!(
        "   └─ Knee moment estimate: {}",
        if physics.estimate_knee_moment { "on" } else { "off" }
    );

    if args.exercises {
        println!("\n🏋  Exercises ({})", config.exercises.len());
        let count = config.exercises.len();
        for (i, (tag, profile)) in config.exercises.iter().enumerate() {
            let prefix = if i + 1 == count { "└─" } else { "├─" };
            println!(
                "   {} {}: contact > {} N, GRF {:.1}-{:.1} BW, ROM {:.0}-{:.0}°{}",
                prefix,
                tag,
                profile.contact_threshold_n,
                profile.grf_band_bw.min,
                profile.grf_band_bw.max,
                profile.rom_band_deg.min,
                profile.rom_band_deg.max,
                if profile.jump { ", jump" } else { "" }
            );
        }
    } else {
        println!("\n🏋  {} exercises (use --exercises to list)", config.exercises.len());
    }

    println!();
}
