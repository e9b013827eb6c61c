//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Knee Analyzer - biomechanical analysis of IMU + force platform sessions
#[derive(Parser, Debug)]
#[command(
    name = "knee-analyzer",
    author,
    version,
    about = "Knee biomechanics analysis of synchronized IMU and force platform captures",
    long_about = "Synchronizes IMU and force platform captures, conditions the signals, \n\
                  computes knee kinematics, kinetics and symmetry, and raises clinical \n\
                  and technical alerts."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "KNEE_ANALYZER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "KNEE_ANALYZER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze capture files or a synthetic session
    Analyze(AnalyzeArgs),

    /// Write a synthetic capture file
    Generate(GenerateArgs),

    /// Validate an analysis configuration file
    Validate(ValidateArgs),

    /// Display the effective analysis configuration
    Info(InfoArgs),
}

/// Synthetic session parameters shared by `analyze --synthetic` and `generate`
#[derive(Args, Debug, Clone)]
pub struct SyntheticArgs {
    /// Exercise tag (squat, jump, walk, lunge, cmj, squat_jump)
    #[arg(long, default_value = "squat")]
    pub exercise: String,

    /// Number of repetitions
    #[arg(long, default_value = "2")]
    pub reps: usize,

    /// Session duration in seconds
    #[arg(long, default_value = "6.0")]
    pub duration: f64,

    /// Subject body mass in kg
    #[arg(long, default_value = "70.0")]
    pub mass: f64,

    /// Random seed for sensor noise
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Inject an impact spike of this many body weights
    #[arg(long)]
    pub spike_bw: Option<f64>,

    /// Shift the IMU clock by this many seconds
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    pub imu_offset: f64,
}

/// Arguments for the `analyze` command
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Capture files (JSON) to analyze
    #[arg(long = "capture", value_name = "FILE", required_unless_present = "synthetic")]
    pub captures: Vec<PathBuf>,

    /// Analyze a generated session instead of capture files
    #[arg(long, conflicts_with = "captures")]
    pub synthetic: bool,

    #[command(flatten)]
    pub session: SyntheticArgs,

    /// Analysis configuration file (TOML or JSON); built-in defaults otherwise
    #[arg(short, long, env = "KNEE_ANALYZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Include conditioned signals in JSON output
    #[arg(long, requires = "json")]
    pub signals: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "KNEE_ANALYZER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `generate` command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Output capture file
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub session: SyntheticArgs,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "analysis.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; built-in defaults otherwise
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the exercise catalog
    #[arg(long)]
    pub exercises: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
