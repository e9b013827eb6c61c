//! # Ingestion
//!
//! Capture input for the analysis pipeline.
//!
//! Responsibilities:
//! - Load JSON capture documents into `SessionInput`
//! - Reject malformed captures (lengths, widths, clocks)
//! - Count physically implausible samples (warnings only)
//! - Generate seeded synthetic sessions for tests and demos
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{CaptureLoader, SyntheticSession};
//!
//! let loaded = CaptureLoader::default().load(Path::new("session.json"))?;
//! for v in &loaded.violations {
//!     eprintln!("{}: {} samples out of range", v.channel, v.count);
//! }
//!
//! let session = SyntheticSession::squat().with_spike(6.0).build()?;
//! ```

mod error;
mod limits;
mod loader;
mod stats;
mod synthetic;

pub use error::{IngestionError, Result};
pub use limits::{check_sample_ranges, has_vertical_force, RangeViolation, SampleLimits};
pub use loader::{save_session, CaptureLoader, LoadedCapture};
pub use stats::{IngestionMetrics, MetricsSnapshot};
pub use synthetic::{SyntheticConfig, SyntheticSession};
