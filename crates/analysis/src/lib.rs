//! # Analysis
//!
//! Session orchestrator: one [`AnalysisPipeline::run`] call takes a raw
//! [`SessionInput`](contracts::SessionInput) through six ordered phases and
//! returns an [`AnalysisResult`](contracts::AnalysisResult).
//!
//! 1. Synchronization (`sync_engine`)
//! 2. Conditioning and technical checks (`conditioning`, `alert_engine`)
//! 3. Event detection: foot contacts and repetitions
//! 4. Metrics (`metrics_engine`)
//! 5. Clinical alerts
//! 6. Text summary
//!
//! A failing phase stops the run; the result then carries `success == false`,
//! the phase and an `ANALYSIS FAILED: ...` summary. Nothing panics outward.
//!
//! ```ignore
//! use analysis::AnalysisPipeline;
//!
//! let pipeline = AnalysisPipeline::new(config);
//! let result = pipeline.run(&session);
//! println!("{}", result.summary);
//! ```

mod joints;
mod pipeline;
mod summary;

pub use joints::{knee_trace, quasi_static_moment, KneeTrace, Side, SAGITTAL_AXIS};
pub use pipeline::AnalysisPipeline;
pub use summary::render_summary;
