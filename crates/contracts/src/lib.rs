//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Every stream carries its own clock in seconds (f64)
//! - After synchronization all derived signals share `SyncResult::time_common`

mod alert;
mod analysis;
mod analysis_config;
mod capture;
mod error;
mod metrics;
mod signal;
mod sync;

pub use alert::*;
pub use analysis::*;
pub use analysis_config::*;
pub use capture::*;
pub use error::*;
pub use metrics::*;
pub use signal::*;
pub use sync::*;
