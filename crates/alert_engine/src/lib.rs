//! # Alert Engine
//!
//! Rule-based alerts over computed metrics.
//!
//! [`AlertRules`] binds the configured thresholds to one exercise profile;
//! [`AlertEngine`] evaluates them, keeps an append-only log with
//! `alert_0001`-style ids and notifies an optional [`AlertObserver`].
//!
//! ## Severity escalation
//!
//! | Rule             | Base     | Escalated (× factor) |
//! |------------------|----------|----------------------|
//! | Angular velocity | WARNING  | CRITICAL (1.5×)      |
//! | Knee moment      | WARNING  | ERROR (1.3×)         |
//! | Peak GRF         | ERROR    | CRITICAL (1.5×)      |
//! | Loading rate     | ERROR    | CRITICAL (1.5×)      |

mod engine;
mod rules;

pub use engine::{AlertContext, AlertEngine, AlertObserver};
pub use rules::{AlertDraft, AlertRules};
