//! # Metrics Engine
//!
//! Biomechanical metrics from conditioned signals and detected events.
//!
//! | Family     | Input                              | Units            |
//! |------------|------------------------------------|------------------|
//! | Kinematic  | joint angle trace                  | deg, deg/s       |
//! | Dynamic    | joint moment, angular velocity     | Nm/kg, W/kg      |
//! | Force      | vertical GRF over one contact      | BW, BW/s, N·s    |
//! | Symmetry   | right/left limb values             | %                |
//! | Validation | measured vs reference series       | RMSE, ICC(2,1)   |
//!
//! The `try_*` functions report degenerate input as [`contracts::ContractError`];
//! [`MetricsEngine`] turns those into zero-valued records.

mod dynamics;
mod engine;
mod force;
mod kinematics;
mod score;
mod statistics;
mod symmetry;
mod validation;

pub use dynamics::try_dynamic_metrics;
pub use engine::MetricsEngine;
pub use force::try_force_metrics;
pub use kinematics::{gradient, mean_spacing, range_of_motion, try_kinematic_metrics};
pub use score::functional_score;
pub use statistics::{
    compare_with_reference, grf_peaks_multiple_contacts, repetition_statistics,
    rom_multiple_cycles,
};
pub use symmetry::{symmetry_index, try_symmetry_from_values, try_symmetry_metrics};
pub use validation::{icc, try_validation_metrics};
