//! # Conditioning
//!
//! Signal conditioning for synchronized captures.
//!
//! - Zero-phase Butterworth low-pass (`filtfilt` over second-order sections)
//! - Threshold event detection for foot contacts and repetitions
//! - Trapezoidal integration and impulse-momentum jump height
//! - Anti-aliased downsampling
//!
//! Numeric failures never abort: the infallible helpers log, count a
//! fallback metric and return the raw signal (or 0 for scalars). The
//! `try_*` variants expose the underlying error.

mod butterworth;
mod conditioner;
mod decimate;
mod events;
mod filter;
mod integrate;

pub use butterworth::{design_lowpass, filtfilt, pad_length, Biquad};
pub use conditioner::{remove_gravity, SignalConditioner};
pub use decimate::{downsample, downsample_channel};
pub use events::detect_threshold_events;
pub use filter::{filter_channel, filter_low_pass, try_filter_low_pass};
pub use integrate::{
    calculate_displacement, calculate_velocity, compute_jump_height, cumulative_trapezoid,
    trapezoid, trapezoid_uniform, try_compute_jump_height,
};
