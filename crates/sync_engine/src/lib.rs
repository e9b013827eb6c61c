//! # Sync Engine
//!
//! IMU 与测力台双时钟同步引擎。
//!
//! 负责：
//! - 重叠时间窗与统一时间网格
//! - 三次样条 / 线性重采样
//! - 互相关时钟偏移估计与质量评分
//! - 输出 `SyncResult`
//!
//! ## 使用示例
//!
//! ```ignore
//! use sync_engine::{SyncConfig, TemporalSynchronizer};
//!
//! let synchronizer = TemporalSynchronizer::new(SyncConfig::default());
//! let result = synchronizer.synchronize(&session.imu, &session.force);
//! if result.success {
//!     println!("offset = {:.1} ms", result.time_offset * 1000.0);
//! }
//! ```

mod correlation;
mod engine;
mod grid;
mod interpolate;

pub use correlation::{best_lag, estimate_offset};
pub use engine::TemporalSynchronizer;
pub use grid::{clamp_offset, overlap_window, sync_quality, uniform_grid};
pub use interpolate::resample;

// Re-export contracts types
pub use contracts::{InterpolationKind, SyncConfig, SyncResult};
