//! Sample containers
//!
//! `Channel` stores samples column-major (one `Vec<f64>` per axis) because
//! every numeric stage works axis by axis. On the wire it is a list of rows
//! (`[[x, y, z], ...]`), matching how capture devices export vectors.

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// N×W sample block (W = 1 for scalars, 3 for vectors, 4 for quaternions)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Channel {
    axes: Vec<Vec<f64>>,
}

impl Channel {
    /// Single-axis channel
    pub fn scalar(values: Vec<f64>) -> Self {
        Self { axes: vec![values] }
    }

    /// Build from per-axis columns; all columns must have equal length
    pub fn from_axes(axes: Vec<Vec<f64>>) -> Result<Self, ContractError> {
        if let Some(first) = axes.first() {
            let len = first.len();
            if let Some(bad) = axes.iter().position(|a| a.len() != len) {
                return Err(ContractError::validation(
                    "channel",
                    format!(
                        "axis {bad} has {} samples, expected {len}",
                        axes[bad].len()
                    ),
                ));
            }
        }
        Ok(Self { axes })
    }

    /// Build from fixed-width rows
    pub fn from_rows<const W: usize>(rows: &[[f64; W]]) -> Self {
        let axes = (0..W)
            .map(|axis| rows.iter().map(|row| row[axis]).collect())
            .collect();
        Self { axes }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.axes.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of axes
    pub fn width(&self) -> usize {
        self.axes.len()
    }

    pub fn axis(&self, index: usize) -> Option<&[f64]> {
        self.axes.get(index).map(Vec::as_slice)
    }

    pub fn axes(&self) -> &[Vec<f64>] {
        &self.axes
    }

    pub fn into_axes(self) -> Vec<Vec<f64>> {
        self.axes
    }

    /// One sample across all axes
    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.len() {
            return None;
        }
        Some(self.axes.iter().map(|axis| axis[index]).collect())
    }

    /// Apply `f` to every axis, producing a channel of the same width
    pub fn map_axes<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        Self {
            axes: self.axes.iter().map(|axis| f(axis)).collect(),
        }
    }

    /// Whether any sample is NaN or infinite
    pub fn has_non_finite(&self) -> bool {
        self.axes.iter().flatten().any(|v| !v.is_finite())
    }
}

impl TryFrom<Vec<Vec<f64>>> for Channel {
    type Error = ContractError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        let width = rows.first().map_or(0, Vec::len);
        let mut axes = vec![Vec::with_capacity(rows.len()); width];
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(ContractError::validation(
                    "channel",
                    format!("row {i} has width {}, expected {width}", row.len()),
                ));
            }
            for (axis, value) in axes.iter_mut().zip(row) {
                axis.push(*value);
            }
        }
        Ok(Self { axes })
    }
}

impl From<Channel> for Vec<Vec<f64>> {
    fn from(channel: Channel) -> Self {
        (0..channel.len())
            .map(|i| channel.axes.iter().map(|axis| axis[i]).collect())
            .collect()
    }
}

/// Timestamped samples
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Timestamps in seconds, strictly increasing
    pub time: Vec<f64>,
    pub values: Channel,
}

impl TimeSeries {
    /// Build and validate
    pub fn new(time: Vec<f64>, values: Channel) -> Result<Self, ContractError> {
        let series = Self { time, values };
        series.validate()?;
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Check equal lengths and strictly increasing timestamps
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.values.len() != self.time.len() {
            return Err(ContractError::validation(
                "time_series",
                format!(
                    "{} timestamps but {} samples",
                    self.time.len(),
                    self.values.len()
                ),
            ));
        }
        if !is_strictly_increasing(&self.time) {
            return Err(ContractError::validation(
                "time_series",
                "timestamps are not strictly increasing",
            ));
        }
        Ok(())
    }
}

/// `true` when every step is positive (vacuously true for < 2 samples)
pub fn is_strictly_increasing(time: &[f64]) -> bool {
    time.windows(2).all(|w| w[1] > w[0])
}
