//! Error types for CLI operations.

use std::path::PathBuf;

use contracts::ContractError;
use ingestion::IngestionError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Configuration parsing or validation error
    #[error("Failed to load configuration from {}: {source}", path.display())]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: ContractError,
    },

    /// Capture loading or generation error
    #[error(transparent)]
    Capture(#[from] IngestionError),

    /// One or more sessions could not be analyzed
    #[error("{failed} of {total} session(s) failed analysis")]
    AnalysisFailed { failed: u64, total: u64 },
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_load(path: impl Into<PathBuf>, source: ContractError) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
