//! Layered error definitions
//!
//! Categorized by source: config / input validation / numeric / pipeline / observer

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Input Errors =====
    /// Input rejected before computation (too few samples, non-monotonic time,
    /// dimension mismatch, no temporal overlap)
    #[error("validation error in {context}: {message}")]
    Validation { context: String, message: String },

    /// Capture payload does not have the expected shape
    #[error("capture format error for '{channel}': {message}")]
    CaptureFormat { channel: String, message: String },

    // ===== Numeric Errors =====
    /// Computation cannot produce a meaningful value (zero variance,
    /// near-zero division, NaN/Inf present)
    #[error("numeric degeneration in {operation}: {message}")]
    NumericDegeneration { operation: String, message: String },

    // ===== Pipeline Errors =====
    /// Unrecoverable phase failure; the pipeline short-circuits
    #[error("pipeline aborted during {phase}: {message}")]
    PipelineAbort { phase: String, message: String },

    /// Alert observer callback failed
    #[error("alert observer '{observer}' failed: {message}")]
    Observer { observer: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create input validation error
    pub fn validation(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create capture format error
    pub fn capture_format(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CaptureFormat {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Create numeric degeneration error
    pub fn numeric(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NumericDegeneration {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create pipeline abort error
    pub fn pipeline_abort(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PipelineAbort {
            phase: phase.into(),
            message: message.into(),
        }
    }

    /// Create observer error
    pub fn observer(observer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Observer {
            observer: observer.into(),
            message: message.into(),
        }
    }

    /// Whether the error belongs to the recoverable class (degraded output
    /// instead of an aborted run)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::NumericDegeneration { .. } | Self::Observer { .. }
        )
    }
}
