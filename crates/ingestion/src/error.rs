//! Ingestion 错误类型

use std::path::PathBuf;

use contracts::ContractError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 采集文件读写失败
    #[error("failed to access capture file {path}: {source}")]
    Io {
        /// 文件路径
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 解析失败
    #[error("failed to parse capture {origin}: {source}")]
    ParseFailed {
        /// 数据来源（文件路径或调用方标签）
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// 采集数据结构不合法（长度、宽度、时间戳）
    #[error("invalid capture {origin}: {source}")]
    InvalidCapture {
        /// 数据来源
        origin: String,
        #[source]
        source: ContractError,
    },

    /// 合成会话参数不合法
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// 参数名
        name: &'static str,
        /// 错误消息
        message: String,
    },
}

impl IngestionError {
    pub(crate) fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
