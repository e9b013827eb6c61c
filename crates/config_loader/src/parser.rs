//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON 格式。缺省字段取参考默认值。

use contracts::{AnalysisConfig, ContractError};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<AnalysisConfig, ContractError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| ContractError::ConfigParse {
            message: format!("TOML parse error: {e}"),
            source: Some(Box::new(e)),
        }),
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
                message: format!("JSON parse error: {e}"),
                source: Some(Box::new(e)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BodyLocation, InterpolationKind};

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = parse("", ConfigFormat::Toml).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_parse_toml_overrides() {
        let content = r#"
[sync]
target_frequency_hz = 200.0
interpolation = "linear"
reference_priority = ["femur_right", "pelvis"]

[exercises.squat]
contact_threshold_n = 40.0
grf_band_bw = { min = 0.8, max = 2.0 }
"#;
        let config = parse(content, ConfigFormat::Toml).unwrap();
        assert_eq!(config.sync.target_frequency_hz, 200.0);
        assert_eq!(config.sync.interpolation, InterpolationKind::Linear);
        assert_eq!(config.sync.reference_priority[0], BodyLocation::FemurRight);
        // 未列出的字段保持默认
        assert_eq!(config.sync.min_samples, 10);

        let squat = config.profile("squat");
        assert_eq!(squat.contact_threshold_n, 40.0);
        assert_eq!(squat.grf_band_bw.max, 2.0);
        assert_eq!(squat.max_moment_nm_kg, 3.5);
    }

    #[test]
    fn test_parse_json() {
        let content = r#"{ "filter": { "order": 2, "force_cutoff_hz": 30.0 } }"#;
        let config = parse(content, ConfigFormat::Json).unwrap();
        assert_eq!(config.filter.order, 2);
        assert_eq!(config.filter.force_cutoff_hz, 30.0);
        assert_eq!(config.filter.imu_gyro_cutoff_hz, 15.0);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let err = parse("invalid toml [[[", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_location_rejected() {
        let content = r#"
[sync]
reference_priority = ["shoulder"]
"#;
        assert!(parse(content, ConfigFormat::Toml).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("JSON"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
