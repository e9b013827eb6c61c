//! 配置校验模块
//!
//! 校验规则：
//! - 字段范围 (validator derive)
//! - 区间 min < max
//! - asymmetry_moderate_pct <= asymmetry_severe_pct
//! - sync_quality_error <= sync_quality_warning
//! - reference_priority 非空且无重复
//! - 运动类型标签为小写且非空

use std::collections::HashSet;

use contracts::{AnalysisConfig, Band, ContractError, ExerciseProfile};
use validator::Validate;

/// 校验 AnalysisConfig
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &AnalysisConfig) -> Result<(), ContractError> {
    config
        .validate()
        .map_err(|e| ContractError::config_validation("analysis_config", e.to_string()))?;

    validate_reference_priority(config)?;
    validate_quality(config)?;
    validate_band("scoring.grf_band_bw", &config.scoring.grf_band_bw)?;
    validate_profile("default_exercise", &config.default_exercise)?;
    validate_exercises(config)?;
    Ok(())
}

/// 校验同步参考传感器顺序
fn validate_reference_priority(config: &AnalysisConfig) -> Result<(), ContractError> {
    let priority = &config.sync.reference_priority;
    if priority.is_empty() {
        return Err(ContractError::config_validation(
            "sync.reference_priority",
            "at least one reference location is required",
        ));
    }

    let mut seen = HashSet::new();
    for location in priority {
        if !seen.insert(location) {
            return Err(ContractError::config_validation(
                "sync.reference_priority",
                format!("duplicate location '{location}'"),
            ));
        }
    }
    Ok(())
}

/// 校验同步质量阈值顺序
fn validate_quality(config: &AnalysisConfig) -> Result<(), ContractError> {
    let quality = &config.quality;
    if quality.sync_quality_error > quality.sync_quality_warning {
        return Err(ContractError::config_validation(
            "quality.sync_quality_error / quality.sync_quality_warning",
            format!(
                "sync_quality_error ({}) must be <= sync_quality_warning ({})",
                quality.sync_quality_error, quality.sync_quality_warning
            ),
        ));
    }
    Ok(())
}

/// 校验运动类型目录
fn validate_exercises(config: &AnalysisConfig) -> Result<(), ContractError> {
    for (tag, profile) in &config.exercises {
        if tag.is_empty() || tag.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(ContractError::config_validation(
                format!("exercises[{tag}]"),
                "exercise tags must be non-empty lowercase",
            ));
        }

        let field = format!("exercises.{tag}");
        profile
            .validate()
            .map_err(|e| ContractError::config_validation(field.clone(), e.to_string()))?;
        validate_profile(&field, profile)?;
    }
    Ok(())
}

/// 校验单个运动类型的阈值
fn validate_profile(field: &str, profile: &ExerciseProfile) -> Result<(), ContractError> {
    validate_band(&format!("{field}.grf_band_bw"), &profile.grf_band_bw)?;
    validate_band(&format!("{field}.rom_band_deg"), &profile.rom_band_deg)?;

    if profile.asymmetry_moderate_pct > profile.asymmetry_severe_pct {
        return Err(ContractError::config_validation(
            format!("{field}.asymmetry_moderate_pct"),
            format!(
                "moderate threshold ({}) must be <= severe threshold ({})",
                profile.asymmetry_moderate_pct, profile.asymmetry_severe_pct
            ),
        ));
    }
    Ok(())
}

fn validate_band(field: &str, band: &Band) -> Result<(), ContractError> {
    if !band.min.is_finite() || !band.max.is_finite() || band.min < 0.0 {
        return Err(ContractError::config_validation(
            field,
            format!("band bounds must be finite and >= 0, got [{}, {}]", band.min, band.max),
        ));
    }
    if band.min >= band.max {
        return Err(ContractError::config_validation(
            field,
            format!("min ({}) must be < max ({})", band.min, band.max),
        ));
    }
    Ok(())
}
