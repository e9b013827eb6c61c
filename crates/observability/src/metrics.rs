//! 分析流水线指标收集模块
//!
//! 基于 SyncResult / AlertRecord / AnalysisResult 记录运行指标，并在内存中聚合多次会话。

use std::collections::BTreeMap;

use contracts::{AlertRecord, AnalysisPhase, AnalysisResult, Severity, SyncResult};
use metrics::{counter, gauge, histogram};

/// 从 SyncResult 记录同步指标
pub fn record_sync_result(result: &SyncResult) {
    let status = if result.success { "success" } else { "failure" };
    counter!("knee_analysis_sync_total", "status" => status).increment(1);

    if !result.success {
        return;
    }

    // 时间偏移 (秒 -> 毫秒)
    gauge!("knee_analysis_sync_offset_ms").set(result.time_offset * 1000.0);
    histogram!("knee_analysis_sync_offset_abs_ms").record(result.time_offset.abs() * 1000.0);

    // 同步质量
    gauge!("knee_analysis_sync_quality").set(result.quality);
    histogram!("knee_analysis_sync_quality_hist").record(result.quality);

    // 公共时间轴长度
    gauge!("knee_analysis_sync_grid_samples").set(result.time_common.len() as f64);

    // 各传感器诊断偏移
    for (location, offset) in &result.sensor_offsets {
        gauge!(
            "knee_analysis_sensor_offset_ms",
            "location" => location.as_str()
        )
        .set(offset * 1000.0);
    }
}

/// 记录阶段耗时
pub fn record_phase_duration(phase: AnalysisPhase, seconds: f64) {
    histogram!(
        "knee_analysis_phase_duration_seconds",
        "phase" => phase.as_str()
    )
    .record(seconds);
}

/// 记录新告警
pub fn record_alert(alert: &AlertRecord) {
    counter!(
        "knee_analysis_alerts_total",
        "severity" => alert.severity.as_str(),
        "category" => alert.category.as_str()
    )
    .increment(1);
}

/// 记录数值退化（返回原输入或零值记录）
pub fn record_numeric_fallback(operation: &str) {
    counter!(
        "knee_analysis_numeric_fallback_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// 记录一次分析的最终结果
pub fn record_analysis_outcome(result: &AnalysisResult) {
    let status = if result.success { "success" } else { "failure" };
    counter!(
        "knee_analysis_sessions_total",
        "status" => status,
        "exercise" => result.exercise.clone()
    )
    .increment(1);

    if let Some(phase) = result.failure_phase {
        counter!(
            "knee_analysis_phase_failures_total",
            "phase" => phase.as_str()
        )
        .increment(1);
    }

    gauge!("knee_analysis_contacts_detected").set(result.events.contacts.len() as f64);

    if let Some(score) = result.functional_score {
        gauge!("knee_analysis_functional_score").set(score.total);
    }
}

/// 分析指标聚合器
///
/// 在内存中聚合多次会话的指标，便于批量分析后输出摘要。
#[derive(Debug, Clone, Default)]
pub struct AnalysisMetricsAggregator {
    /// 会话总数
    pub total_sessions: u64,

    /// 失败会话数
    pub failed_sessions: u64,

    /// 各严重级别告警数
    pub alert_counts: BTreeMap<Severity, u64>,

    /// 同步偏移统计 (毫秒, 绝对值)
    pub offset_stats: RunningStats,

    /// 同步质量统计
    pub quality_stats: RunningStats,

    /// 峰值 GRF 统计 (BW)
    pub peak_grf_stats: RunningStats,

    /// 膝关节 ROM 统计 (度)
    pub rom_stats: RunningStats,

    /// 功能评分统计
    pub score_stats: RunningStats,
}

impl AnalysisMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, result: &AnalysisResult) {
        self.total_sessions += 1;

        for alert in &result.alerts {
            *self.alert_counts.entry(alert.severity).or_insert(0) += 1;
        }

        if !result.success {
            self.failed_sessions += 1;
            return;
        }

        self.offset_stats.push(result.sync.time_offset.abs() * 1000.0);
        self.quality_stats.push(result.sync.quality);

        for force in result.force.values() {
            self.peak_grf_stats.push(force.peak_grf);
        }
        for kinematic in result.kinematic.values() {
            self.rom_stats.push(kinematic.rom);
        }
        if let Some(score) = result.functional_score {
            self.score_stats.push(score.total);
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> AnalysisMetricsSummary {
        AnalysisMetricsSummary {
            total_sessions: self.total_sessions,
            failed_sessions: self.failed_sessions,
            failure_rate: if self.total_sessions > 0 {
                self.failed_sessions as f64 / self.total_sessions as f64 * 100.0
            } else {
                0.0
            },
            alert_counts: self.alert_counts.clone(),
            offset_ms: StatsSummary::from(&self.offset_stats),
            sync_quality: StatsSummary::from(&self.quality_stats),
            peak_grf_bw: StatsSummary::from(&self.peak_grf_stats),
            rom_deg: StatsSummary::from(&self.rom_stats),
            functional_score: StatsSummary::from(&self.score_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct AnalysisMetricsSummary {
    pub total_sessions: u64,
    pub failed_sessions: u64,
    pub failure_rate: f64,
    pub alert_counts: BTreeMap<Severity, u64>,
    pub offset_ms: StatsSummary,
    pub sync_quality: StatsSummary,
    pub peak_grf_bw: StatsSummary,
    pub rom_deg: StatsSummary,
    pub functional_score: StatsSummary,
}

impl std::fmt::Display for AnalysisMetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Analysis Metrics Summary ===")?;
        writeln!(f, "Sessions: {}", self.total_sessions)?;
        writeln!(
            f,
            "Failed sessions: {} ({:.2}%)",
            self.failed_sessions, self.failure_rate
        )?;
        writeln!(f, "Sync offset (ms): {}", self.offset_ms)?;
        writeln!(f, "Sync quality: {}", self.sync_quality)?;
        writeln!(f, "Peak GRF (BW): {}", self.peak_grf_bw)?;
        writeln!(f, "Knee ROM (deg): {}", self.rom_deg)?;
        writeln!(f, "Functional score: {}", self.functional_score)?;

        if !self.alert_counts.is_empty() {
            writeln!(f, "Alerts:")?;
            for (severity, count) in &self.alert_counts {
                writeln!(f, "  {}: {}", severity, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计 (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}
