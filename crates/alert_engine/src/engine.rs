//! Append-only alert log with synchronous observer notification.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use chrono::Utc;
use contracts::{AlertRecord, AlertSummary, ContractError, MetricsRecord, Severity};
use tracing::instrument;

use crate::rules::{AlertDraft, AlertRules};

/// Receives every newly created alert
pub trait AlertObserver: Send + Sync {
    fn on_alert(&self, alert: &AlertRecord) -> Result<(), ContractError>;

    fn name(&self) -> &str {
        "observer"
    }
}

impl<F> AlertObserver for F
where
    F: Fn(&AlertRecord) -> Result<(), ContractError> + Send + Sync,
{
    fn on_alert(&self, alert: &AlertRecord) -> Result<(), ContractError> {
        self(alert)
    }
}

/// Values a rule needs besides the metric itself
#[derive(Debug, Clone, PartialEq)]
pub struct AlertContext {
    /// e.g. `knee_right`, `contact_1`
    pub label: String,
}

impl AlertContext {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// Rule evaluator owning one run's alert log
pub struct AlertEngine {
    rules: AlertRules,
    alerts: Vec<AlertRecord>,
    next_id: u64,
    observer: Option<Arc<dyn AlertObserver>>,
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new(AlertRules::default())
    }
}

impl std::fmt::Debug for AlertEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertEngine")
            .field("exercise", &self.rules.exercise)
            .field("alerts", &self.alerts.len())
            .field("observer", &self.observer.as_ref().map(|o| o.name().to_string()))
            .finish()
    }
}

impl AlertEngine {
    pub fn new(rules: AlertRules) -> Self {
        Self {
            rules,
            alerts: Vec::new(),
            next_id: 1,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn AlertObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn rules(&self) -> &AlertRules {
        &self.rules
    }

    /// Log a draft, notify the observer and return the stored record
    fn raise(&mut self, draft: AlertDraft) -> AlertRecord {
        let alert = AlertRecord {
            id: format!("alert_{:04}", self.next_id),
            timestamp: Utc::now(),
            severity: draft.severity,
            category: draft.category,
            title: draft.title,
            message: draft.message,
            value: draft.value,
            threshold: draft.threshold,
            recommendation: draft.recommendation,
            acknowledged: false,
        };
        self.next_id += 1;
        self.alerts.push(alert.clone());

        tracing::info!(
            id = %alert.id,
            severity = %alert.severity,
            category = %alert.category,
            title = %alert.title,
            "Alert raised"
        );
        observability::record_alert(&alert);
        self.notify(&alert);
        alert
    }

    fn notify(&self, alert: &AlertRecord) {
        let Some(observer) = &self.observer else {
            return;
        };
        match catch_unwind(AssertUnwindSafe(|| observer.on_alert(alert))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(observer = observer.name(), alert = %alert.id, error = %e, "Alert observer failed");
            }
            Err(_) => {
                tracing::error!(observer = observer.name(), alert = %alert.id, "Alert observer panicked");
            }
        }
    }

    fn raise_opt(&mut self, draft: Option<AlertDraft>) -> Option<AlertRecord> {
        draft.map(|d| self.raise(d))
    }

    pub fn check_rom(&mut self, rom_deg: f64, joint: &str) -> Option<AlertRecord> {
        let draft = self.rules.rom(rom_deg, joint);
        self.raise_opt(draft)
    }

    pub fn check_angular_velocity(&mut self, peak_deg_s: f64) -> Option<AlertRecord> {
        let draft = self.rules.angular_velocity(peak_deg_s);
        self.raise_opt(draft)
    }

    pub fn check_moment(&mut self, moment_nm_kg: f64) -> Option<AlertRecord> {
        let draft = self.rules.moment(moment_nm_kg);
        self.raise_opt(draft)
    }

    pub fn check_grf(&mut self, peak_bw: f64) -> Option<AlertRecord> {
        let draft = self.rules.grf(peak_bw);
        self.raise_opt(draft)
    }

    pub fn check_loading_rate(&mut self, rate_bw_s: f64) -> Option<AlertRecord> {
        let draft = self.rules.loading_rate(rate_bw_s);
        self.raise_opt(draft)
    }

    pub fn check_symmetry(&mut self, symmetry_index_pct: f64) -> Option<AlertRecord> {
        let draft = self.rules.symmetry(symmetry_index_pct);
        self.raise_opt(draft)
    }

    pub fn check_data_quality(&mut self, signal: &[f64], name: &str) -> Option<AlertRecord> {
        let draft = self.rules.data_quality(signal, name);
        self.raise_opt(draft)
    }

    pub fn check_sync_quality(&mut self, quality: f64) -> Option<AlertRecord> {
        let draft = self.rules.sync_quality(quality);
        self.raise_opt(draft)
    }

    /// Run every rule that applies to one metrics record
    #[instrument(name = "alert_evaluate_record", skip(self, record), fields(kind = record.kind(), label = %context.label))]
    pub fn evaluate_record(
        &mut self,
        record: &MetricsRecord,
        context: &AlertContext,
    ) -> Vec<AlertRecord> {
        let drafts = match record {
            MetricsRecord::Kinematic(m) => vec![
                self.rules.rom(m.rom, &context.label),
                self.rules.angular_velocity(m.peak_angular_velocity),
            ],
            MetricsRecord::Dynamic(m) => vec![self.rules.moment(m.peak_moment)],
            MetricsRecord::Force(m) => vec![
                self.rules.grf(m.peak_grf),
                self.rules.loading_rate(m.loading_rate),
            ],
            MetricsRecord::Symmetry(m) => vec![self.rules.symmetry(m.symmetry_index)],
            MetricsRecord::Validation(_) => Vec::new(),
        };
        drafts.into_iter().flatten().map(|d| self.raise(d)).collect()
    }

    /// Every alert in creation order
    pub fn alerts(&self) -> &[AlertRecord] {
        &self.alerts
    }

    pub fn into_alerts(self) -> Vec<AlertRecord> {
        self.alerts
    }

    /// Unacknowledged alerts, optionally at or above `min_severity`
    pub fn active_alerts(&self, min_severity: Option<Severity>) -> Vec<&AlertRecord> {
        self.alerts
            .iter()
            .filter(|a| !a.acknowledged)
            .filter(|a| min_severity.is_none_or(|s| a.severity >= s))
            .collect()
    }

    /// Mark an alert acknowledged; false if the id is unknown
    pub fn acknowledge(&mut self, id: &str) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.acknowledged = true;
                tracing::info!(id = id, "Alert acknowledged");
                true
            }
            None => false,
        }
    }

    pub fn summary(&self) -> AlertSummary {
        let mut summary = AlertSummary {
            total: self.alerts.len(),
            ..AlertSummary::default()
        };
        for alert in &self.alerts {
            if !alert.acknowledged {
                summary.active += 1;
            }
            *summary.by_severity.entry(alert.severity).or_default() += 1;
            *summary.by_category.entry(alert.category).or_default() += 1;
        }
        summary
    }
}
