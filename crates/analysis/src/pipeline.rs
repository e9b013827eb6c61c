//! Six-phase session analysis.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use alert_engine::{AlertContext, AlertEngine, AlertObserver, AlertRules};
use conditioning::SignalConditioner;
use contracts::{
    imu_signal_key, AlertRecord, AnalysisConfig, AnalysisPhase, AnalysisResult, Channel,
    ContractError, EventSet, ExerciseProfile, ForceChannel, ImuChannel, MetricsRecord,
    ProcessedSignals, SessionInput, SyncResult,
};
use metrics_engine::{mean_spacing, MetricsEngine};
use sync_engine::TemporalSynchronizer;
use tracing::instrument;

use crate::joints::{knee_trace, quasi_static_moment, KneeTrace, Side};
use crate::summary::render_summary;

/// Phase that stopped a run, with the alerts raised so far
struct PhaseFailure {
    phase: AnalysisPhase,
    error: ContractError,
    alerts: Vec<AlertRecord>,
}

impl PhaseFailure {
    fn new(phase: AnalysisPhase, error: ContractError, alerts: &AlertEngine) -> Self {
        Self {
            phase,
            error,
            alerts: alerts.alerts().to_vec(),
        }
    }
}

/// Tracks the running phase and reports each phase duration
struct PhaseClock<'a> {
    current: &'a Cell<AnalysisPhase>,
    started: Instant,
}

impl<'a> PhaseClock<'a> {
    fn start(current: &'a Cell<AnalysisPhase>) -> Self {
        current.set(AnalysisPhase::Synchronization);
        tracing::info!(phase = %AnalysisPhase::Synchronization, "Phase started");
        Self {
            current,
            started: Instant::now(),
        }
    }

    fn enter(&mut self, phase: AnalysisPhase) {
        self.close();
        self.current.set(phase);
        self.started = Instant::now();
        tracing::info!(phase = %phase, "Phase started");
    }

    fn close(&self) {
        observability::record_phase_duration(
            self.current.get(),
            self.started.elapsed().as_secs_f64(),
        );
    }
}

/// Orchestrates synchronization, conditioning, event detection, metrics,
/// alerts and summary for one session
///
/// Each [`run`](Self::run) builds fresh per-run state; the pipeline itself is
/// read-only and can be shared across threads.
#[derive(Clone)]
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    synchronizer: TemporalSynchronizer,
    conditioner: SignalConditioner,
    metrics: MetricsEngine,
    observer: Option<Arc<dyn AlertObserver>>,
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            synchronizer: TemporalSynchronizer::new(config.sync.clone()),
            conditioner: SignalConditioner::from_config(&config),
            metrics: MetricsEngine::from_config(&config),
            observer: None,
            config,
        }
    }

    /// Notify `observer` of every alert raised by subsequent runs
    pub fn with_observer(mut self, observer: Arc<dyn AlertObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one session
    ///
    /// Never fails or panics outward: any phase failure yields a result with
    /// `success == false`, the failing phase and an `ANALYSIS FAILED` summary.
    #[instrument(
        name = "analysis_run",
        skip(self, session),
        fields(
            exercise = %session.exercise,
            imu_samples = session.imu.len(),
            force_samples = session.force.len()
        )
    )]
    pub fn run(&self, session: &SessionInput) -> AnalysisResult {
        let current = Cell::new(AnalysisPhase::Synchronization);
        let outcome = catch_unwind(AssertUnwindSafe(|| self.execute(session, &current)));

        let result = match outcome {
            Ok(Ok(result)) => {
                tracing::info!(
                    alerts = result.alerts.len(),
                    contacts = result.events.contacts.len(),
                    "Analysis completed"
                );
                result
            }
            Ok(Err(failure)) => {
                tracing::error!(phase = %failure.phase, error = %failure.error, "Analysis failed");
                AnalysisResult::failed(
                    &session.exercise,
                    failure.phase,
                    &failure.error.to_string(),
                    failure.alerts,
                )
            }
            Err(_) => {
                let phase = current.get();
                tracing::error!(phase = %phase, "Analysis panicked");
                AnalysisResult::failed(
                    &session.exercise,
                    phase,
                    &format!("internal error during {phase}"),
                    Vec::new(),
                )
            }
        };
        observability::record_analysis_outcome(&result);
        result
    }

    fn execute(
        &self,
        session: &SessionInput,
        current: &Cell<AnalysisPhase>,
    ) -> Result<AnalysisResult, PhaseFailure> {
        let exercise = session.exercise.to_ascii_lowercase();
        let profile = self.config.profile(&exercise).clone();
        let mut alerts = AlertEngine::new(AlertRules::for_exercise(&self.config, &exercise));
        if let Some(observer) = &self.observer {
            alerts = alerts.with_observer(Arc::clone(observer));
        }
        let mut clock = PhaseClock::start(current);

        // Phase 1: synchronization
        let sync = self.synchronizer.synchronize(&session.imu, &session.force);
        if !sync.success {
            let reason = sync
                .failure
                .clone()
                .unwrap_or_else(|| "synchronization failed".to_string());
            clock.close();
            return Err(PhaseFailure::new(
                AnalysisPhase::Synchronization,
                ContractError::pipeline_abort(AnalysisPhase::Synchronization.as_str(), reason),
                &alerts,
            ));
        }

        // Phase 2: conditioning and technical checks
        clock.enter(AnalysisPhase::Conditioning);
        let dt = mean_spacing(&sync.time_common).ok_or_else(|| {
            PhaseFailure::new(
                AnalysisPhase::Conditioning,
                ContractError::pipeline_abort(
                    AnalysisPhase::Conditioning.as_str(),
                    "common time grid has fewer than two samples",
                ),
                &alerts,
            )
        })?;
        let sample_rate = 1.0 / dt;
        alerts.check_sync_quality(sync.quality);
        let mut signals = self.condition(&sync, sample_rate);
        self.check_signal_quality(&signals, &mut alerts);
        let fz = signals
            .axis(ForceChannel::Fz.as_str(), 0)
            .map(<[f64]>::to_vec)
            .ok_or_else(|| {
                PhaseFailure::new(
                    AnalysisPhase::Conditioning,
                    ContractError::pipeline_abort(
                        AnalysisPhase::Conditioning.as_str(),
                        "vertical force missing after conditioning",
                    ),
                    &alerts,
                )
            })?;

        // Phase 3: events
        clock.enter(AnalysisPhase::EventDetection);
        let knees: Vec<KneeTrace> = Side::BOTH
            .iter()
            .filter_map(|side| knee_trace(&signals, *side, dt))
            .collect();
        for knee in &knees {
            signals.insert(
                format!("{}_angle", knee.side.joint()),
                Channel::scalar(knee.angle.clone()),
            );
        }
        let events = self.detect_events(&fz, &knees, &profile, sample_rate);

        // Phase 4: metrics
        clock.enter(AnalysisPhase::Metrics);
        let mut result = AnalysisResult {
            success: true,
            exercise,
            events,
            ..AnalysisResult::default()
        };
        self.compute_metrics(&mut result, &sync.time_common, &fz, &knees, &profile, session);

        // Phase 5: alerts
        clock.enter(AnalysisPhase::Alerts);
        Self::evaluate_alerts(&result, &mut alerts);

        // Phase 6: summary
        clock.enter(AnalysisPhase::Summary);
        result.sync = sync;
        result.signals = signals;
        result.summary = render_summary(&result, &session.subject, &alerts.summary());
        result.alerts = alerts.into_alerts();
        clock.close();
        Ok(result)
    }

    /// Filter force and IMU channels on the common grid
    fn condition(&self, sync: &SyncResult, sample_rate: f64) -> ProcessedSignals {
        let mut signals = ProcessedSignals::new(sync.time_common.clone());

        for channel in [ForceChannel::Fz, ForceChannel::Fx, ForceChannel::Fy] {
            if let Some(raw) = sync.force.get(&channel) {
                let filtered = self.conditioner.filter_force(raw, sample_rate);
                signals.insert(channel.as_str(), Channel::scalar(filtered));
            }
        }

        for (location, channels) in &sync.imu {
            for (kind, data) in channels {
                let processed = match kind {
                    ImuChannel::Acceleration => {
                        self.conditioner.filter_imu_acceleration(data, sample_rate)
                    }
                    ImuChannel::Gyroscope => self.conditioner.filter_imu_gyro(data, sample_rate),
                    // Orientations are not filtered
                    ImuChannel::Quaternion => data.clone(),
                };
                signals.insert(imu_signal_key(*location, kind.signal_suffix()), processed);
            }
        }

        tracing::info!(channels = signals.len(), sample_rate_hz = sample_rate, "Signals conditioned");
        signals
    }

    fn check_signal_quality(&self, signals: &ProcessedSignals, alerts: &mut AlertEngine) {
        for (name, channel) in &signals.channels {
            if channel.width() == 1 {
                alerts.check_data_quality(&channel.axes()[0], name);
                continue;
            }
            for (i, axis) in channel.axes().iter().enumerate() {
                alerts.check_data_quality(axis, &format!("{name}[{i}]"));
            }
        }
    }

    /// Contacts from vertical force; repetitions from the right knee (or left)
    /// angle, else the contacts
    fn detect_events(
        &self,
        fz: &[f64],
        knees: &[KneeTrace],
        profile: &ExerciseProfile,
        sample_rate: f64,
    ) -> EventSet {
        let contacts =
            self.conditioner
                .detect_grf_contacts(fz, profile.contact_threshold_n, sample_rate);

        let repetitions = match knees.first() {
            Some(knee) if !knee.angle.is_empty() => {
                let (min, max) = knee
                    .angle
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &a| {
                        (lo.min(a), hi.max(a))
                    });
                let threshold = (min + max) / 2.0;
                self.conditioner
                    .segment_repetitions(&knee.angle, threshold, sample_rate)
            }
            _ => contacts.clone(),
        };

        tracing::info!(
            contacts = contacts.len(),
            repetitions = repetitions.len(),
            "Events detected"
        );
        EventSet {
            contacts,
            repetitions,
        }
    }

    fn compute_metrics(
        &self,
        result: &mut AnalysisResult,
        time: &[f64],
        fz: &[f64],
        knees: &[KneeTrace],
        profile: &ExerciseProfile,
        session: &SessionInput,
    ) {
        let physics = &self.config.physics;
        let mass = session.subject.body_mass_kg;
        let body_weight = session.subject.body_weight_n(physics.gravity);

        for knee in knees {
            let joint = knee.side.joint();
            let kinematic = self.metrics.kinematic(time, &knee.angle);
            tracing::info!(joint = joint, rom = kinematic.rom, "Knee kinematics");
            result.kinematic.insert(joint.to_string(), kinematic);
        }

        if physics.estimate_knee_moment && !knees.is_empty() {
            let height = session.subject.height_m.unwrap_or(physics.default_height_m);
            let shank = physics.shank_length_ratio * height;
            let share = 1.0 / knees.len() as f64;
            for knee in knees {
                let moment = quasi_static_moment(fz, &knee.angle, shank, share);
                let dynamic = self
                    .metrics
                    .dynamic(time, &moment, &knee.angular_velocity, mass);
                result.dynamic.insert(knee.side.joint().to_string(), dynamic);
            }
        }

        for (i, contact) in result.events.contacts.iter().enumerate() {
            let key = format!("contact_{}", i + 1);
            let force = self.metrics.force(time, fz, body_weight, *contact);
            tracing::info!(
                contact = %key,
                peak_grf = force.peak_grf,
                contact_time = force.contact_time,
                "Contact metrics"
            );
            if profile.jump {
                let height = self.conditioner.jump_height(time, fz, mass, *contact);
                result.jump_heights.insert(key.clone(), height);
            }
            result.force.insert(key, force);
        }

        let reps = &result.events.repetitions;
        let mut rep_roms: BTreeMap<&'static str, f64> = BTreeMap::new();
        for knee in knees {
            let joint = knee.side.joint();
            if reps.is_empty() {
                continue;
            }
            let stats = self.metrics.rom_multiple_cycles(&knee.angle, reps);
            if stats.count > 0 {
                rep_roms.insert(joint, stats.mean);
                result.repetition_stats.insert(format!("rom_{joint}"), stats);
            }
        }
        if !result.events.contacts.is_empty() {
            let stats =
                self.metrics
                    .grf_peaks_multiple_contacts(fz, &result.events.contacts, body_weight);
            result.repetition_stats.insert("peak_grf".to_string(), stats);
        }

        let right = Side::Right.joint();
        let left = Side::Left.joint();
        if let (Some(r), Some(l)) = (result.kinematic.get(right), result.kinematic.get(left)) {
            let right_rom = rep_roms.get(right).copied().unwrap_or(r.rom);
            let left_rom = rep_roms.get(left).copied().unwrap_or(l.rom);
            let symmetry = self.metrics.symmetry_from_values(right_rom, left_rom);
            tracing::info!(
                symmetry_index = symmetry.symmetry_index,
                ratio = symmetry.asymmetry_ratio,
                "Knee symmetry"
            );
            result.symmetry = Some(symmetry);
        }

        for (joint, kinematic) in &result.kinematic {
            result.reference_comparisons.push(self.metrics.compare_with_reference(
                &format!("rom_{joint}"),
                kinematic.rom,
                profile.rom_band_deg,
            ));
        }
        let peak_grf = result
            .force
            .values()
            .map(|f| f.peak_grf)
            .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))));
        if let Some(peak) = peak_grf {
            result.reference_comparisons.push(self.metrics.compare_with_reference(
                "peak_grf",
                peak,
                profile.grf_band_bw,
            ));
        }

        if !result.kinematic.is_empty() || peak_grf.is_some() {
            let rom = result
                .kinematic
                .get(right)
                .or_else(|| result.kinematic.values().next())
                .map_or(0.0, |k| k.rom);
            let symmetry_index = result.symmetry.map_or(0.0, |s| s.symmetry_index);
            result.functional_score = Some(self.metrics.functional_score(
                rom,
                symmetry_index,
                peak_grf.unwrap_or(0.0),
            ));
        }
    }

    fn evaluate_alerts(result: &AnalysisResult, alerts: &mut AlertEngine) {
        for (joint, metrics) in &result.kinematic {
            alerts.evaluate_record(&MetricsRecord::from(*metrics), &AlertContext::new(joint));
        }
        for (joint, metrics) in &result.dynamic {
            alerts.evaluate_record(&MetricsRecord::from(*metrics), &AlertContext::new(joint));
        }
        for (contact, metrics) in &result.force {
            alerts.evaluate_record(&MetricsRecord::from(*metrics), &AlertContext::new(contact));
        }
        if let Some(symmetry) = result.symmetry {
            alerts.evaluate_record(&MetricsRecord::from(symmetry), &AlertContext::new("knees"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use std::sync::Mutex;

    use contracts::{BodyLocation, ForceCapture, ImuCapture, Severity, SubjectInfo};

    const MASS: f64 = 70.0;
    const DURATION: f64 = 4.0;
    /// Two squat cycles
    const CYCLE_HZ: f64 = 0.5;

    fn clock(rate: f64) -> Vec<f64> {
        let n = (DURATION * rate) as usize + 1;
        (0..n).map(|i| i as f64 / rate).collect()
    }

    /// Off the platform for the first and last 0.3 s
    fn vertical_force(t: f64) -> f64 {
        if !(0.3..=DURATION - 0.3).contains(&t) {
            return 0.0;
        }
        MASS * 9.81 * (1.0 + 0.2 * (2.0 * PI * CYCLE_HZ * t).sin())
    }

    fn triad(time: &[f64], x: impl Fn(f64) -> f64, y: impl Fn(f64) -> f64, z: impl Fn(f64) -> f64) -> Channel {
        Channel::from_axes(vec![
            time.iter().map(|&t| x(t)).collect(),
            time.iter().map(|&t| y(t)).collect(),
            time.iter().map(|&t| z(t)).collect(),
        ])
        .unwrap()
    }

    /// Knee flexion peaking near 90° for the right leg, slightly less on the left
    fn squat_session() -> SessionInput {
        let imu_time = clock(60.0);
        let force_time = clock(1000.0);
        let omega = |gain: f64| move |t: f64| gain * 2.467 * (2.0 * PI * CYCLE_HZ * t).sin();
        let wobble = |amp: f64, hz: f64| move |t: f64| amp * (2.0 * PI * hz * t).sin();

        let mut sensors = BTreeMap::new();
        sensors.insert(
            BodyLocation::Pelvis,
            [(
                ImuChannel::Acceleration,
                triad(&imu_time, wobble(0.1, 1.1), wobble(0.1, 1.3), |t| vertical_force(t) / MASS),
            )]
            .into(),
        );
        for (femur, tibia, gain) in [
            (BodyLocation::FemurRight, BodyLocation::TibiaRight, 1.0),
            (BodyLocation::FemurLeft, BodyLocation::TibiaLeft, 0.95),
        ] {
            sensors.insert(
                femur,
                [(
                    ImuChannel::Gyroscope,
                    triad(&imu_time, wobble(0.05, 0.7), omega(gain), wobble(0.05, 0.9)),
                )]
                .into(),
            );
            sensors.insert(
                tibia,
                [(
                    ImuChannel::Gyroscope,
                    triad(&imu_time, wobble(0.05, 0.8), wobble(0.02, 0.6), wobble(0.05, 1.2)),
                )]
                .into(),
            );
        }

        let mut channels = BTreeMap::new();
        channels.insert(ForceChannel::Fz, force_time.iter().map(|&t| vertical_force(t)).collect());
        channels.insert(ForceChannel::Fx, force_time.iter().map(|&t| 5.0 * (2.0 * PI * 1.7 * t).sin()).collect());
        channels.insert(ForceChannel::Fy, force_time.iter().map(|&t| 4.0 * (2.0 * PI * 1.9 * t).cos()).collect());

        SessionInput {
            imu: ImuCapture { time: imu_time, sensors },
            force: ForceCapture { time: force_time, channels },
            subject: SubjectInfo { body_mass_kg: MASS, height_m: Some(1.75) },
            exercise: "squat".to_string(),
        }
    }

    #[test]
    fn test_squat_session_runs_all_phases() {
        let result = AnalysisPipeline::default().run(&squat_session());
        assert!(result.success, "{}", result.summary);
        assert!(result.failure_phase.is_none());
        assert!(result.sync.success);

        assert_eq!(result.events.contacts.len(), 1);
        assert_eq!(result.events.repetitions.len(), 2);

        let right = result.kinematic["knee_right"];
        assert!(right.rom > 70.0 && right.rom < 110.0, "rom {}", right.rom);
        assert!(result.kinematic.contains_key("knee_left"));
        assert_eq!(result.dynamic.len(), 2);

        let peak = result.force["contact_1"].peak_grf;
        assert!(peak > 1.1 && peak < 1.3, "peak {peak}");
        assert!(result.jump_heights.is_empty());

        let symmetry = result.symmetry.unwrap();
        assert!(symmetry.symmetry_index < 10.0);
        assert!(result.repetition_stats.contains_key("rom_knee_right"));
        assert!(result.repetition_stats.contains_key("peak_grf"));
        assert!(result.functional_score.is_some());
        assert!(result
            .reference_comparisons
            .iter()
            .any(|c| c.metric == "peak_grf"));

        assert!(result.signals.get("fz").is_some());
        assert!(result.signals.get("femur_right_gyro").is_some());
        assert!(result.signals.get("knee_right_angle").is_some());
        assert!(result.summary.starts_with(crate::summary::HEADER));
        assert!(result.alerts.iter().all(|a| a.severity < Severity::Critical));
    }

    #[test]
    fn test_no_overlap_fails_in_synchronization() {
        let mut session = squat_session();
        session.force.time.iter_mut().for_each(|t| *t += 100.0);
        let result = AnalysisPipeline::default().run(&session);
        assert!(!result.success);
        assert_eq!(result.failure_phase, Some(AnalysisPhase::Synchronization));
        assert!(result.summary.starts_with("ANALYSIS FAILED:"));
        assert!(result.summary.contains("no temporal overlap"));
        assert!(result.force.is_empty());
    }

    #[test]
    fn test_missing_fz_fails_before_metrics() {
        let mut session = squat_session();
        session.force.channels.remove(&ForceChannel::Fz);
        let result = AnalysisPipeline::default().run(&session);
        assert!(!result.success);
        assert_eq!(result.failure_phase, Some(AnalysisPhase::Synchronization));
    }

    #[test]
    fn test_observer_panic_does_not_escape() {
        let panicking = |_: &AlertRecord| -> Result<(), ContractError> { panic!("display gone") };
        let mut session = squat_session();
        session.force.channels.insert(
            ForceChannel::Fx,
            vec![0.0; session.force.time.len()],
        );
        let pipeline = AnalysisPipeline::default().with_observer(Arc::new(panicking));
        let result = pipeline.run(&session);
        assert!(result.success);
        assert!(result.alerts.iter().any(|a| a.title == "Constant Signal"));
    }

    #[test]
    fn test_observer_sees_run_alerts() {
        let seen = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&seen);
        let observer = move |_: &AlertRecord| -> Result<(), ContractError> {
            *counter.lock().unwrap() += 1;
            Ok(())
        };
        let mut session = squat_session();
        session.force.channels.insert(
            ForceChannel::Fy,
            vec![0.0; session.force.time.len()],
        );
        let result = AnalysisPipeline::default()
            .with_observer(Arc::new(observer))
            .run(&session);
        assert_eq!(*seen.lock().unwrap(), result.alerts.len());
        assert!(!result.alerts.is_empty());
    }

    #[test]
    fn test_runs_are_independent() {
        let pipeline = AnalysisPipeline::default();
        let session = squat_session();
        let first = pipeline.run(&session);
        let second = pipeline.run(&session);
        assert_eq!(first.alerts.len(), second.alerts.len());
        if let (Some(a), Some(b)) = (first.alerts.first(), second.alerts.first()) {
            assert_eq!(a.id, b.id);
        }
    }
}
