//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 合成会话 e2e 测试（无需硬件）
//! - 采集文件 / 配置文件往返

#[cfg(test)]
mod contract_tests {
    use contracts::{AlertRecord, AnalysisConfig, AnalysisPhase, MetricsRecord, SymmetryMetrics};

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = AnalysisConfig::default();
        let toml = config_loader::ConfigLoader::to_toml(&config).unwrap();
        let back = config_loader::ConfigLoader::load_from_str(
            &toml,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_wire_names() {
        let phase = serde_json::to_string(&AnalysisPhase::EventDetection).unwrap();
        assert_eq!(phase, "\"event_detection\"");

        let record = MetricsRecord::from(SymmetryMetrics::default());
        assert_eq!(record.kind(), "symmetry");
    }

    #[test]
    fn test_alert_record_fields() {
        let json = r#"{
            "id": "alert_0001",
            "timestamp": "2024-05-01T10:00:00Z",
            "severity": "critical",
            "category": "force",
            "title": "Excessive Impact",
            "message": "Peak GRF 6.00 BW",
            "value": 6.0,
            "threshold": 3.75,
            "recommendation": "Reduce landing load"
        }"#;
        let alert: AlertRecord = serde_json::from_str(json).unwrap();
        assert!(!alert.acknowledged);
        assert_eq!(alert.value, Some(6.0));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};

    use analysis::AnalysisPipeline;
    use contracts::{
        AlertCategory, AlertRecord, AnalysisConfig, AnalysisPhase, ContractError, Severity,
    };
    use ingestion::{CaptureLoader, SyntheticConfig, SyntheticSession};
    use observability::AnalysisMetricsAggregator;

    fn pipeline() -> AnalysisPipeline {
        AnalysisPipeline::new(AnalysisConfig::default())
    }

    /// End-to-end: synthetic squat -> sync -> conditioning -> metrics -> alerts
    #[test]
    fn test_e2e_clean_squat() {
        let session = SyntheticSession::squat().build().unwrap();
        let result = pipeline().run(&session);

        assert!(result.success, "{}", result.summary);
        assert!(!result.events.contacts.is_empty());
        assert_eq!(result.events.repetitions.len(), 2);
        for force in result.force.values() {
            assert!(
                force.peak_grf > 0.8 && force.peak_grf < 3.0,
                "peak {}",
                force.peak_grf
            );
        }
        let rom = result.kinematic["knee_right"].rom;
        assert!(rom > 70.0 && rom < 110.0, "rom {rom}");
        assert!(result.symmetry.unwrap().symmetry_index < 10.0);
        assert!(result.functional_score.unwrap().total > 50.0);
        assert!(result
            .alerts
            .iter()
            .all(|a| a.severity != Severity::Critical));
        assert!(result.summary.contains("--- KINEMATICS ---"));
    }

    /// Nominal 2 BW squat: metrics in range, no joint-moment or critical alerts
    #[test]
    fn test_e2e_two_body_weight_squat() {
        let session = SyntheticSession::new(SyntheticConfig {
            peak_load_bw: 2.0,
            ..Default::default()
        })
        .build()
        .unwrap();
        let result = pipeline().run(&session);

        assert!(result.success, "{}", result.summary);
        assert!(!result.force.is_empty());
        for force in result.force.values() {
            assert!(
                force.peak_grf > 0.8 && force.peak_grf < 3.0,
                "peak {}",
                force.peak_grf
            );
        }
        assert!(!result.dynamic.is_empty());
        for (joint, dynamic) in &result.dynamic {
            assert!(dynamic.peak_moment < 3.5, "{joint} moment {}", dynamic.peak_moment);
        }
        assert!(
            result.alerts.iter().all(|a| a.category != AlertCategory::Dynamic),
            "{:?}",
            result.alerts.iter().map(|a| &a.title).collect::<Vec<_>>()
        );
        assert!(result
            .alerts
            .iter()
            .all(|a| a.severity != Severity::Critical));
    }

    /// A 6 BW impact spike must raise a force alert at ERROR or above
    #[test]
    fn test_e2e_impact_spike() {
        let session = SyntheticSession::squat().with_spike(6.0).build().unwrap();
        let result = pipeline().run(&session);

        assert!(result.success);
        let peak = result
            .force
            .values()
            .map(|f| f.peak_grf)
            .fold(0.0, f64::max);
        assert!(peak > 5.0, "peak {peak}");
        assert!(result.alerts.iter().any(|a| {
            a.category == AlertCategory::Force && a.severity >= Severity::Error
        }));
    }

    /// A 30 ms IMU clock lag is detected with the opposite sign
    #[test]
    fn test_e2e_clock_offset() {
        let generator = SyntheticSession::squat().with_imu_offset(0.03);
        let session = generator.build().unwrap();
        let result = pipeline().run(&session);

        assert!(result.success);
        let expected = generator.expected_time_offset();
        assert!(
            (result.sync.time_offset - expected).abs() <= 0.011,
            "offset {} expected {}",
            result.sync.time_offset,
            expected
        );
        assert!(result.sync.quality < 1.0);
    }

    #[test]
    fn test_e2e_jump_heights() {
        let generator = SyntheticSession::jump();
        let session = generator.build().unwrap();
        let result = pipeline().run(&session);

        assert!(result.success, "{}", result.summary);
        assert_eq!(
            result.events.contacts.len(),
            generator.config().repetitions + 1
        );
        assert_eq!(result.jump_heights.len(), result.events.contacts.len());
        assert!(result.jump_heights.values().any(|h| *h > 0.0));
        assert!(result.summary.contains("Jump height"));
    }

    #[test]
    fn test_e2e_no_overlap() {
        let mut session = SyntheticSession::squat().build().unwrap();
        session.force.time.iter_mut().for_each(|t| *t += 60.0);
        let result = pipeline().run(&session);

        assert!(!result.success);
        assert_eq!(result.failure_phase, Some(AnalysisPhase::Synchronization));
        assert!(result.summary.starts_with("ANALYSIS FAILED:"));
    }

    /// Capture file written by the generator analyzes like the in-memory session
    #[test]
    fn test_e2e_capture_file_round_trip() {
        let session = SyntheticSession::squat().with_seed(3).build().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("squat.json");
        ingestion::save_session(&path, &session).unwrap();

        let loaded = CaptureLoader::default().load(&path).unwrap();
        assert!(loaded.violations.is_empty());

        let direct = pipeline().run(&session);
        let from_file = pipeline().run(&loaded.session);
        assert_eq!(direct.force, from_file.force);
        assert_eq!(direct.events, from_file.events);
        assert_eq!(direct.alerts.len(), from_file.alerts.len());
    }

    #[test]
    fn test_e2e_config_disables_moment_estimate() {
        let config = config_loader::ConfigLoader::load_from_str(
            "[physics]\nestimate_knee_moment = false\n",
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        let session = SyntheticSession::squat().build().unwrap();
        let result = AnalysisPipeline::new(config).run(&session);

        assert!(result.success);
        assert!(result.dynamic.is_empty());
        assert!(!result.kinematic.is_empty());
    }

    #[test]
    fn test_e2e_observer_and_aggregation() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let observer = move |alert: &AlertRecord| -> Result<(), ContractError> {
            sink.lock().unwrap().push(alert.id.clone());
            Ok(())
        };
        let pipeline = pipeline().with_observer(Arc::new(observer));

        let mut aggregator = AnalysisMetricsAggregator::new();
        let sessions = [
            SyntheticSession::squat().build().unwrap(),
            SyntheticSession::squat().with_spike(6.0).build().unwrap(),
            SyntheticSession::squat().with_seed(9).build().unwrap(),
        ];
        let mut raised = 0;
        for session in &sessions {
            let result = pipeline.run(session);
            raised += result.alerts.len();
            aggregator.update(&result);
        }

        let summary = aggregator.summary();
        assert_eq!(summary.total_sessions, 3);
        assert_eq!(summary.failed_sessions, 0);
        assert!(summary.peak_grf_bw.max > 5.0);
        assert_eq!(seen.lock().unwrap().len(), raised);
    }
}
