//! Orchestration Tests
//!
//! Drives the orchestrator through recording fakes and asserts on the exact
//! sequence of stage calls each run produces.

use fetch_orchestrator::prelude::*;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use fetch_orchestrator::{ConfigError, MonitorError, ProcessStatus, Stage};
use fetch_test_utils::{setup_orchestrator, Call, StageFakes};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn metadata_call(config_file: &str, base: &str) -> Call {
    Call::Metadata(MetadataMigrationParams::new(
        config_file,
        PathBuf::from(base).join("pipelines/pipeline.yaml"),
        true,
    ))
}

#[tokio::test]
async fn skip_path_calls_only_metadata() {
    let (orchestrator, log) = setup_orchestrator(MetadataMigrationResult::default());

    let outcome = orchestrator
        .run("test_path", "test_file", "test_host")
        .await
        .unwrap();

    assert!(outcome.is_skipped());
    assert_eq!(log.calls(), vec![metadata_call("test_file", "test_path")]);
    assert_eq!(log.launches(), 0);
    assert_eq!(log.monitors(), 0);
}

#[tokio::test]
async fn index_names_alone_do_not_trigger_transfer() {
    let (orchestrator, log) =
        setup_orchestrator(MetadataMigrationResult::new(0, ["index1", "index2"]));

    let outcome = orchestrator
        .run("test_path", "test_file", "test_host")
        .await
        .unwrap();

    assert!(outcome.is_skipped());
    assert_eq!(log.launches(), 0);
    assert_eq!(log.monitors(), 0);
}

#[tokio::test]
async fn full_path_launches_and_monitors_once() {
    let (orchestrator, log) = StageFakes::new()
        .metadata_result(MetadataMigrationResult::new(10, ["index1", "index2"]))
        .first_process_id(4242)
        .build();

    let outcome = orchestrator
        .run("test_path", "test_file", "test_host")
        .await
        .unwrap();

    assert!(!outcome.is_skipped());
    assert_eq!(
        log.calls(),
        vec![
            metadata_call("test_file", "test_path"),
            Call::Launch(PathBuf::from("test_path/bin/data-prepper")),
            Call::Monitor {
                params: MigrationMonitorParams::new(10, "test_host"),
                process_id: Some(4242),
            },
        ]
    );
}

#[tokio::test]
async fn count_without_indices_still_transfers() {
    let (orchestrator, log) =
        setup_orchestrator(MetadataMigrationResult::new(7, Vec::<String>::new()));

    orchestrator.run("base", "config.yaml", "host").await.unwrap();

    assert_eq!(log.launches(), 1);
    assert_eq!(log.monitors(), 1);
}

#[tokio::test]
async fn identical_runs_produce_identical_calls() {
    let (orchestrator, log) = StageFakes::new()
        .metadata_result(MetadataMigrationResult::new(10, ["index1", "index2"]))
        .build();

    orchestrator.run("test_path", "test_file", "test_host").await.unwrap();
    let first = log.calls();
    log.clear();

    orchestrator.run("test_path", "test_file", "test_host").await.unwrap();
    let second = log.calls();

    // Process ids differ between launches; everything else must match
    let strip = |calls: Vec<Call>| -> Vec<Call> {
        calls
            .into_iter()
            .map(|call| match call {
                Call::Monitor { params, .. } => Call::Monitor {
                    params,
                    process_id: None,
                },
                other => other,
            })
            .collect()
    };
    assert_eq!(strip(first), strip(second));
}

#[tokio::test]
async fn metadata_failure_aborts_before_launch() {
    let (orchestrator, log) = StageFakes::new()
        .metadata_result(MetadataMigrationResult::new(10, ["index1"]))
        .fail_metadata("source cluster refused connection")
        .build();

    let err = orchestrator
        .run("test_path", "test_file", "test_host")
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Metadata);
    assert!(err.to_string().contains("source cluster refused connection"));
    assert_eq!(log.calls(), vec![metadata_call("test_file", "test_path")]);
}

#[tokio::test]
async fn launch_failure_aborts_before_monitor() {
    let (orchestrator, log) = StageFakes::new()
        .metadata_result(MetadataMigrationResult::new(10, ["index1"]))
        .fail_launch()
        .build();

    let err = orchestrator
        .run("test_path", "test_file", "test_host")
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Launch);
    assert_eq!(log.launches(), 1);
    assert_eq!(log.monitors(), 0);
}

#[tokio::test]
async fn failed_transfer_process_fails_run() {
    let (orchestrator, log) = StageFakes::new()
        .metadata_result(MetadataMigrationResult::new(10, ["index1"]))
        .process_outcome(ProcessStatus::Exited(Some(2)))
        .build();

    let err = orchestrator
        .run("test_path", "test_file", "test_host")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MigrationError::Monitor(MonitorError::ProcessFailed { exit_code: Some(2) })
    ));
    assert_eq!(log.monitors(), 1);
}

#[tokio::test]
async fn invalid_inline_pipeline_is_config_failure_without_stage_calls() {
    let dir = tempfile::tempdir().unwrap();
    let config_file = dir.path().join("input.yaml");
    let (orchestrator, log) = setup_orchestrator(MetadataMigrationResult::new(10, ["index1"]));

    let err = orchestrator
        .run_with_inline_pipeline("test_path", &config_file, "test_host", Some("not base64!"))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Configuration);
    assert!(matches!(
        err,
        MigrationError::Config(ConfigError::InvalidInlinePipeline(_))
    ));
    assert!(log.calls().is_empty());
    assert!(!config_file.exists());
}

#[tokio::test]
async fn inline_pipeline_is_written_before_metadata_stage() {
    let dir = tempfile::tempdir().unwrap();
    let config_file = dir.path().join("input.yaml");
    let pipeline = "historical-data-migration:\n  sink: []\n";
    let (orchestrator, log) = setup_orchestrator(MetadataMigrationResult::default());

    let outcome = orchestrator
        .run_with_inline_pipeline(
            "test_path",
            &config_file,
            "test_host",
            Some(&STANDARD.encode(pipeline)),
        )
        .await
        .unwrap();

    assert!(outcome.is_skipped());
    assert_eq!(std::fs::read_to_string(&config_file).unwrap(), pipeline);
    assert_eq!(
        log.calls(),
        vec![Call::Metadata(MetadataMigrationParams::new(
            config_file.clone(),
            PathBuf::from("test_path").join("pipelines/pipeline.yaml"),
            true,
        ))]
    );
}
