mod common;

use std::{sync::Arc, thread, time::Duration};
use axum::http::StatusCode;
use heap_bridge::{Pipeline, PipelineError, Stage, Trigger};
use heap_bridge::error::CommandFailure;
use common::*;

#[test]
fn run_once_fetches_converts_and_uploads() {
    let source = ProfileSource::start(StatusCode::OK, HEAP_PROFILE);
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(FakeRunner::succeeding());
    let pipeline = Pipeline::new(Arc::new(test_config(&source.url, temp_dir.path())), runner.clone());

    let report = pipeline.run_once(Trigger::Manual).unwrap();

    assert_eq!(source.requests(), 1);
    assert_eq!(runner.programs(), vec!["pprof", "profilecli"]);
    let invocations = runner.invocations();
    assert_eq!(invocations[0].args[0], "--proto");
    assert_eq!(invocations[0].args[1], "/build-output/heap_profile_server");
    assert_eq!(invocations[0].input, HEAP_PROFILE.as_bytes());
    assert_eq!(invocations[1].args[0], "upload");
    assert_eq!(invocations[1].args[1], "--url=http://pyroscope:4040");
    assert_eq!(invocations[1].args[2], "--extra-labels=service_name=cpp-heap");
    assert_eq!(invocations[1].input, PPROF_BYTES);

    assert_eq!(report.trigger, Trigger::Manual);
    assert_eq!(report.profile_bytes, HEAP_PROFILE.len());
    assert_eq!(report.artifact_bytes, PPROF_BYTES.len() as u64);
    assert_eq!(report.receipt.0, RECEIPT);
    assert_eq!(files_in(temp_dir.path()), 0);
}

#[test]
fn run_once_uses_one_pair_of_files_and_removes_them() {
    let source = ProfileSource::start(StatusCode::OK, HEAP_PROFILE);
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(FakeRunner::succeeding());
    let pipeline = Pipeline::new(Arc::new(test_config(&source.url, temp_dir.path())), runner.clone());

    let report = pipeline.run_once(Trigger::Scheduled).unwrap();

    let invocations = runner.invocations();
    let text_path = invocations[0].args.last().unwrap();
    let binary_path = invocations[1].args.last().unwrap();
    assert!(text_path.ends_with(&format!("heap-{}.txt", report.run_id)));
    assert!(binary_path.ends_with(&format!("heap-{}.pprof", report.run_id)));
    assert!(!std::path::Path::new(text_path).exists());
    assert!(!std::path::Path::new(binary_path).exists());
}

#[test]
fn not_found_fails_the_run_with_the_status() {
    let source = ProfileSource::start(StatusCode::NOT_FOUND, "404 page not found");
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(FakeRunner::succeeding());
    let pipeline = Pipeline::new(Arc::new(test_config(&source.url, temp_dir.path())), runner.clone());

    let error = pipeline.run_once(Trigger::Manual).unwrap_err();

    assert_eq!(error.stage(), Stage::Network);
    assert_eq!(error.status(), Some(404));
    assert!(error.to_string().contains("404"));
    assert_eq!(source.requests(), 1);
    assert!(runner.invocations().is_empty());
    assert_eq!(files_in(temp_dir.path()), 0);
}

#[test]
fn unavailable_source_skips_conversion_and_upload() {
    let source = ProfileSource::start(StatusCode::SERVICE_UNAVAILABLE, "");
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(FakeRunner::succeeding());
    let pipeline = Pipeline::new(Arc::new(test_config(&source.url, temp_dir.path())), runner.clone());

    let error = pipeline.run_once(Trigger::Scheduled).unwrap_err();

    assert!(matches!(error, PipelineError::FetchStatus { status: 503, .. }));
    assert!(runner.invocations().is_empty());
    assert_eq!(files_in(temp_dir.path()), 0);
}

#[test]
fn empty_profile_is_a_network_error() {
    let source = ProfileSource::start(StatusCode::OK, "");
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(FakeRunner::succeeding());
    let pipeline = Pipeline::new(Arc::new(test_config(&source.url, temp_dir.path())), runner.clone());

    let error = pipeline.run_once(Trigger::Scheduled).unwrap_err();

    assert!(matches!(error, PipelineError::EmptyProfile { .. }));
    assert_eq!(error.stage(), Stage::Network);
    assert!(runner.invocations().is_empty());
}

#[test]
fn failed_conversion_skips_upload_and_removes_files() {
    let source = ProfileSource::start(StatusCode::OK, HEAP_PROFILE);
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(FakeRunner::failing_conversion());
    let pipeline = Pipeline::new(Arc::new(test_config(&source.url, temp_dir.path())), runner.clone());

    let error = pipeline.run_once(Trigger::Manual).unwrap_err();

    assert_eq!(error.stage(), Stage::Conversion);
    assert!(matches!(error, PipelineError::Conversion { failure: CommandFailure::Exit { code: Some(1), .. }, .. }));
    assert!(error.to_string().contains("unrecognized profile format"));
    assert_eq!(runner.programs(), vec!["pprof"]);
    assert_eq!(files_in(temp_dir.path()), 0);
}

#[test]
fn missing_converter_is_a_conversion_error() {
    let source = ProfileSource::start(StatusCode::OK, HEAP_PROFILE);
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(FakeRunner::succeeding());
    let mut config = test_config(&source.url, temp_dir.path());
    config.converter = String::from("go-pprof-missing");
    let pipeline = Pipeline::new(Arc::new(config), runner.clone());

    let error = pipeline.run_once(Trigger::Manual).unwrap_err();

    assert!(matches!(error, PipelineError::Conversion { failure: CommandFailure::Launch(_), .. }));
    assert_eq!(runner.programs(), vec!["go-pprof-missing"]);
    assert_eq!(files_in(temp_dir.path()), 0);
}

#[test]
fn failed_upload_is_reported_and_files_removed() {
    let source = ProfileSource::start(StatusCode::OK, HEAP_PROFILE);
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(FakeRunner::failing_upload());
    let pipeline = Pipeline::new(Arc::new(test_config(&source.url, temp_dir.path())), runner.clone());

    let error = pipeline.run_once(Trigger::Scheduled).unwrap_err();

    assert_eq!(error.stage(), Stage::Upload);
    assert!(error.to_string().contains("connection refused"));
    assert_eq!(runner.programs(), vec!["pprof", "profilecli"]);
    assert_eq!(files_in(temp_dir.path()), 0);
}

#[test]
fn overlapping_runs_use_distinct_files() {
    let source = ProfileSource::start(StatusCode::OK, HEAP_PROFILE);
    let temp_dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(FakeRunner::succeeding().with_delay(Duration::from_millis(100)));
    let pipeline = Pipeline::new(Arc::new(test_config(&source.url, temp_dir.path())), runner.clone());

    let handles: Vec<_> = [Trigger::Scheduled, Trigger::Manual, Trigger::Manual]
        .into_iter()
        .map(|trigger| {
            let pipeline = pipeline.clone();
            thread::spawn(move || pipeline.run_once(trigger))
        })
        .collect();
    let reports: Vec<_> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();

    assert_eq!(source.requests(), 3);
    assert!(runner.max_active() > 1, "runs did not overlap");
    let mut text_paths: Vec<String> = runner
        .invocations()
        .into_iter()
        .filter(|i| i.program == "pprof")
        .map(|i| i.args.last().unwrap().clone())
        .collect();
    text_paths.sort();
    text_paths.dedup();
    assert_eq!(text_paths.len(), 3);
    assert_ne!(reports[0].run_id, reports[1].run_id);
    assert_ne!(reports[1].run_id, reports[2].run_id);
    for invocation in runner.invocations().iter().filter(|i| i.program == "profilecli") {
        assert_eq!(invocation.input, PPROF_BYTES);
    }
    assert_eq!(files_in(temp_dir.path()), 0);
}
