// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::helpers::{ChannelWorker, declared, failed, passed, selected};
use camino::Utf8Path;
use pretty_assertions::assert_eq;
use run_status::{
    FileStats, ParallelRuns, RunCircumstances, RunStatus, RunStatusEvent, RunStatusExitCode,
};

const NOT_MATCHING: RunCircumstances = RunCircumstances { matching: false };

fn single_file_run() -> (RunStatus, ChannelWorker) {
    let mut run_status = RunStatus::new(1, None, None);
    let mut worker = ChannelWorker::default();
    run_status
        .observe_worker(&mut worker, "test/one.js", FileStats::default())
        .expect("registered once");
    (run_status, worker)
}

#[test]
fn single_passing_test() {
    let (mut run_status, worker) = single_file_run();
    worker.send(declared("test/one.js", "adds"));
    worker.send(selected("test/one.js", "adds"));
    worker.send(passed("test/one.js", "adds"));
    assert_eq!(run_status.process_queued(), Ok(3));

    assert_eq!(
        run_status.suggest_exit_code(&NOT_MATCHING),
        RunStatusExitCode::OK
    );
    assert!(run_status.failed_test_files().is_empty());
}

#[test]
fn single_failing_test() {
    let (mut run_status, worker) = single_file_run();
    worker.send(declared("test/one.js", "adds"));
    worker.send(selected("test/one.js", "adds"));
    worker.send(failed("test/one.js", "adds"));
    assert_eq!(run_status.process_queued(), Ok(3));

    assert_eq!(
        run_status.suggest_exit_code(&NOT_MATCHING),
        RunStatusExitCode::FAILED
    );
    assert_eq!(
        run_status.failed_test_files(),
        vec![Utf8Path::new("test/one.js")]
    );
}

#[test]
fn failed_files_in_registration_order() {
    let mut run_status = RunStatus::new(3, None, None);
    for test_file in ["c.js", "a.js", "b.js"] {
        run_status
            .observe_worker(&mut ChannelWorker::default(), test_file, FileStats::default())
            .unwrap();
    }
    for test_file in ["b.js", "c.js"] {
        run_status
            .emit_state_change(selected(test_file, "t"))
            .unwrap();
        run_status.emit_state_change(failed(test_file, "t")).unwrap();
    }
    run_status.emit_state_change(selected("a.js", "t")).unwrap();
    run_status.emit_state_change(passed("a.js", "t")).unwrap();

    assert_eq!(
        run_status.failed_test_files(),
        vec![Utf8Path::new("c.js"), Utf8Path::new("b.js")]
    );
}

#[test]
fn empty_parallel_shard() {
    let run_status = RunStatus::new(
        3,
        Some(ParallelRuns {
            current_file_count: 0,
            total_runs: 2,
        }),
        None,
    );
    assert_eq!(run_status.stats().declared_tests, 0);
    assert_eq!(
        run_status.suggest_exit_code(&NOT_MATCHING),
        RunStatusExitCode::OK
    );
}

#[test]
fn title_filter_without_selection() {
    let (run_status, _worker) = single_file_run();
    assert_eq!(
        run_status.suggest_exit_code(&RunCircumstances { matching: true }),
        RunStatusExitCode::FAILED
    );
}

#[test]
fn line_selection_without_selection() {
    let mut run_status = RunStatus::new(2, None, None);
    let mut clean = ChannelWorker::default();
    run_status
        .observe_worker(&mut clean, "clean.js", FileStats::default())
        .unwrap();
    run_status
        .observe_worker(
            &mut ChannelWorker::default(),
            "lines.js",
            FileStats {
                selecting_lines: true,
                ..FileStats::default()
            },
        )
        .unwrap();

    clean.send(declared("clean.js", "ok"));
    clean.send(selected("clean.js", "ok"));
    clean.send(passed("clean.js", "ok"));
    run_status.process_queued().unwrap();

    assert_eq!(
        run_status.suggest_exit_code(&NOT_MATCHING),
        RunStatusExitCode::FAILED
    );
}

#[test]
fn listener_sees_stats_before_each_counted_event() {
    let (mut run_status, worker) = single_file_run();
    let mut rx = run_status.subscribe();

    worker.send(declared("test/one.js", "adds"));
    worker.send(selected("test/one.js", "adds"));
    worker.send(passed("test/one.js", "adds"));
    run_status.process_queued().unwrap();

    let kinds: Vec<_> = rx
        .drain()
        .into_iter()
        .map(|event| match event {
            RunStatusEvent::Stats(_) => "stats".to_owned(),
            RunStatusEvent::StateChange(state_change) => state_change.event.kind().to_owned(),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "stats",
            "declared-test",
            "stats",
            "selected-test",
            "stats",
            "test-passed"
        ]
    );
}
