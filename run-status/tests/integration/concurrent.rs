// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::helpers::{ChannelWorker, declared, failed, init_tracing, passed, selected};
use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use run_status::{
    FileStats, GlobalStats, RunCircumstances, RunStatus, RunStatusEvent, RunStatusExitCode,
    StateChangeEvent, errors::RunStatusError,
};

const TESTS_PER_FILE: usize = 50;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn workers_on_separate_threads() {
    init_tracing();

    let test_files: Vec<Utf8PathBuf> = (0..8)
        .map(|index| Utf8PathBuf::from(format!("test/file-{index}.js")))
        .collect();
    let mut run_status = RunStatus::new(test_files.len(), None, None);
    let mut rx = run_status.subscribe();

    let mut handles = Vec::new();
    for (index, test_file) in test_files.iter().enumerate() {
        let mut worker = ChannelWorker::default();
        run_status
            .observe_worker(&mut worker, test_file.clone(), FileStats::default())
            .unwrap();

        let test_file = test_file.clone();
        handles.push(std::thread::spawn(move || {
            for test in 0..TESTS_PER_FILE {
                let title = format!("test {test}");
                worker.send(declared(test_file.as_str(), &title));
                worker.send(selected(test_file.as_str(), &title));
                // The first file fails its first test.
                if index == 0 && test == 0 {
                    worker.send(failed(test_file.as_str(), &title));
                } else {
                    worker.send(passed(test_file.as_str(), &title));
                }
            }
            worker.send(StateChangeEvent::WorkerFinished {
                test_file,
                forced_exit: false,
            });
        }));
    }

    // Every worker drops its sender when its thread finishes, which ends the run.
    run_status.run().await.unwrap();
    for handle in handles {
        handle.join().expect("worker thread didn't panic");
    }

    let total = test_files.len() * TESTS_PER_FILE;
    let stats = run_status.stats();
    assert_eq!(stats.declared_tests, total);
    assert_eq!(stats.selected_tests, total);
    assert_eq!(stats.passed_tests, total - 1);
    assert_eq!(stats.failed_tests, 1);
    assert_eq!(stats.remaining_tests, 0);
    assert_eq!(stats.finished_workers, test_files.len());
    for (test_file, file_stats) in &stats.by_file {
        assert_eq!(
            file_stats.selected_tests, TESTS_PER_FILE,
            "selected tests for {test_file}"
        );
        assert_eq!(file_stats.remaining_tests, 0, "remaining tests for {test_file}");
    }
    assert!(run_status.pending_tests().is_empty());
    assert_eq!(run_status.failed_test_files(), vec![test_files[0].as_path()]);
    assert_eq!(
        run_status.suggest_exit_code(&RunCircumstances::default()),
        RunStatusExitCode::FAILED
    );

    // Every event was counted exactly once and the last snapshot matches the final state.
    let events = rx.drain();
    let snapshots: Vec<&GlobalStats> = events
        .iter()
        .filter_map(|event| match event {
            RunStatusEvent::Stats(snapshot) => Some(&**snapshot),
            RunStatusEvent::StateChange(_) => None,
        })
        .collect();
    assert_eq!(events.len(), 2 * snapshots.len());
    assert_eq!(snapshots.len(), total * 3 + test_files.len());
    assert_eq!(snapshots.last(), Some(&stats));
}

#[tokio::test]
async fn registration_closes_when_running() {
    let mut run_status = RunStatus::new(1, None, None);
    run_status.run().await.unwrap();

    let err = run_status
        .observe_worker(&mut ChannelWorker::default(), "late.js", FileStats::default())
        .expect_err("registration is closed");
    assert_eq!(err, RunStatusError::RegistrationClosed);
}

#[tokio::test]
async fn run_folds_other_workers_past_unknown_test_file() {
    init_tracing();
    let mut run_status = RunStatus::new(2, None, None);
    let mut worker_a = ChannelWorker::default();
    let mut worker_b = ChannelWorker::default();
    run_status
        .observe_worker(&mut worker_a, "a.js", FileStats::default())
        .unwrap();
    run_status
        .observe_worker(&mut worker_b, "b.js", FileStats::default())
        .unwrap();
    worker_a.send(declared("a.js", "one"));
    worker_a.send(selected("zzz.js", "not registered"));
    worker_b.send(declared("b.js", "two"));
    worker_b.send(selected("b.js", "two"));
    worker_b.send(failed("b.js", "two"));
    drop(worker_a);
    drop(worker_b);

    let err = run_status.run().await.expect_err("zzz.js isn't registered");
    assert_eq!(
        err,
        RunStatusError::UnknownTestFile {
            test_file: "zzz.js".into()
        }
    );
    assert_eq!(run_status.stats().declared_tests, 2);
    assert_eq!(run_status.stats().failed_tests, 1);
    assert_eq!(
        run_status.suggest_exit_code(&RunCircumstances::default()),
        RunStatusExitCode::FAILED
    );
}

#[test]
fn send_after_aggregator_dropped() {
    let mut run_status = RunStatus::new(1, None, None);
    let mut worker = ChannelWorker::default();
    run_status
        .observe_worker(&mut worker, "a.js", FileStats::default())
        .unwrap();
    drop(run_status);

    let sender = worker.sender.expect("worker was registered");
    let err = sender
        .send(selected("a.js", "orphan"))
        .expect_err("aggregator is gone");
    assert_eq!(
        err.to_string(),
        "failed to deliver `selected-test` event: the aggregator has been dropped"
    );
    assert_eq!(err.into_event(), selected("a.js", "orphan"));
}
