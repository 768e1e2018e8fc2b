// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino_tempfile::tempdir;
use indoc::indoc;
use pretty_assertions::assert_eq;
use run_status::{RunCircumstances, RunStatus, RunStatusConfig, RunStatusExitCode};

#[test]
fn aggregator_from_config_file() {
    let dir = tempdir().unwrap();
    let config_file = dir.path().join("run-status.toml");
    std::fs::write(
        &config_file,
        indoc! {r#"
            files = 4

            [parallel-runs]
            current-file-count = 0
            total-runs = 4

            [selection-insights]
            filter = ["*login*"]
        "#},
    )
    .unwrap();

    let config = RunStatusConfig::from_path(&config_file).expect("valid config");
    let run_status = RunStatus::from_config(&config);

    assert!(run_status.is_empty_parallel_run());
    assert_eq!(run_status.stats().files, 4);
    assert_eq!(
        run_status.selection_insights(),
        Some(&serde_json::json!({ "filter": ["*login*"] }))
    );
    assert_eq!(
        run_status.suggest_exit_code(&RunCircumstances::default()),
        RunStatusExitCode::OK
    );
}
