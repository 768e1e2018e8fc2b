// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deciding the outcome of a run.

use crate::aggregator::RunStatus;
use camino::Utf8PathBuf;
use run_status_metadata::{GlobalStats, RunStatusExitCode};
use std::fmt;

/// Circumstances of a run that the statistics alone don't capture.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunCircumstances {
    /// True if tests were selected by a title filter.
    pub matching: bool,
}

/// The outcome of a run, along with the reason for it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FinalRunStatus {
    /// Nothing in the run is considered a failure.
    Success,

    /// This is a shard of a parallel run that was assigned no files. Not a failure.
    EmptyParallelRun,

    /// Tests were selected by a title filter, but the filter matched nothing.
    NoMatchingTests,

    /// No tests were declared.
    NoTestsDeclared,

    /// Something in the run failed. Always contains at least one failure.
    Failed(Vec<RunFailure>),

    /// Tests in this file were selected by line number, but no tests matched.
    NoLineMatches {
        /// The first such file, in registration order.
        test_file: Utf8PathBuf,
    },
}

impl FinalRunStatus {
    /// Returns true if this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::EmptyParallelRun)
    }

    /// Returns the exit code for this outcome, as documented in [`RunStatusExitCode`].
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            RunStatusExitCode::OK
        } else {
            RunStatusExitCode::FAILED
        }
    }
}

impl fmt::Display for FinalRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "run succeeded"),
            Self::EmptyParallelRun => write!(f, "no files were assigned to this parallel run"),
            Self::NoMatchingTests => write!(f, "no tests matched the title filter"),
            Self::NoTestsDeclared => write!(f, "no tests were declared"),
            Self::Failed(failures) => {
                write!(f, "run failed: ")?;
                for (index, failure) in failures.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{failure}")?;
                }
                Ok(())
            }
            Self::NoLineMatches { test_file } => {
                write!(f, "no tests matched the selected lines in `{test_file}`")
            }
        }
    }
}

/// A kind of failure found in a run, and how many times it occurred.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RunFailure {
    /// The kind of failure.
    pub kind: RunFailureKind,

    /// The number of times it occurred. Always at least 1.
    pub count: usize,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.count, self.kind.to_static_str())
    }
}

/// The kind of a [`RunFailure`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum RunFailureKind {
    /// Internal errors.
    InternalError,

    /// Failed hooks.
    HookFailure,

    /// Failed tests.
    TestFailure,

    /// Failed workers.
    WorkerFailure,

    /// Shared worker errors.
    SharedWorkerError,

    /// Timeouts.
    Timeout,

    /// Uncaught exceptions.
    UncaughtException,

    /// Unhandled rejections.
    UnhandledRejection,
}

impl RunFailureKind {
    pub(crate) fn to_static_str(self) -> &'static str {
        match self {
            Self::InternalError => "internal errors",
            Self::HookFailure => "hook failures",
            Self::TestFailure => "test failures",
            Self::WorkerFailure => "worker failures",
            Self::SharedWorkerError => "shared worker errors",
            Self::Timeout => "timeouts",
            Self::UncaughtException => "uncaught exceptions",
            Self::UnhandledRejection => "unhandled rejections",
        }
    }
}

fn run_failures(stats: &GlobalStats) -> Vec<RunFailure> {
    [
        (RunFailureKind::InternalError, stats.internal_errors),
        (RunFailureKind::HookFailure, stats.failed_hooks),
        (RunFailureKind::TestFailure, stats.failed_tests),
        (RunFailureKind::WorkerFailure, stats.failed_workers),
        (RunFailureKind::SharedWorkerError, stats.shared_worker_errors),
        (RunFailureKind::Timeout, stats.timeouts),
        (RunFailureKind::UncaughtException, stats.uncaught_exceptions),
        (RunFailureKind::UnhandledRejection, stats.unhandled_rejections),
    ]
    .into_iter()
    .filter(|(_, count)| *count > 0)
    .map(|(kind, count)| RunFailure { kind, count })
    .collect()
}

impl RunStatus {
    /// Decides the outcome of the run so far.
    ///
    /// The first matching rule wins:
    ///
    /// 1. a parallel run shard that was assigned no files succeeds;
    /// 2. a title filter that matched nothing fails;
    /// 3. a run with no declared tests, or with any failure, fails;
    /// 4. a file whose line selection matched nothing fails the run;
    /// 5. otherwise the run succeeds.
    pub fn final_status(&self, circumstances: &RunCircumstances) -> FinalRunStatus {
        if self.is_empty_parallel_run() {
            return FinalRunStatus::EmptyParallelRun;
        }

        let stats = self.stats();
        if circumstances.matching && stats.selected_tests == 0 {
            return FinalRunStatus::NoMatchingTests;
        }

        let failures = run_failures(stats);
        if !failures.is_empty() {
            return FinalRunStatus::Failed(failures);
        }
        if stats.declared_tests == 0 {
            return FinalRunStatus::NoTestsDeclared;
        }

        if let Some((test_file, _)) = stats
            .by_file
            .iter()
            .find(|(_, file_stats)| file_stats.selecting_lines && file_stats.selected_tests == 0)
        {
            return FinalRunStatus::NoLineMatches {
                test_file: test_file.clone(),
            };
        }

        FinalRunStatus::Success
    }

    /// Suggests an exit code for the process: [`RunStatusExitCode::OK`] or
    /// [`RunStatusExitCode::FAILED`].
    pub fn suggest_exit_code(&self, circumstances: &RunCircumstances) -> i32 {
        self.final_status(circumstances).exit_code()
    }
}
