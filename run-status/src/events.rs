// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events consumed and produced by the aggregator.
//!
//! Workers send [`StateChangeEvent`]s to the aggregator. The aggregator folds each one into its
//! statistics and then forwards it to listeners as a [`RunStatusEvent`].

use crate::pending::PendingTests;
use camino::{Utf8Path, Utf8PathBuf};
use run_status_metadata::GlobalStats;
use std::{fmt, sync::Arc, time::Duration};

/// A lifecycle event produced by a worker.
///
/// Each variant carries the fields its kind needs. File-scoped events must name a test file that
/// was registered with [`RunStatus::observe_worker`](crate::RunStatus::observe_worker).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StateChangeEvent {
    /// A test was declared.
    DeclaredTest {
        /// The file the test is declared in.
        test_file: Utf8PathBuf,

        /// The title of the test.
        title: String,

        /// True if the test is expected to fail.
        known_failing: bool,

        /// True if the test is a todo.
        todo: bool,
    },

    /// A hook failed.
    HookFailed {
        /// The file the hook is declared in.
        test_file: Utf8PathBuf,

        /// The title of the hook.
        title: String,

        /// The error the hook failed with.
        err: ErrorInfo,

        /// How long the hook ran for.
        duration: Duration,
    },

    /// An internal error occurred.
    ///
    /// Internal errors are not always attributable to a file, so `test_file` is optional.
    InternalError {
        /// The file the error occurred in, if any.
        test_file: Option<Utf8PathBuf>,

        /// The error.
        err: ErrorInfo,
    },

    /// A test was selected to run.
    SelectedTest {
        /// The file the test is declared in.
        test_file: Utf8PathBuf,

        /// The title of the test.
        title: String,

        /// True if the test is expected to fail.
        known_failing: bool,

        /// True if the test will be skipped.
        skip: bool,

        /// True if the test is a todo.
        todo: bool,
    },

    /// A shared worker reported an error.
    SharedWorkerError {
        /// The error.
        err: ErrorInfo,
    },

    /// A test failed.
    TestFailed {
        /// The file the test is declared in.
        test_file: Utf8PathBuf,

        /// The title of the test.
        title: String,

        /// The error the test failed with.
        err: ErrorInfo,

        /// How long the test ran for.
        duration: Duration,

        /// True if the test was expected to fail.
        known_failing: bool,
    },

    /// A test passed.
    TestPassed {
        /// The file the test is declared in.
        test_file: Utf8PathBuf,

        /// The title of the test.
        title: String,

        /// How long the test ran for.
        duration: Duration,

        /// True if the test was expected to fail. Such a test still passes, but is counted
        /// separately.
        known_failing: bool,
    },

    /// The run timed out.
    Timeout {
        /// The period of inactivity after which the timeout fired.
        period: Duration,
    },

    /// The run was interrupted.
    Interrupt,

    /// An exception went uncaught.
    UncaughtException {
        /// The file the exception was thrown in.
        test_file: Utf8PathBuf,

        /// The exception.
        err: ErrorInfo,
    },

    /// A promise rejection went unhandled.
    UnhandledRejection {
        /// The file the rejection occurred in.
        test_file: Utf8PathBuf,

        /// The rejection reason.
        err: ErrorInfo,
    },

    /// A worker failed.
    WorkerFailed {
        /// The file the worker was running.
        test_file: Utf8PathBuf,

        /// Why the worker failed.
        reason: WorkerFailure,
    },

    /// A worker finished.
    WorkerFinished {
        /// The file the worker was running.
        test_file: Utf8PathBuf,

        /// True if the worker was forced to exit.
        forced_exit: bool,
    },

    /// A worker wrote to standard output.
    WorkerStdout {
        /// The file the worker is running.
        test_file: Utf8PathBuf,

        /// The output.
        chunk: Vec<u8>,
    },

    /// A worker wrote to standard error.
    WorkerStderr {
        /// The file the worker is running.
        test_file: Utf8PathBuf,

        /// The output.
        chunk: Vec<u8>,
    },

    /// Any other event. These are forwarded to listeners without affecting statistics.
    Other {
        /// The kind of event.
        kind: String,

        /// The file the event is about, if any.
        test_file: Option<Utf8PathBuf>,
    },
}

impl StateChangeEvent {
    /// Returns the kind of this event, as a kebab-case string.
    pub fn kind(&self) -> &str {
        match self {
            Self::DeclaredTest { .. } => "declared-test",
            Self::HookFailed { .. } => "hook-failed",
            Self::InternalError { .. } => "internal-error",
            Self::SelectedTest { .. } => "selected-test",
            Self::SharedWorkerError { .. } => "shared-worker-error",
            Self::TestFailed { .. } => "test-failed",
            Self::TestPassed { .. } => "test-passed",
            Self::Timeout { .. } => "timeout",
            Self::Interrupt => "interrupt",
            Self::UncaughtException { .. } => "uncaught-exception",
            Self::UnhandledRejection { .. } => "unhandled-rejection",
            Self::WorkerFailed { .. } => "worker-failed",
            Self::WorkerFinished { .. } => "worker-finished",
            Self::WorkerStdout { .. } => "worker-stdout",
            Self::WorkerStderr { .. } => "worker-stderr",
            Self::Other { kind, .. } => kind.as_str(),
        }
    }

    /// Returns the test file this event refers to, if any.
    pub fn test_file(&self) -> Option<&Utf8Path> {
        match self {
            Self::DeclaredTest { test_file, .. }
            | Self::HookFailed { test_file, .. }
            | Self::SelectedTest { test_file, .. }
            | Self::TestFailed { test_file, .. }
            | Self::TestPassed { test_file, .. }
            | Self::UncaughtException { test_file, .. }
            | Self::UnhandledRejection { test_file, .. }
            | Self::WorkerFailed { test_file, .. }
            | Self::WorkerFinished { test_file, .. }
            | Self::WorkerStdout { test_file, .. }
            | Self::WorkerStderr { test_file, .. } => Some(test_file.as_path()),
            Self::InternalError { test_file, .. } | Self::Other { test_file, .. } => {
                test_file.as_deref()
            }
            Self::SharedWorkerError { .. } | Self::Timeout { .. } | Self::Interrupt => None,
        }
    }
}

/// A description of an error reported by a worker.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorInfo {
    /// The name of the error type, if known.
    pub name: Option<String>,

    /// The error message.
    pub message: String,
}

impl ErrorInfo {
    /// Creates a new `ErrorInfo` with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// The reason a worker failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WorkerFailure {
    /// The worker exited with a non-zero exit code.
    NonZeroExitCode(i32),

    /// The worker was terminated by a signal.
    Signal(String),

    /// The worker could not be started or crashed with an error.
    Error(ErrorInfo),
}

/// An event broadcast by the aggregator to its listeners.
#[derive(Clone, Debug)]
pub enum RunStatusEvent {
    /// A snapshot of the run statistics, sent whenever they changed.
    ///
    /// The snapshot is an independent copy: later changes to the run do not affect it.
    Stats(Arc<GlobalStats>),

    /// A state change event, forwarded after it was folded into the statistics.
    StateChange(StateChange),
}

/// A state change event as forwarded to listeners.
#[derive(Clone, Debug)]
pub struct StateChange {
    /// The original event.
    pub event: StateChangeEvent,

    /// For timeouts and interrupts, the tests that were still pending when the event arrived.
    ///
    /// This is `None` for all other events.
    pub pending_tests: Option<PendingTests>,
}
