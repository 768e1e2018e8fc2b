// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run statistics, as seen by the aggregator and its listeners.

use crate::errors::ParallelRunsParseError;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Statistics for an entire test run.
///
/// The aggregator owns exactly one of these and mutates it as events come in. Listeners only ever
/// see independent copies of it.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalStats {
    /// Per-file statistics, in the order the files were registered.
    pub by_file: IndexMap<Utf8PathBuf, FileStats>,

    /// The number of tests that were declared.
    pub declared_tests: usize,

    /// The number of hooks that failed.
    pub failed_hooks: usize,

    /// The number of tests that failed.
    pub failed_tests: usize,

    /// The number of workers that failed.
    pub failed_workers: usize,

    /// The total number of test files planned for this run.
    pub files: usize,

    /// This process's share of a parallel run, if any.
    pub parallel_runs: Option<ParallelRuns>,

    /// The number of workers that finished.
    pub finished_workers: usize,

    /// The number of internal errors, whether or not they could be attributed to a file.
    pub internal_errors: usize,

    /// The number of selected tests that have not passed or failed yet.
    pub remaining_tests: usize,

    /// The number of tests marked as known to fail that passed.
    pub passed_known_failing_tests: usize,

    /// The number of tests that passed.
    pub passed_tests: usize,

    /// The number of tests that were selected to run, including skipped and todo tests.
    pub selected_tests: usize,

    /// The number of errors reported by shared workers.
    pub shared_worker_errors: usize,

    /// The number of selected tests that were skipped.
    pub skipped_tests: usize,

    /// The number of timeouts.
    pub timeouts: usize,

    /// The number of selected tests marked as todo.
    pub todo_tests: usize,

    /// The number of uncaught exceptions.
    pub uncaught_exceptions: usize,

    /// The number of unhandled promise rejections.
    pub unhandled_rejections: usize,
}

impl GlobalStats {
    /// Creates a new, zeroed `GlobalStats` for a run over `files` test files.
    pub fn new(files: usize, parallel_runs: Option<ParallelRuns>) -> Self {
        Self {
            files,
            parallel_runs,
            ..Self::default()
        }
    }

    /// Returns the statistics for the given test file, if it has been registered.
    pub fn file(&self, test_file: &Utf8Path) -> Option<&FileStats> {
        self.by_file.get(test_file)
    }

    /// Serializes these statistics as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Statistics for a single test file.
///
/// The default value has every counter at zero and `selecting_lines` unset. Callers registering a
/// file typically override only the fields they know about:
///
/// ```
/// use run_status_metadata::FileStats;
///
/// let stats = FileStats {
///     selecting_lines: true,
///     ..FileStats::default()
/// };
/// assert_eq!(stats.selected_tests, 0);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileStats {
    /// The number of tests declared in this file.
    pub declared_tests: usize,

    /// The number of hooks in this file that failed.
    pub failed_hooks: usize,

    /// The number of tests in this file that failed.
    pub failed_tests: usize,

    /// The number of internal errors attributed to this file.
    pub internal_errors: usize,

    /// The number of selected tests in this file that have not passed or failed yet.
    pub remaining_tests: usize,

    /// The number of tests in this file marked as known to fail that passed.
    pub passed_known_failing_tests: usize,

    /// The number of tests in this file that passed.
    pub passed_tests: usize,

    /// The number of tests in this file that were selected to run.
    pub selected_tests: usize,

    /// True if test selection in this file was scoped to specific line ranges.
    pub selecting_lines: bool,

    /// The number of selected tests in this file that were skipped.
    pub skipped_tests: usize,

    /// The number of selected tests in this file marked as todo.
    pub todo_tests: usize,

    /// The number of uncaught exceptions in this file.
    pub uncaught_exceptions: usize,

    /// The number of unhandled promise rejections in this file.
    pub unhandled_rejections: usize,
}

/// Describes this process's shard of a run split across several processes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParallelRuns {
    /// The number of test files assigned to this shard.
    pub current_file_count: usize,

    /// The total number of shards in the run.
    pub total_runs: usize,
}

impl ParallelRuns {
    /// Returns true if the run is actually split, i.e. there's more than one shard.
    pub fn is_split(&self) -> bool {
        self.total_runs > 1
    }
}

impl FromStr for ParallelRuns {
    type Err = ParallelRunsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The input looks like "<current-file-count>/<total-runs>".
        let Some((current_file_count, total_runs)) = s.split_once('/') else {
            return Err(ParallelRunsParseError::new(format!(
                "expected input '{s}' to be in the format M/N"
            )));
        };

        let current_file_count: usize = current_file_count.parse().map_err(|err| {
            ParallelRunsParseError::new(format!(
                "failed to parse current file count '{current_file_count}': {err}"
            ))
        })?;
        let total_runs: usize = total_runs.parse().map_err(|err| {
            ParallelRunsParseError::new(format!(
                "failed to parse total runs '{total_runs}': {err}"
            ))
        })?;

        if total_runs == 0 {
            return Err(ParallelRunsParseError::new("total runs must be at least 1"));
        }

        Ok(Self {
            current_file_count,
            total_runs,
        })
    }
}

impl fmt::Display for ParallelRuns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current_file_count, self.total_runs)
    }
}

#[cfg(feature = "proptest1")]
mod proptest_impls {
    use super::ParallelRuns;
    use proptest::prelude::*;

    impl Arbitrary for ParallelRuns {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
            (0..8usize, 1..8usize)
                .prop_map(|(current_file_count, total_runs)| ParallelRuns {
                    current_file_count,
                    total_runs,
                })
                .boxed()
        }
    }
}
