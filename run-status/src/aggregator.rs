// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The aggregator.
//!
//! [`RunStatus`] receives events from workers, folds them into [`GlobalStats`], and forwards them to
//! listeners along with snapshots of the statistics.

use crate::{
    config::RunStatusConfig,
    errors::RunStatusError,
    events::{RunStatusEvent, StateChange, StateChangeEvent},
    listener::{Listeners, RunStatusReceiver},
    pending::PendingTests,
    worker::{Inbound, ObservedWorker},
};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use run_status_metadata::{FileStats, GlobalStats, ParallelRuns};
use std::sync::Arc;
use tracing::{debug, warn};

/// Aggregates events from test workers into the status of a run.
///
/// All statistics are owned by the aggregator and only ever change while an event is being folded
/// in. Listeners receive independent snapshots, never references to live state.
#[derive(Debug)]
pub struct RunStatus {
    stats: GlobalStats,
    pending_tests: PendingTests,
    empty_parallel_run: bool,
    selection_insights: Option<serde_json::Value>,
    inbound: Inbound,
    listeners: Listeners,
}

impl RunStatus {
    /// Creates a new aggregator for a run over `files` test files.
    ///
    /// `selection_insights` is not interpreted: it's made available to consumers through
    /// [`Self::selection_insights`].
    pub fn new(
        files: usize,
        parallel_runs: Option<ParallelRuns>,
        selection_insights: Option<serde_json::Value>,
    ) -> Self {
        // A shard of a parallel run may legitimately be assigned no files at all.
        let empty_parallel_run = parallel_runs.is_some_and(|parallel_runs| {
            parallel_runs.current_file_count == 0 && parallel_runs.is_split() && files > 0
        });

        Self {
            stats: GlobalStats::new(files, parallel_runs),
            pending_tests: PendingTests::new(),
            empty_parallel_run,
            selection_insights,
            inbound: Inbound::new(),
            listeners: Listeners::default(),
        }
    }

    /// Creates a new aggregator from a config.
    pub fn from_config(config: &RunStatusConfig) -> Self {
        Self::new(
            config.files,
            config.parallel_runs,
            config.selection_insights.clone(),
        )
    }

    /// Registers a worker running `test_file`.
    ///
    /// `initial_stats` seeds the statistics for the file. Every event the worker later sends is
    /// folded into this aggregator.
    pub fn observe_worker<W>(
        &mut self,
        worker: &mut W,
        test_file: impl Into<Utf8PathBuf>,
        initial_stats: FileStats,
    ) -> Result<(), RunStatusError>
    where
        W: ObservedWorker + ?Sized,
    {
        let test_file = test_file.into();
        if self.stats.by_file.contains_key(&test_file) {
            return Err(RunStatusError::DuplicateTestFile { test_file });
        }
        let sender = self
            .inbound
            .sender()
            .ok_or(RunStatusError::RegistrationClosed)?;

        debug!(
            %test_file,
            selecting_lines = initial_stats.selecting_lines,
            "observing worker"
        );
        self.pending_tests.register_file(&test_file);
        self.stats.by_file.insert(test_file, initial_stats);
        worker.on_state_change(sender);

        Ok(())
    }

    /// Subscribes a new listener to this aggregator's events.
    ///
    /// The listener receives every event folded in after this call.
    pub fn subscribe(&mut self) -> RunStatusReceiver {
        self.listeners.subscribe()
    }

    /// Folds an event into the statistics and forwards it to listeners.
    ///
    /// If the statistics changed, a snapshot is broadcast first, then the event itself. For
    /// timeouts and interrupts, the forwarded event carries the tests that were still pending, and
    /// pending-test tracking starts over.
    ///
    /// Returns an error, without changing any state, if the event names an unregistered file.
    pub fn emit_state_change(&mut self, event: StateChangeEvent) -> Result<(), RunStatusError> {
        if let Some(test_file) = event.test_file()
            && !self.stats.by_file.contains_key(test_file)
        {
            return Err(RunStatusError::UnknownTestFile {
                test_file: test_file.to_owned(),
            });
        }

        let folded = self.fold(&event)?;

        if folded.stats_changed {
            let snapshot = Arc::new(self.stats.clone());
            self.listeners.broadcast(&RunStatusEvent::Stats(snapshot));
        }
        self.listeners
            .broadcast(&RunStatusEvent::StateChange(StateChange {
                event,
                pending_tests: folded.pending_tests,
            }));

        Ok(())
    }

    /// Folds every event that workers have already sent, without waiting for more.
    ///
    /// Returns the number of events folded. An event that names an unregistered file is dropped
    /// with a warning and the rest of the queue is still folded; the first such error is returned
    /// once the queue is empty.
    pub fn process_queued(&mut self) -> Result<usize, RunStatusError> {
        let mut count = 0;
        let mut first_error = None;
        while let Some(event) = self.inbound.try_recv() {
            if self.emit_queued(event, &mut first_error) {
                count += 1;
            }
        }
        first_error.map_or(Ok(count), Err)
    }

    /// Stops accepting new workers, then folds events until every registered worker has dropped its
    /// sender.
    pub async fn run(&mut self) -> Result<(), RunStatusError> {
        self.inbound.close_registration();
        debug!(
            files = self.stats.by_file.len(),
            listeners = self.listeners.len(),
            "running aggregator to completion"
        );
        let mut first_error = None;
        while let Some(event) = self.inbound.recv().await {
            self.emit_queued(event, &mut first_error);
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Folds one queued event, recording the first error instead of stopping.
    fn emit_queued(
        &mut self,
        event: StateChangeEvent,
        first_error: &mut Option<RunStatusError>,
    ) -> bool {
        let kind = event.kind().to_owned();
        match self.emit_state_change(event) {
            Ok(()) => true,
            Err(error) => {
                warn!(%kind, %error, "dropping event from worker");
                first_error.get_or_insert(error);
                false
            }
        }
    }

    /// Returns the live statistics.
    pub fn stats(&self) -> &GlobalStats {
        &self.stats
    }

    /// Returns an independent copy of the statistics.
    pub fn snapshot(&self) -> GlobalStats {
        self.stats.clone()
    }

    /// Returns the tests that are currently pending.
    pub fn pending_tests(&self) -> &PendingTests {
        &self.pending_tests
    }

    /// Returns true if this is a shard of a parallel run that was assigned no files.
    pub fn is_empty_parallel_run(&self) -> bool {
        self.empty_parallel_run
    }

    /// Returns the selection insights passed in at construction.
    pub fn selection_insights(&self) -> Option<&serde_json::Value> {
        self.selection_insights.as_ref()
    }

    /// Returns the files with at least one failed test, in registration order.
    pub fn failed_test_files(&self) -> Vec<&Utf8Path> {
        self.stats
            .by_file
            .iter()
            .filter(|(_, file_stats)| file_stats.failed_tests > 0)
            .map(|(test_file, _)| test_file.as_path())
            .collect()
    }

    fn fold(&mut self, event: &StateChangeEvent) -> Result<Folded, RunStatusError> {
        let stats = &mut self.stats;
        let mut pending_tests = None;

        match event {
            StateChangeEvent::DeclaredTest { test_file, .. } => {
                let file_stats = file_stats_mut(&mut stats.by_file, test_file)?;
                stats.declared_tests += 1;
                file_stats.declared_tests += 1;
            }
            StateChangeEvent::HookFailed { test_file, .. } => {
                let file_stats = file_stats_mut(&mut stats.by_file, test_file)?;
                stats.failed_hooks += 1;
                file_stats.failed_hooks += 1;
            }
            StateChangeEvent::InternalError { test_file, .. } => {
                // Internal errors may be run-wide, so only count them against a file if one is
                // named.
                if let Some(test_file) = test_file {
                    file_stats_mut(&mut stats.by_file, test_file)?.internal_errors += 1;
                }
                stats.internal_errors += 1;
            }
            StateChangeEvent::SelectedTest {
                test_file,
                title,
                skip,
                todo,
                ..
            } => {
                let file_stats = file_stats_mut(&mut stats.by_file, test_file)?;
                stats.selected_tests += 1;
                file_stats.selected_tests += 1;
                if *skip {
                    stats.skipped_tests += 1;
                    file_stats.skipped_tests += 1;
                } else if *todo {
                    stats.todo_tests += 1;
                    file_stats.todo_tests += 1;
                } else {
                    stats.remaining_tests += 1;
                    file_stats.remaining_tests += 1;
                    self.pending_tests.add(test_file, title);
                }
            }
            StateChangeEvent::SharedWorkerError { .. } => {
                stats.shared_worker_errors += 1;
            }
            StateChangeEvent::TestFailed {
                test_file, title, ..
            } => {
                let file_stats = file_stats_mut(&mut stats.by_file, test_file)?;
                stats.failed_tests += 1;
                file_stats.failed_tests += 1;
                resolve_remaining(
                    &mut stats.remaining_tests,
                    &mut file_stats.remaining_tests,
                    test_file,
                    title,
                );
                self.pending_tests.remove(test_file, title);
            }
            StateChangeEvent::TestPassed {
                test_file,
                title,
                known_failing,
                ..
            } => {
                let file_stats = file_stats_mut(&mut stats.by_file, test_file)?;
                if *known_failing {
                    stats.passed_known_failing_tests += 1;
                    file_stats.passed_known_failing_tests += 1;
                } else {
                    stats.passed_tests += 1;
                    file_stats.passed_tests += 1;
                }
                resolve_remaining(
                    &mut stats.remaining_tests,
                    &mut file_stats.remaining_tests,
                    test_file,
                    title,
                );
                self.pending_tests.remove(test_file, title);
            }
            StateChangeEvent::Timeout { period } => {
                stats.timeouts += 1;
                let detached = self.pending_tests.take();
                debug!(
                    ?period,
                    pending = detached.len(),
                    "timed out, detached pending tests"
                );
                pending_tests = Some(detached);
            }
            StateChangeEvent::Interrupt => {
                let detached = self.pending_tests.take();
                debug!(
                    pending = detached.len(),
                    "interrupted, detached pending tests"
                );
                pending_tests = Some(detached);
            }
            StateChangeEvent::UncaughtException { test_file, .. } => {
                let file_stats = file_stats_mut(&mut stats.by_file, test_file)?;
                stats.uncaught_exceptions += 1;
                file_stats.uncaught_exceptions += 1;
            }
            StateChangeEvent::UnhandledRejection { test_file, .. } => {
                let file_stats = file_stats_mut(&mut stats.by_file, test_file)?;
                stats.unhandled_rejections += 1;
                file_stats.unhandled_rejections += 1;
            }
            StateChangeEvent::WorkerFailed { .. } => {
                stats.failed_workers += 1;
            }
            StateChangeEvent::WorkerFinished { .. } => {
                stats.finished_workers += 1;
            }
            StateChangeEvent::WorkerStdout { .. }
            | StateChangeEvent::WorkerStderr { .. }
            | StateChangeEvent::Other { .. } => {
                return Ok(Folded {
                    stats_changed: false,
                    pending_tests: None,
                });
            }
        }

        Ok(Folded {
            stats_changed: true,
            pending_tests,
        })
    }
}

struct Folded {
    stats_changed: bool,
    pending_tests: Option<PendingTests>,
}

fn file_stats_mut<'a>(
    by_file: &'a mut IndexMap<Utf8PathBuf, FileStats>,
    test_file: &Utf8Path,
) -> Result<&'a mut FileStats, RunStatusError> {
    by_file
        .get_mut(test_file)
        .ok_or_else(|| RunStatusError::UnknownTestFile {
            test_file: test_file.to_owned(),
        })
}

/// Decrements the remaining test counts for a test that passed or failed.
///
/// Counts never go below zero: a result for a test that was never selected is logged and otherwise
/// ignored.
fn resolve_remaining(
    global: &mut usize,
    file: &mut usize,
    test_file: &Utf8Path,
    title: &str,
) {
    if *global == 0 || *file == 0 {
        warn!(%test_file, title, "result received for a test that was not pending");
    }
    *global = global.saturating_sub(1);
    *file = file.saturating_sub(1);
}
