// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Aggregates the status of a test run.
//!
//! A run is made of several workers, each executing one test file independently. Every worker
//! produces a stream of [`StateChangeEvent`]s. The [`RunStatus`] aggregator folds all of these
//! streams, one event at a time, into a single set of run statistics, and decides the exit code for
//! the run.
//!
//! The flow is:
//!
//! 1. Create a [`RunStatus`] with the number of files in the run, and [subscribe] any listeners.
//! 2. Register each worker with [`RunStatus::observe_worker`]. The worker is handed a
//!    [`StateChangeSender`] to send its events through.
//! 3. Drive the aggregator with [`RunStatus::run`] (or [`RunStatus::process_queued`]). Listeners
//!    receive a statistics snapshot whenever the statistics change, followed by the event itself.
//! 4. Once the run is over, call [`RunStatus::suggest_exit_code`].
//!
//! [subscribe]: RunStatus::subscribe

mod aggregator;
mod config;
pub mod errors;
mod events;
mod exit_code;
mod listener;
mod pending;
mod worker;

pub use aggregator::*;
pub use config::*;
pub use events::*;
pub use exit_code::*;
pub use listener::RunStatusReceiver;
pub use pending::*;
pub use worker::{ObservedWorker, StateChangeSender};

pub use run_status_metadata::{FileStats, GlobalStats, ParallelRuns, RunStatusExitCode};
