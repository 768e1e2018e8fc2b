// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Machine-readable data produced by the run-status aggregator.
//!
//! The types in this crate describe the statistics of a test run as they are broadcast to
//! listeners: [`GlobalStats`] for the run as a whole and [`FileStats`] for each test file. They are
//! plain values, serializable as JSON, so that downstream consumers can store or forward them.
//!
//! This crate also documents the exit codes the aggregator suggests, in [`RunStatusExitCode`].

mod errors;
mod exit_codes;
mod stats;

pub use errors::*;
pub use exit_codes::*;
pub use stats::*;
