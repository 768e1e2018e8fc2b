// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes suggested by the run-status aggregator.
///
/// The aggregator only ever distinguishes between a clean run and a failed one. The reasons behind
/// a failure are available through the aggregator's final status, not through distinct codes.
pub enum RunStatusExitCode {}

impl RunStatusExitCode {
    /// The run completed and nothing in it is considered a failure.
    ///
    /// This is also suggested for a parallel run shard that was assigned no test files.
    pub const OK: i32 = 0;

    /// The run failed: a test, hook or worker failed, a timeout or uncaught error occurred, no tests
    /// were declared, or a selection filter matched nothing.
    pub const FAILED: i32 = 1;
}
