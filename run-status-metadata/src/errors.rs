// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by this crate.

use std::{borrow::Cow, error, fmt};

/// An error that occurs while parsing a [`ParallelRuns`](crate::ParallelRuns) from a string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParallelRunsParseError {
    message: Cow<'static, str>,
}

impl ParallelRunsParseError {
    pub(crate) fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParallelRunsParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid parallel runs: {}", self.message)
    }
}

impl error::Error for ParallelRunsParseError {}
