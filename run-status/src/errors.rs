// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the run-status aggregator.

use crate::events::StateChangeEvent;
use camino::Utf8PathBuf;
use thiserror::Error;

/// An error returned by [`RunStatus`](crate::RunStatus) when a caller breaks its contract.
///
/// Failed tests, hooks and workers are not errors: they are counted and feed into the suggested exit
/// code.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum RunStatusError {
    /// An event referenced a test file that was never registered with
    /// [`observe_worker`](crate::RunStatus::observe_worker).
    #[error("event references unregistered test file `{test_file}`")]
    UnknownTestFile {
        /// The unregistered test file.
        test_file: Utf8PathBuf,
    },

    /// A worker was registered for a test file that already has one.
    #[error("test file `{test_file}` is already registered")]
    DuplicateTestFile {
        /// The test file that was registered twice.
        test_file: Utf8PathBuf,
    },

    /// A worker was registered after the aggregator stopped accepting registrations.
    #[error("worker registration is closed: the aggregator is already running to completion")]
    RegistrationClosed,
}

/// An error returned by [`StateChangeSender::send`](crate::StateChangeSender::send) if the
/// aggregator is gone.
///
/// The event that could not be delivered is returned back.
#[derive(Debug, Error)]
#[error("failed to deliver `{}` event: the aggregator has been dropped", .event.kind())]
pub struct StateChangeSendError {
    event: StateChangeEvent,
}

impl StateChangeSendError {
    pub(crate) fn new(event: StateChangeEvent) -> Self {
        Self { event }
    }

    /// Returns the event that could not be delivered.
    pub fn into_event(self) -> StateChangeEvent {
        self.event
    }
}

/// An error that occurred while reading or parsing a run-status config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseError {
    /// The config file could not be read.
    #[error("failed to read run-status config at `{config_file}`")]
    Read {
        /// The config file.
        config_file: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// The config was not valid TOML, or did not have the expected shape.
    #[error(
        "failed to parse run-status config{}",
        .config_file.as_ref().map_or_else(String::new, |file| format!(" at `{file}`"))
    )]
    Parse {
        /// The config file, if the config was read from one.
        config_file: Option<Utf8PathBuf>,

        /// The underlying error.
        #[source]
        err: toml::de::Error,
    },

    /// The config parsed, but a value in it is out of range.
    #[error("invalid run-status config: {message}")]
    Invalid {
        /// A description of the problem.
        message: String,
    },
}
