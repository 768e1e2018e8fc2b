// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for an aggregator.

use crate::errors::ConfigParseError;
use camino::Utf8Path;
use run_status_metadata::ParallelRuns;
use serde::Deserialize;

/// The inputs an aggregator is constructed from, as read from a TOML config.
///
/// ```toml
/// files = 12
///
/// [parallel-runs]
/// current-file-count = 4
/// total-runs = 3
///
/// [selection-insights]
/// filter = "login*"
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunStatusConfig {
    /// The total number of test files planned for the run.
    pub files: usize,

    /// This process's share of a parallel run, if the run is split.
    #[serde(default)]
    pub parallel_runs: Option<ParallelRuns>,

    /// Opaque data about how tests were selected, passed through to consumers.
    #[serde(default)]
    pub selection_insights: Option<serde_json::Value>,
}

impl RunStatusConfig {
    /// Parses a config from a TOML string.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigParseError> {
        let config: Self = toml::from_str(input).map_err(|err| ConfigParseError::Parse {
            config_file: None,
            err,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config from a TOML file.
    pub fn from_path(config_file: &Utf8Path) -> Result<Self, ConfigParseError> {
        let input =
            std::fs::read_to_string(config_file).map_err(|err| ConfigParseError::Read {
                config_file: config_file.to_owned(),
                err,
            })?;
        let config: Self = toml::from_str(&input).map_err(|err| ConfigParseError::Parse {
            config_file: Some(config_file.to_owned()),
            err,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigParseError> {
        if let Some(parallel_runs) = self.parallel_runs
            && parallel_runs.total_runs == 0
        {
            return Err(ConfigParseError::Invalid {
                message: "parallel-runs.total-runs must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}
