// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracking for tests that are still running.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};

/// Tests that have been selected to run but haven't passed or failed yet, grouped by test file.
///
/// Files are kept in registration order, and titles within a file in the order their tests were
/// selected.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PendingTests {
    by_file: IndexMap<Utf8PathBuf, IndexSet<String>>,
}

impl PendingTests {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking pending tests for `test_file`, replacing any tests already tracked for it.
    pub(crate) fn register_file(&mut self, test_file: &Utf8Path) {
        self.by_file.insert(test_file.to_owned(), IndexSet::new());
    }

    /// Marks a test as pending. Does nothing if `test_file` isn't tracked.
    pub(crate) fn add(&mut self, test_file: &Utf8Path, title: &str) {
        if let Some(titles) = self.by_file.get_mut(test_file) {
            titles.insert(title.to_owned());
        }
    }

    /// Marks a test as no longer pending. Does nothing if the test isn't pending.
    pub(crate) fn remove(&mut self, test_file: &Utf8Path, title: &str) -> bool {
        self.by_file
            .get_mut(test_file)
            .is_some_and(|titles| titles.shift_remove(title))
    }

    /// Detaches the whole registry, leaving an empty one in its place.
    ///
    /// Files registered before the call are not tracked by the new registry.
    pub(crate) fn take(&mut self) -> PendingTests {
        std::mem::take(self)
    }

    /// Returns the pending tests for `test_file`, or `None` if the file isn't tracked.
    pub fn get(&self, test_file: &Utf8Path) -> Option<&IndexSet<String>> {
        self.by_file.get(test_file)
    }

    /// Returns true if `title` is pending in `test_file`.
    pub fn contains(&self, test_file: &Utf8Path, title: &str) -> bool {
        self.get(test_file).is_some_and(|titles| titles.contains(title))
    }

    /// Returns the total number of pending tests across all files.
    pub fn len(&self) -> usize {
        self.by_file.values().map(IndexSet::len).sum()
    }

    /// Returns true if no tests are pending.
    pub fn is_empty(&self) -> bool {
        self.by_file.values().all(IndexSet::is_empty)
    }

    /// Iterates over tracked files and their pending tests, including files with none pending.
    pub fn iter(&self) -> impl Iterator<Item = (&Utf8Path, &IndexSet<String>)> + '_ {
        self.by_file
            .iter()
            .map(|(test_file, titles)| (test_file.as_path(), titles))
    }
}
