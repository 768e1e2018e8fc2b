// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use run_status::{ErrorInfo, ObservedWorker, StateChangeEvent, StateChangeSender};
use std::time::Duration;

/// A worker that hands its sender back to the test.
#[derive(Debug, Default)]
pub struct ChannelWorker {
    pub sender: Option<StateChangeSender>,
}

impl ChannelWorker {
    pub fn send(&self, event: StateChangeEvent) {
        self.sender
            .as_ref()
            .expect("worker was registered")
            .send(event)
            .expect("aggregator is alive");
    }
}

impl ObservedWorker for ChannelWorker {
    fn on_state_change(&mut self, sender: StateChangeSender) {
        self.sender = Some(sender);
    }
}

pub fn declared(test_file: &str, title: &str) -> StateChangeEvent {
    StateChangeEvent::DeclaredTest {
        test_file: test_file.into(),
        title: title.to_owned(),
        known_failing: false,
        todo: false,
    }
}

pub fn selected(test_file: &str, title: &str) -> StateChangeEvent {
    StateChangeEvent::SelectedTest {
        test_file: test_file.into(),
        title: title.to_owned(),
        known_failing: false,
        skip: false,
        todo: false,
    }
}

pub fn passed(test_file: &str, title: &str) -> StateChangeEvent {
    StateChangeEvent::TestPassed {
        test_file: test_file.into(),
        title: title.to_owned(),
        duration: Duration::from_millis(3),
        known_failing: false,
    }
}

pub fn failed(test_file: &str, title: &str) -> StateChangeEvent {
    StateChangeEvent::TestFailed {
        test_file: test_file.into(),
        title: title.to_owned(),
        err: ErrorInfo::new("expected true, got false"),
        duration: Duration::from_millis(3),
        known_failing: false,
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
