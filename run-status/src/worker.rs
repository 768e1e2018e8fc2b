// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound side of the aggregator: how workers deliver events.

use crate::{errors::StateChangeSendError, events::StateChangeEvent};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// A worker whose state changes can be observed by the aggregator.
///
/// When a worker is registered through
/// [`RunStatus::observe_worker`](crate::RunStatus::observe_worker), it is handed a
/// [`StateChangeSender`]. The worker should send every event it produces through it, from whichever
/// thread or task it runs on, and drop it once it is done.
pub trait ObservedWorker {
    /// Called once, at registration, with the sender for this worker's events.
    fn on_state_change(&mut self, sender: StateChangeSender);
}

/// Delivers events from a worker to the aggregator.
///
/// Senders are cheap to clone and may be moved across threads. Events from all senders are queued
/// in the order they're sent, and folded in that order.
#[derive(Clone, Debug)]
pub struct StateChangeSender {
    tx: UnboundedSender<StateChangeEvent>,
}

impl StateChangeSender {
    /// Sends an event to the aggregator.
    ///
    /// Returns an error containing the event if the aggregator has been dropped.
    pub fn send(&self, event: StateChangeEvent) -> Result<(), StateChangeSendError> {
        self.tx
            .send(event)
            .map_err(|err| StateChangeSendError::new(err.0))
    }
}

/// The aggregator's end of the inbound channel.
#[derive(Debug)]
pub(crate) struct Inbound {
    // Set to None once registration is closed, so that the channel closes when the last worker
    // drops its sender.
    tx: Option<UnboundedSender<StateChangeEvent>>,
    rx: UnboundedReceiver<StateChangeEvent>,
}

impl Inbound {
    pub(crate) fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self { tx: Some(tx), rx }
    }

    /// Returns a new sender, or `None` if registration is closed.
    pub(crate) fn sender(&self) -> Option<StateChangeSender> {
        self.tx
            .as_ref()
            .map(|tx| StateChangeSender { tx: tx.clone() })
    }

    pub(crate) fn close_registration(&mut self) {
        self.tx = None;
    }

    /// Returns the next queued event without waiting.
    pub(crate) fn try_recv(&mut self) -> Option<StateChangeEvent> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next event. Returns `None` once registration is closed and every sender has
    /// been dropped.
    pub(crate) async fn recv(&mut self) -> Option<StateChangeEvent> {
        self.rx.recv().await
    }
}
