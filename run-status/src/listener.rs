// Copyright (c) The run-status Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound side of the aggregator: how listeners receive events.

use crate::events::RunStatusEvent;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

/// Receives events broadcast by a [`RunStatus`](crate::RunStatus).
///
/// Obtained through [`RunStatus::subscribe`](crate::RunStatus::subscribe). Dropping the receiver
/// unsubscribes it.
#[derive(Debug)]
pub struct RunStatusReceiver {
    rx: UnboundedReceiver<RunStatusEvent>,
}

impl RunStatusReceiver {
    /// Waits for the next event.
    ///
    /// Returns `None` once the aggregator has been dropped and all events have been received.
    pub async fn recv(&mut self) -> Option<RunStatusEvent> {
        self.rx.recv().await
    }

    /// Returns the next event if one is available, without waiting.
    pub fn try_recv(&mut self) -> Option<RunStatusEvent> {
        self.rx.try_recv().ok()
    }

    /// Returns all events that are available right now.
    pub fn drain(&mut self) -> Vec<RunStatusEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

#[derive(Debug, Default)]
pub(crate) struct Listeners {
    senders: Vec<UnboundedSender<RunStatusEvent>>,
}

impl Listeners {
    pub(crate) fn subscribe(&mut self) -> RunStatusReceiver {
        let (tx, rx) = unbounded_channel();
        self.senders.push(tx);
        RunStatusReceiver { rx }
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }

    /// Sends `event` to every listener, pruning listeners that have gone away.
    pub(crate) fn broadcast(&mut self, event: &RunStatusEvent) {
        let before = self.senders.len();
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
        let pruned = before - self.senders.len();
        if pruned > 0 {
            debug!(pruned, remaining = self.senders.len(), "pruned closed listeners");
        }
    }
}
