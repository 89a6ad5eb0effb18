//! Repository change notifications.
//!
//! A repository fans events out to any number of subscribers over
//! crossbeam channels. Emission never blocks: subscribers whose receiver
//! is gone are dropped on the next emit.

use std::sync::{Arc, Mutex};

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::ops::OpKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryEvent {
    /// Lifecycle state changed, or a queued operation started shadowing it.
    StateChanged,
    /// Progress numbers or informational text moved.
    ProgressChanged,
    /// Repository content changed on disk; reread anything cached.
    RepositoryUpdated,
    /// An operation reached a terminal phase and left the queue.
    OperationDone { kind: OpKind, succeeded: bool },
}

#[derive(Clone, Default)]
pub(crate) struct EventHub {
    subscribers: Arc<Mutex<Vec<Sender<RepositoryEvent>>>>,
}

impl EventHub {
    pub(crate) fn subscribe(&self) -> Receiver<RepositoryEvent> {
        let (tx, rx) = unbounded();
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .push(tx);
        rx
    }

    pub(crate) fn emit(&self, event: RepositoryEvent) {
        let mut subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .len()
    }
}
