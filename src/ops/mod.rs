//! Long-running repository operations.
//!
//! Operations run on their own worker thread. While at least one is
//! queued on a repository, the repository's reported state, description
//! and progress come from the operation at the front of the queue.
//!
//! Lifecycle: `Queued` -> `Running` -> `Succeeded` | `Failed`. Terminal
//! transitions fire exactly once; the repository removes the operation
//! and reconciles its own state before anyone hears about completion.

mod checkout_op;
mod clone_op;
mod fetch_op;
mod push_op;

pub use clone_op::CloneOptions;

pub(crate) use checkout_op::spawn_checkout;
pub(crate) use clone_op::spawn_clone;
pub(crate) use fetch_op::spawn_fetch;
pub(crate) use push_op::spawn_push;

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use serde::Serialize;

use crate::events::{EventHub, RepositoryEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Clone,
    Checkout,
    Fetch,
    Push,
}

impl OpKind {
    pub fn verb(self) -> &'static str {
        match self {
            OpKind::Clone => "clone",
            OpKind::Checkout => "checkout",
            OpKind::Fetch => "fetch",
            OpKind::Push => "push",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpPhase {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl OpPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, OpPhase::Succeeded | OpPhase::Failed)
    }
}

/// Atomic view of an operation, taken under its lock.
#[derive(Debug, Clone, Serialize)]
pub struct OpSnapshot {
    pub kind: OpKind,
    pub phase: OpPhase,
    pub description: String,
    pub informational_text: String,
    /// `(done, total)` object counts when the transport reports them.
    pub progress: Option<(u64, u64)>,
    pub received_bytes: u64,
    pub error: Option<String>,
    pub provides_progress: bool,
}

struct OpState {
    phase: OpPhase,
    informational_text: String,
    progress: Option<(u64, u64)>,
    received_bytes: u64,
    error: Option<String>,
}

struct OpShared {
    kind: OpKind,
    description: String,
    provides_progress: bool,
    events: EventHub,
    state: Mutex<OpState>,
    done: Condvar,
}

/// Shared handle to one operation. Cloning is cheap; all clones observe
/// the same state.
#[derive(Clone)]
pub struct OperationHandle {
    shared: Arc<OpShared>,
}

impl OperationHandle {
    pub(crate) fn new(
        kind: OpKind,
        description: String,
        provides_progress: bool,
        events: EventHub,
    ) -> Self {
        Self {
            shared: Arc::new(OpShared {
                kind,
                description,
                provides_progress,
                events,
                state: Mutex::new(OpState {
                    phase: OpPhase::Queued,
                    informational_text: String::new(),
                    progress: None,
                    received_bytes: 0,
                    error: None,
                }),
                done: Condvar::new(),
            }),
        }
    }

    pub fn kind(&self) -> OpKind {
        self.shared.kind
    }

    pub fn description(&self) -> &str {
        &self.shared.description
    }

    /// False for operations that are inherently binary, like checkout:
    /// clients should show an indeterminate spinner instead of a bar.
    pub fn provides_progress(&self) -> bool {
        self.shared.provides_progress
    }

    pub fn phase(&self) -> OpPhase {
        self.lock().phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase().is_terminal()
    }

    pub fn snapshot(&self) -> OpSnapshot {
        let state = self.lock();
        OpSnapshot {
            kind: self.shared.kind,
            phase: state.phase,
            description: self.shared.description.clone(),
            informational_text: state.informational_text.clone(),
            progress: state.progress,
            received_bytes: state.received_bytes,
            error: state.error.clone(),
            provides_progress: self.shared.provides_progress,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Blocks until the operation reaches a terminal phase.
    pub fn wait(&self) -> OpPhase {
        let mut state = self.lock();
        while !state.phase.is_terminal() {
            state = self
                .shared
                .done
                .wait(state)
                .expect("operation lock poisoned");
        }
        state.phase
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<OpPhase> {
        let deadline = std::time::Instant::now() + timeout;
        let mut state = self.lock();
        while !state.phase.is_terminal() {
            let now = std::time::Instant::now();
            let left = deadline.checked_duration_since(now)?;
            let (next, result) = self
                .shared
                .done
                .wait_timeout(state, left)
                .expect("operation lock poisoned");
            state = next;
            if result.timed_out() && !state.phase.is_terminal() {
                return None;
            }
        }
        Some(state.phase)
    }

    pub(crate) fn set_running(&self) {
        {
            let mut state = self.lock();
            if state.phase != OpPhase::Queued {
                return;
            }
            state.phase = OpPhase::Running;
        }
        self.shared.events.emit(RepositoryEvent::StateChanged);
    }

    pub(crate) fn set_informational_text(&self, text: &str) {
        {
            let mut state = self.lock();
            if state.phase.is_terminal() || state.informational_text == text {
                return;
            }
            state.informational_text = text.to_string();
        }
        self.shared.events.emit(RepositoryEvent::ProgressChanged);
    }

    pub(crate) fn set_transfer(&self, done: u64, total: u64, bytes: u64) {
        {
            let mut state = self.lock();
            if state.phase.is_terminal() {
                return;
            }
            state.progress = Some((done, total));
            state.received_bytes = bytes;
        }
        self.shared.events.emit(RepositoryEvent::ProgressChanged);
    }

    pub(crate) fn set_progress(&self, done: u64, total: u64) {
        {
            let mut state = self.lock();
            if state.phase.is_terminal() {
                return;
            }
            state.progress = Some((done, total));
        }
        self.shared.events.emit(RepositoryEvent::ProgressChanged);
    }

    /// First terminal transition wins and returns true; every later call
    /// is a no-op. Deliberately does not wake waiters: the repository
    /// marks the operation inside its own critical section and calls
    /// [`signal_done`](Self::signal_done) once its state is consistent.
    pub(crate) fn mark_terminal(&self, phase: OpPhase, error: Option<String>) -> bool {
        debug_assert!(phase.is_terminal());
        let mut state = self.lock();
        if state.phase.is_terminal() {
            return false;
        }
        state.phase = phase;
        state.error = error;
        true
    }

    pub(crate) fn signal_done(&self) {
        self.shared.done.notify_all();
    }

    pub(crate) fn same_as(&self, other: &OperationHandle) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OpState> {
        self.shared.state.lock().expect("operation lock poisoned")
    }
}

impl std::fmt::Debug for OperationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationHandle")
            .field("kind", &self.shared.kind)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
