//! Checkout as a queued operation.
//!
//! Checkout is binary: it either lands or it does not, so the handle
//! reports no progress numbers and clients show an indeterminate state.

use std::sync::Arc;
use std::thread;

use crate::objects::Reference;
use crate::ops::{OpKind, OperationHandle};
use crate::repo::{checkout, OpOutcome, Repository};

pub(crate) fn spawn_checkout(repo: Arc<Repository>, reference: Reference) -> OperationHandle {
    let op = repo.enqueue_operation(
        OpKind::Checkout,
        format!("Checking out {}", reference.shorthand()),
        false,
    );
    let worker = op.clone();
    thread::spawn(move || {
        worker.set_running();
        let result = repo
            .engine()
            .and_then(|engine| checkout::perform(&engine, &reference));
        match result {
            Ok(()) => repo.finish_operation(&worker, OpOutcome::success()),
            Err(err) => {
                tracing::warn!("checkout of {} failed: {err}", reference.name());
                repo.finish_operation(&worker, OpOutcome::failure(err));
            }
        }
    });
    op
}
