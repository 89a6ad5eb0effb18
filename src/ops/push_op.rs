//! Push operation.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crate::creds;
use crate::ops::{OpKind, OperationHandle};
use crate::repo::{OpOutcome, Repository};
use crate::{Error, Result};

pub(crate) fn spawn_push(
    repo: Arc<Repository>,
    remote: String,
    refspecs: Vec<String>,
) -> OperationHandle {
    let op = repo.enqueue_operation(OpKind::Push, format!("Pushing to {remote}"), true);
    let worker = op.clone();
    thread::spawn(move || {
        worker.set_running();
        let result = repo
            .engine()
            .map(|engine| engine.git_dir().to_path_buf())
            .and_then(|git_dir| {
                run_push(
                    &worker,
                    git_dir,
                    &remote,
                    refspecs,
                    repo.config().ssh_dir.clone(),
                )
            });
        match result {
            Ok(()) => repo.finish_operation(&worker, OpOutcome::success()),
            Err(err) => {
                tracing::warn!("push to {remote} failed: {err}");
                repo.finish_operation(&worker, OpOutcome::failure(err));
            }
        }
    });
    op
}

fn run_push(
    op: &OperationHandle,
    git_dir: PathBuf,
    remote_name: &str,
    refspecs: Vec<String>,
    ssh_dir: Option<PathBuf>,
) -> Result<()> {
    let git_repo = git2::Repository::open(&git_dir)?;
    let mut remote = git_repo.find_remote(remote_name)?;

    let refspecs = if refspecs.is_empty() {
        vec![head_refspec(&git_repo)?]
    } else {
        refspecs
    };

    // The ref status callback fires per ref while the transport still
    // borrows the callbacks, so rejections land in a cell and are read
    // back once everything is dropped.
    let push_error: RefCell<Option<String>> = RefCell::new(None);
    let push_result = {
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(creds::credential_callback(ssh_dir, git_repo.config().ok()));
        callbacks.push_update_reference(|refname, status| {
            if let Some(msg) = status {
                *push_error.borrow_mut() = Some(format!("{refname}: {msg}"));
            }
            Ok(())
        });

        let transfer_op = op.clone();
        callbacks.push_transfer_progress(move |current, total, _bytes| {
            transfer_op.set_progress(current as u64, total as u64);
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);
        remote.push(&refspecs, Some(&mut push_options))
    };
    push_result?;

    if let Some(rejected) = push_error.into_inner() {
        return Err(Error::Unspecified(format!("push rejected: {rejected}")));
    }
    Ok(())
}

/// Refspec for the current branch when the caller named none.
fn head_refspec(git_repo: &git2::Repository) -> Result<String> {
    let head = git_repo.head()?;
    if !head.is_branch() {
        return Err(Error::Unspecified(
            "cannot push: HEAD is not on a branch".into(),
        ));
    }
    match head.name() {
        Some(name) => Ok(format!("{name}:{name}")),
        None => Err(Error::Unspecified(
            "cannot push: HEAD name is not valid utf-8".into(),
        )),
    }
}
