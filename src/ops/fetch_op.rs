//! Fetch operation.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crate::creds;
use crate::ops::{OpKind, OperationHandle};
use crate::repo::{OpOutcome, Repository};
use crate::Result;

pub(crate) fn spawn_fetch(repo: Arc<Repository>, remote: String) -> OperationHandle {
    let op = repo.enqueue_operation(OpKind::Fetch, format!("Fetching {remote}"), true);
    let worker = op.clone();
    thread::spawn(move || {
        worker.set_running();
        // The worker opens its own repository handle: transfers can take
        // minutes and must not hold the engine lock that interactive
        // reads go through.
        let result = repo
            .engine()
            .map(|engine| engine.git_dir().to_path_buf())
            .and_then(|git_dir| {
                run_fetch(&worker, git_dir, &remote, repo.config().ssh_dir.clone())
            });
        match result {
            Ok(()) => repo.finish_operation(&worker, OpOutcome::success()),
            Err(err) => {
                tracing::warn!("fetch from {remote} failed: {err}");
                repo.finish_operation(&worker, OpOutcome::failure(err));
            }
        }
    });
    op
}

fn run_fetch(
    op: &OperationHandle,
    git_dir: PathBuf,
    remote_name: &str,
    ssh_dir: Option<PathBuf>,
) -> Result<()> {
    let git_repo = git2::Repository::open(&git_dir)?;
    let mut remote = git_repo.find_remote(remote_name)?;

    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(creds::credential_callback(ssh_dir, git_repo.config().ok()));

    let transfer_op = op.clone();
    callbacks.transfer_progress(move |stats| {
        transfer_op.set_transfer(
            stats.received_objects() as u64,
            stats.total_objects() as u64,
            stats.received_bytes() as u64,
        );
        true
    });

    let sideband_op = op.clone();
    callbacks.sideband_progress(move |line| {
        if let Ok(text) = std::str::from_utf8(line) {
            sideband_op.set_informational_text(text.trim_end());
        }
        true
    });

    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);

    // Empty refspec list means the remote's configured refspecs.
    remote.fetch(&[] as &[&str], Some(&mut fetch_options), None)?;
    Ok(())
}
