//! Clone operation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crate::creds;
use crate::engine::EngineHandle;
use crate::ops::{OpKind, OperationHandle};
use crate::repo::{OpOutcome, Repository};
use crate::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct CloneOptions {
    pub bare: bool,
}

pub(crate) fn spawn_clone(
    repo: Arc<Repository>,
    url: String,
    destination: PathBuf,
    options: CloneOptions,
) -> OperationHandle {
    let op = repo.enqueue_operation(OpKind::Clone, format!("Cloning {url}"), true);
    let worker = op.clone();
    thread::spawn(move || {
        worker.set_running();
        let ssh_dir = repo.config().ssh_dir.clone();
        match run_clone(&worker, &url, &destination, options, ssh_dir) {
            Ok(cloned) => repo.finish_operation(
                &worker,
                OpOutcome::Success {
                    engine: Some(EngineHandle::from_repository(cloned)),
                },
            ),
            Err(err) => {
                tracing::warn!("clone of {url} failed: {err}");
                repo.finish_operation(&worker, OpOutcome::failure(err));
            }
        }
    });
    op
}

fn run_clone(
    op: &OperationHandle,
    url: &str,
    destination: &Path,
    options: CloneOptions,
    ssh_dir: Option<PathBuf>,
) -> Result<git2::Repository> {
    let mut callbacks = git2::RemoteCallbacks::new();
    // No repository exists yet, so the credential helper can only come
    // from the global configuration.
    callbacks.credentials(creds::credential_callback(
        ssh_dir,
        git2::Config::open_default().ok(),
    ));

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

    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fetch_options);
    if options.bare {
        builder.bare(true);
    }
    Ok(builder.clone(url, destination)?)
}
