//! Working tree change watcher.
//!
//! Watches every directory under the working tree, `.git` included, each
//! registered non-recursively. After a burst of filesystem events goes
//! quiet the watch set is rebuilt from a fresh walk (directories appear
//! and vanish on branch switches) and one repository-updated notification
//! goes out for the whole burst.

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use walkdir::WalkDir;

use crate::events::{EventHub, RepositoryEvent};

enum WatchCmd {
    /// Watch this working tree, or stop watching when `None`.
    Rewatch(Option<PathBuf>),
    Shutdown,
}

pub(crate) struct ChangeWatcher {
    cmd_tx: Sender<WatchCmd>,
    handle: Option<JoinHandle<()>>,
}

impl ChangeWatcher {
    pub(crate) fn spawn(events: EventHub, debounce: Duration) -> Self {
        let (cmd_tx, cmd_rx) = unbounded();
        let handle = thread::spawn(move || watch_loop(cmd_rx, events, debounce));
        Self {
            cmd_tx,
            handle: Some(handle),
        }
    }

    pub(crate) fn rewatch(&self, root: Option<PathBuf>) {
        let _ = self.cmd_tx.send(WatchCmd::Rewatch(root));
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(WatchCmd::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn watch_loop(cmd_rx: Receiver<WatchCmd>, events: EventHub, debounce: Duration) {
    let (fs_tx, fs_rx) = unbounded::<notify::Event>();
    let mut watcher = match RecommendedWatcher::new(
        move |result: notify::Result<notify::Event>| match result {
            Ok(event) => {
                // Reads are noise; only content-shaped events count.
                if !matches!(event.kind, notify::EventKind::Access(_)) {
                    let _ = fs_tx.send(event);
                }
            }
            Err(err) => {
                tracing::debug!("watch backend error: {err}");
            }
        },
        notify::Config::default(),
    ) {
        Ok(watcher) => watcher,
        Err(err) => {
            tracing::warn!("filesystem watcher unavailable: {err}");
            // Still drain commands so rewatch calls never block or error.
            while let Ok(cmd) = cmd_rx.recv() {
                if matches!(cmd, WatchCmd::Shutdown) {
                    return;
                }
            }
            return;
        }
    };

    let mut watched: Vec<PathBuf> = Vec::new();
    let mut root: Option<PathBuf> = None;

    loop {
        crossbeam::channel::select! {
            recv(cmd_rx) -> cmd => match cmd {
                Ok(WatchCmd::Rewatch(next_root)) => {
                    root = next_root;
                    rebuild(&mut watcher, &mut watched, root.as_deref());
                }
                Ok(WatchCmd::Shutdown) | Err(_) => break,
            },
            recv(fs_rx) -> event => {
                if event.is_err() {
                    break;
                }
                drain_burst(&fs_rx, debounce);
                rebuild(&mut watcher, &mut watched, root.as_deref());
                events.emit(RepositoryEvent::RepositoryUpdated);
            }
        }
    }
}

/// Swallows follow-up events until the window passes, so a checkout that
/// touches a thousand files reports once.
fn drain_burst(fs_rx: &Receiver<notify::Event>, debounce: Duration) {
    let deadline = Instant::now() + debounce;
    loop {
        let now = Instant::now();
        let Some(left) = deadline.checked_duration_since(now) else {
            return;
        };
        match fs_rx.recv_timeout(left) {
            Ok(_) => continue,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

fn rebuild(watcher: &mut RecommendedWatcher, watched: &mut Vec<PathBuf>, root: Option<&Path>) {
    for path in watched.drain(..) {
        let _ = watcher.unwatch(&path);
    }
    let Some(root) = root else {
        return;
    };
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_dir() {
            continue;
        }
        match watcher.watch(entry.path(), RecursiveMode::NonRecursive) {
            Ok(()) => watched.push(entry.into_path()),
            Err(err) => {
                tracing::debug!("cannot watch {}: {err}", entry.path().display());
            }
        }
    }
    tracing::debug!("watching {} directories under {}", watched.len(), root.display());
}
