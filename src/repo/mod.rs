//! Repository facade: lifecycle, reads, and operation scheduling.
//!
//! Provides:
//! - [`Repository`]: shared, thread-safe view of one repository
//! - lifecycle reporting that defers to the oldest queued operation
//! - factories for opening, creating, and cloning repositories
//!
//! A repository outlives its engine binding: a failed clone leaves a
//! `Repository` you can still query, subscribe to, and show in a window,
//! just in the `Invalid` state.

pub(crate) mod checkout;
mod watcher;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam::channel::Receiver;
use serde::Serialize;

use crate::config::{self, Config};
use crate::engine::{EngineCapability, EngineHandle};
use crate::events::{EventHub, RepositoryEvent};
use crate::objects::{Branch, Commit, Oid, Reference, StatusEntry, StatusFlags};
use crate::ops::{self, CloneOptions, OpKind, OpPhase, OperationHandle};
use crate::{Error, Result};

use watcher::ChangeWatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoState {
    /// No engine bound: nothing on disk answers for this repository.
    Invalid,
    /// A clone is materializing the repository.
    Cloning,
    /// Bound and quiescent.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchFilter {
    Local,
    Remote,
    #[default]
    All,
}

/// What a finished worker hands back to the repository. A successful
/// clone carries the engine for the new repository; everything else
/// leaves the binding alone.
pub(crate) enum OpOutcome {
    Success { engine: Option<EngineHandle> },
    Failure { error: String },
}

impl OpOutcome {
    pub(crate) fn success() -> Self {
        OpOutcome::Success { engine: None }
    }

    pub(crate) fn failure(error: impl std::fmt::Display) -> Self {
        OpOutcome::Failure {
            error: error.to_string(),
        }
    }
}

struct RepoInner {
    engine: Option<EngineHandle>,
    lifecycle: RepoState,
    operations: Vec<OperationHandle>,
}

/// One repository as a desktop client sees it.
///
/// All methods take `&self`; internal state sits behind one mutex and
/// every read hands back owned data, so handles can be shared freely
/// across UI and worker threads.
pub struct Repository {
    inner: Mutex<RepoInner>,
    events: EventHub,
    watcher: ChangeWatcher,
    config: Config,
}

impl Repository {
    // === Factories ===

    /// Opens the repository containing `path`, searching upward like git.
    pub fn open(path: &Path) -> Result<Arc<Self>> {
        Self::open_with_config(path, config::load())
    }

    pub fn open_with_config(path: &Path, config: Config) -> Result<Arc<Self>> {
        let engine = EngineHandle::open(path)?;
        Ok(Self::construct(Some(engine), RepoState::Idle, config))
    }

    /// Creates a new repository at `path` and opens it.
    pub fn init_at(path: &Path) -> Result<Arc<Self>> {
        let engine = EngineHandle::create(path)?;
        Ok(Self::construct(Some(engine), RepoState::Idle, config::load()))
    }

    /// Starts a background clone. The returned repository is alive
    /// immediately in the `Cloning` state; it binds to the clone result
    /// when the operation succeeds and drops to `Invalid` when it fails.
    pub fn clone_repository(
        url: &str,
        destination: &Path,
        options: CloneOptions,
    ) -> (Arc<Self>, OperationHandle) {
        Self::clone_repository_with_config(url, destination, options, config::load())
    }

    pub fn clone_repository_with_config(
        url: &str,
        destination: &Path,
        options: CloneOptions,
        config: Config,
    ) -> (Arc<Self>, OperationHandle) {
        let repo = Self::construct(None, RepoState::Cloning, config);
        let op = ops::spawn_clone(
            Arc::clone(&repo),
            url.to_string(),
            destination.to_path_buf(),
            options,
        );
        (repo, op)
    }

    fn construct(engine: Option<EngineHandle>, lifecycle: RepoState, config: Config) -> Arc<Self> {
        let events = EventHub::default();
        let watcher = ChangeWatcher::spawn(events.clone(), config.watch_debounce);
        let root = engine
            .as_ref()
            .and_then(|engine| engine.workdir().map(Path::to_path_buf));
        watcher.rewatch(root);
        Arc::new(Self {
            inner: Mutex::new(RepoInner {
                engine,
                lifecycle,
                operations: Vec::new(),
            }),
            events,
            watcher,
            config,
        })
    }

    // === Lifecycle and presentation ===

    /// `Cloning` while a clone is queued, otherwise the bound lifecycle.
    pub fn state(&self) -> RepoState {
        let inner = self.lock_inner();
        match inner.operations.first() {
            Some(op) if op.kind() == OpKind::Clone => RepoState::Cloning,
            _ => inner.lifecycle,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lock_inner().engine.is_some()
    }

    pub fn busy(&self) -> bool {
        !self.lock_inner().operations.is_empty()
    }

    /// Human text for the current state. While operations are queued this
    /// is the oldest operation's description.
    pub fn state_description(&self) -> String {
        let inner = self.lock_inner();
        if let Some(op) = inner.operations.first() {
            return op.description().to_string();
        }
        match inner.lifecycle {
            RepoState::Invalid => "No repository".to_string(),
            RepoState::Cloning => "Cloning".to_string(),
            RepoState::Idle => "Ready".to_string(),
        }
    }

    /// Transport chatter for the active operation, empty when quiescent.
    pub fn informational_text(&self) -> String {
        let inner = self.lock_inner();
        match inner.operations.first() {
            Some(op) => op.snapshot().informational_text,
            None => String::new(),
        }
    }

    /// `(done, total)` for the active operation, `None` when the
    /// operation cannot quantify its progress or nothing is running.
    pub fn progress(&self) -> Option<(u64, u64)> {
        let inner = self.lock_inner();
        let op = inner.operations.first()?;
        if !op.provides_progress() {
            return None;
        }
        op.snapshot().progress
    }

    pub fn operations(&self) -> Vec<OperationHandle> {
        self.lock_inner().operations.clone()
    }

    pub fn current_operation(&self) -> Option<OperationHandle> {
        self.lock_inner().operations.first().cloned()
    }

    /// Raw engine access for privileged collaborators (diff panes, blame
    /// views) that this crate does not model.
    pub fn engine_capability(&self) -> Result<EngineCapability> {
        Ok(EngineCapability::new(self.engine()?))
    }

    pub fn workdir(&self) -> Option<PathBuf> {
        self.lock_inner()
            .engine
            .as_ref()
            .and_then(|engine| engine.workdir().map(Path::to_path_buf))
    }

    pub fn git_dir(&self) -> Option<PathBuf> {
        self.lock_inner()
            .engine
            .as_ref()
            .map(|engine| engine.git_dir().to_path_buf())
    }

    /// Subscribes to change notifications. Every subscriber gets every
    /// event from subscription time on.
    pub fn subscribe(&self) -> Receiver<RepositoryEvent> {
        self.events.subscribe()
    }

    /// Recomputes lifecycle from the engine binding, re-registers watched
    /// directories, and notifies. Call after mutating the repository
    /// through the raw capability.
    pub fn reload_repository_state(&self) {
        {
            let mut inner = self.lock_inner();
            self.reload_locked(&mut inner);
        }
        self.events.emit(RepositoryEvent::StateChanged);
        self.events.emit(RepositoryEvent::RepositoryUpdated);
    }

    // === Reads ===

    /// The HEAD reference, `None` when HEAD is unborn or no repository
    /// is bound.
    pub fn head(&self) -> Result<Option<Reference>> {
        let Ok(engine) = self.engine() else {
            return Ok(None);
        };
        engine.with_repo(|repo| match repo.head() {
            Ok(head) => match head.name() {
                Some(name) => Ok(Some(Reference::wrap(&engine, name))),
                None => Ok(None),
            },
            Err(err)
                if matches!(
                    err.code(),
                    git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        })
    }

    /// Looks up a reference by full name, `None` when it does not exist
    /// or no repository is bound.
    pub fn reference(&self, name: &str) -> Result<Option<Reference>> {
        let Ok(engine) = self.engine() else {
            return Ok(None);
        };
        engine.with_repo(|repo| match repo.find_reference(name) {
            Ok(_) => Ok(Some(Reference::wrap(&engine, name))),
            Err(err) if err.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        })
    }

    pub fn branches(&self, filter: BranchFilter) -> Result<Vec<Branch>> {
        let engine = self.engine()?;
        let kind = match filter {
            BranchFilter::Local => Some(git2::BranchType::Local),
            BranchFilter::Remote => Some(git2::BranchType::Remote),
            BranchFilter::All => None,
        };
        engine.with_repo(|repo| {
            let mut branches = Vec::new();
            for entry in repo.branches(kind)? {
                let (branch, _) = entry?;
                // Skip refs that are not valid utf-8; the porcelain layer
                // has no way to present them.
                let Some(name) = branch.get().name() else {
                    continue;
                };
                if let Some(branch) = Reference::wrap(&engine, name).as_branch() {
                    branches.push(branch);
                }
            }
            Ok(branches)
        })
    }

    pub fn commit(&self, oid: Oid) -> Result<Commit> {
        let engine = self.engine()?;
        engine.with_repo(|repo| {
            let raw = repo.find_commit(oid)?;
            Ok(Commit::wrap(&engine, &raw))
        })
    }

    /// Status of every interesting path, index and working tree folded
    /// together. Untracked files are walked into, ignored files are not
    /// listed.
    pub fn file_statuses(&self) -> Result<Vec<StatusEntry>> {
        let engine = self.engine()?;
        engine.with_repo(|repo| {
            let mut options = git2::StatusOptions::new();
            options
                .show(git2::StatusShow::IndexAndWorkdir)
                .include_untracked(true)
                .recurse_untracked_dirs(true)
                .renames_head_to_index(true);
            let statuses = repo.statuses(Some(&mut options))?;
            let mut rows = Vec::with_capacity(statuses.len());
            for entry in statuses.iter() {
                let Some(path) = entry.path() else {
                    continue;
                };
                rows.push(StatusEntry {
                    path: PathBuf::from(path),
                    flags: StatusFlags::from_engine(entry.status()),
                });
            }
            Ok(rows)
        })
    }

    // === Mutations ===

    /// Switches HEAD to `reference`, updating the working tree first.
    ///
    /// Remote-tracking branches get a local branch created and tracking
    /// configured; see [`Error::LocalBranchExists`] for the collision
    /// case. On error HEAD is left where it was.
    pub fn set_head_and_checkout(&self, reference: &Reference) -> Result<()> {
        let engine = self.engine()?;
        checkout::perform(&engine, reference)?;
        self.reload_repository_state();
        Ok(())
    }

    /// Queues [`set_head_and_checkout`](Self::set_head_and_checkout) as a
    /// background operation.
    pub fn checkout_async(self: &Arc<Self>, reference: &Reference) -> OperationHandle {
        ops::spawn_checkout(Arc::clone(self), reference.clone())
    }

    /// Fetches from `remote` (the configured default when `None`) in the
    /// background.
    pub fn fetch(self: &Arc<Self>, remote: Option<&str>) -> Result<OperationHandle> {
        self.engine()?;
        let remote = remote.unwrap_or(&self.config.default_remote).to_string();
        Ok(ops::spawn_fetch(Arc::clone(self), remote))
    }

    /// Pushes `refspecs` (the current branch when empty) to `remote` in
    /// the background.
    pub fn push(
        self: &Arc<Self>,
        remote: Option<&str>,
        refspecs: Vec<String>,
    ) -> Result<OperationHandle> {
        self.engine()?;
        let remote = remote.unwrap_or(&self.config.default_remote).to_string();
        Ok(ops::spawn_push(Arc::clone(self), remote, refspecs))
    }

    // === Operation plumbing ===

    pub(crate) fn enqueue_operation(
        &self,
        kind: OpKind,
        description: String,
        provides_progress: bool,
    ) -> OperationHandle {
        let op = OperationHandle::new(kind, description, provides_progress, self.events.clone());
        {
            let mut inner = self.lock_inner();
            inner.operations.push(op.clone());
        }
        self.events.emit(RepositoryEvent::StateChanged);
        op
    }

    /// Retires `op` with `outcome`: marks it terminal, removes it from the
    /// queue, binds the engine it produced (if any), and reconciles state.
    /// The terminal transition happens inside the repository's critical
    /// section, so once `op` reads as finished every repository read
    /// already reflects the outcome. First caller wins; later calls are
    /// no-ops.
    pub(crate) fn finish_operation(&self, op: &OperationHandle, outcome: OpOutcome) {
        let (succeeded, phase, error) = match outcome {
            OpOutcome::Success { .. } => (true, OpPhase::Succeeded, None),
            OpOutcome::Failure { ref error } => (false, OpPhase::Failed, Some(error.clone())),
        };
        {
            let mut inner = self.lock_inner();
            if !op.mark_terminal(phase, error) {
                return;
            }
            if let OpOutcome::Success {
                engine: Some(engine),
            } = outcome
            {
                inner.engine = Some(engine);
            }
            inner.operations.retain(|held| !held.same_as(op));
            self.reload_locked(&mut inner);
        }
        self.events.emit(RepositoryEvent::StateChanged);
        self.events.emit(RepositoryEvent::ProgressChanged);
        self.events.emit(RepositoryEvent::RepositoryUpdated);
        self.events.emit(RepositoryEvent::OperationDone {
            kind: op.kind(),
            succeeded,
        });
        op.signal_done();
    }

    pub(crate) fn engine(&self) -> Result<EngineHandle> {
        self.lock_inner()
            .engine
            .clone()
            .ok_or_else(|| Error::Unspecified("no repository is bound".into()))
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    fn reload_locked(&self, inner: &mut RepoInner) {
        match &inner.engine {
            Some(engine) => {
                inner.lifecycle = RepoState::Idle;
                self.watcher
                    .rewatch(engine.workdir().map(Path::to_path_buf));
            }
            None => {
                inner.lifecycle = RepoState::Invalid;
                self.watcher.rewatch(None);
            }
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, RepoInner> {
        self.inner.lock().expect("repository lock poisoned")
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock_inner();
        f.debug_struct("Repository")
            .field("lifecycle", &inner.lifecycle)
            .field("operations", &inner.operations.len())
            .finish_non_exhaustive()
    }
}
