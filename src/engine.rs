//! Shared handle to the underlying git engine.
//!
//! `git2::Repository` is `Send` but not `Sync`, so every touch of the raw
//! repository goes through a mutex owned by the handle. Clones of the
//! handle share one repository and one object cache; handle identity is
//! what makes cached objects comparable by pointer.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::objects::ObjectCache;
use crate::{Error, Result};

#[derive(Clone)]
pub(crate) struct EngineHandle {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    repo: Mutex<git2::Repository>,
    cache: ObjectCache,
    // Fixed for the life of the handle, snapshotted so accessors skip the lock.
    git_dir: PathBuf,
    workdir: Option<PathBuf>,
}

impl EngineHandle {
    /// Opens the repository containing `path`, walking parent directories
    /// the way `git` itself does.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        match git2::Repository::discover(path) {
            Ok(repo) => Ok(Self::from_repository(repo)),
            Err(err) if err.code() == git2::ErrorCode::NotFound => {
                Err(Error::NotARepository(path.to_path_buf()))
            }
            Err(err) => Err(Error::Engine(err)),
        }
    }

    /// Creates a fresh repository at `path`.
    pub(crate) fn create(path: &Path) -> Result<Self> {
        let repo = git2::Repository::init(path)?;
        Ok(Self::from_repository(repo))
    }

    pub(crate) fn from_repository(repo: git2::Repository) -> Self {
        let git_dir = repo.path().to_path_buf();
        let workdir = repo.workdir().map(Path::to_path_buf);
        Self {
            inner: Arc::new(EngineInner {
                repo: Mutex::new(repo),
                cache: ObjectCache::default(),
                git_dir,
                workdir,
            }),
        }
    }

    pub(crate) fn git_dir(&self) -> &Path {
        &self.inner.git_dir
    }

    /// `None` for bare repositories.
    pub(crate) fn workdir(&self) -> Option<&Path> {
        self.inner.workdir.as_deref()
    }

    pub(crate) fn cache(&self) -> &ObjectCache {
        &self.inner.cache
    }

    /// Two handles are the same engine iff they share the inner allocation.
    pub(crate) fn same_engine(&self, other: &EngineHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn repo(&self) -> MutexGuard<'_, git2::Repository> {
        self.inner.repo.lock().expect("engine lock poisoned")
    }

    /// Runs `f` with the raw repository while holding the engine lock.
    ///
    /// Keep closures short: the lock serializes every reader and writer,
    /// including checkout.
    pub(crate) fn with_repo<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&git2::Repository) -> Result<T>,
    {
        let repo = self.repo();
        f(&repo)
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("git_dir", &self.inner.git_dir)
            .finish_non_exhaustive()
    }
}

/// Grants raw engine access to collaborators that genuinely need it, such
/// as diff or blame views layered on top of this crate.
///
/// The closure still runs under the engine lock, so the raw repository can
/// never race the repository's own operations.
#[derive(Clone, Debug)]
pub struct EngineCapability {
    handle: EngineHandle,
}

impl EngineCapability {
    pub(crate) fn new(handle: EngineHandle) -> Self {
        Self { handle }
    }

    pub fn with_raw<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&git2::Repository) -> std::result::Result<T, git2::Error>,
    {
        self.handle.with_repo(|repo| f(repo).map_err(Error::Engine))
    }
}
