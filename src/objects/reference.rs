//! Reference views.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use git2::Oid;

use crate::engine::EngineHandle;
use crate::objects::{Branch, Commit};
use crate::Result;

const HEADS_PREFIX: &str = "refs/heads/";
const REMOTES_PREFIX: &str = "refs/remotes/";
const TAGS_PREFIX: &str = "refs/tags/";

/// A named pointer into the repository.
///
/// Unlike commits, references move. The only thing held here is the name;
/// `target` and `peel_to_commit` hit the engine every time, so an external
/// `git` invocation that moves the ref is visible on the next call.
#[derive(Clone)]
pub struct Reference {
    engine: EngineHandle,
    data: Arc<ReferenceData>,
}

pub(crate) struct ReferenceData {
    name: String,
}

impl Reference {
    pub(crate) fn wrap(engine: &EngineHandle, name: &str) -> Self {
        let data = engine.cache().reference(name, || ReferenceData {
            name: name.to_string(),
        });
        Self {
            engine: engine.clone(),
            data,
        }
    }

    /// Full reference name, e.g. `refs/heads/main`.
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Human-facing name: `main`, `origin/feature`, `v1.0`.
    pub fn shorthand(&self) -> &str {
        let name = self.name();
        name.strip_prefix(HEADS_PREFIX)
            .or_else(|| name.strip_prefix(REMOTES_PREFIX))
            .or_else(|| name.strip_prefix(TAGS_PREFIX))
            .unwrap_or(name)
    }

    pub fn is_local_branch(&self) -> bool {
        self.name().starts_with(HEADS_PREFIX)
    }

    pub fn is_remote_branch(&self) -> bool {
        self.name().starts_with(REMOTES_PREFIX)
    }

    pub fn is_tag(&self) -> bool {
        self.name().starts_with(TAGS_PREFIX)
    }

    /// Branch view when this ref lives under `refs/heads/` or
    /// `refs/remotes/`.
    pub fn as_branch(&self) -> Option<Branch> {
        Branch::from_reference(self.clone())
    }

    /// Fresh lookup of the object this ref points at, following symbolic
    /// refs. `None` when the ref is gone or points at an unborn branch.
    pub fn target(&self) -> Result<Option<Oid>> {
        self.engine.with_repo(|repo| {
            let raw = match repo.find_reference(self.name()) {
                Ok(raw) => raw,
                Err(err) if err.code() == git2::ErrorCode::NotFound => return Ok(None),
                Err(err) => return Err(err.into()),
            };
            match raw.resolve() {
                Ok(direct) => Ok(direct.target()),
                Err(err) if err.code() == git2::ErrorCode::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        })
    }

    /// Fresh lookup of the commit this ref ultimately points at.
    pub fn peel_to_commit(&self) -> Result<Commit> {
        self.engine.with_repo(|repo| {
            let raw = repo.find_reference(self.name())?;
            let commit = raw.peel_to_commit()?;
            Ok(Commit::wrap(&self.engine, &commit))
        })
    }

    /// True when both handles share one cached name entry.
    pub fn same_as(&self, other: &Reference) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// The ref still resolves to something in the repository.
    pub fn exists(&self) -> Result<bool> {
        self.engine.with_repo(|repo| {
            match repo.find_reference(self.name()) {
                Ok(_) => Ok(true),
                Err(err) if err.code() == git2::ErrorCode::NotFound => Ok(false),
                Err(err) => Err(err.into()),
            }
        })
    }

    pub(crate) fn engine(&self) -> &EngineHandle {
        &self.engine
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
            || (self.data.name == other.data.name && self.engine.same_engine(&other.engine))
    }
}

impl Eq for Reference {}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.name.hash(state);
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("name", &self.data.name)
            .finish_non_exhaustive()
    }
}
