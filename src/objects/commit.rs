//! Commit snapshots.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use git2::Oid;

use crate::engine::EngineHandle;
use crate::Result;

/// Immutable view of one commit.
///
/// Commits never change once written, so everything here is snapshotted at
/// wrap time. Parent commits are materialized lazily and come out of the
/// same cache, so walking history twice yields pointer-equal objects.
#[derive(Clone)]
pub struct Commit {
    engine: EngineHandle,
    data: Arc<CommitData>,
}

pub(crate) struct CommitData {
    oid: Oid,
    short: String,
    summary: Option<String>,
    message: Option<String>,
    author_name: Option<String>,
    author_email: Option<String>,
    seconds_since_epoch: i64,
    parent_ids: Vec<Oid>,
}

impl CommitData {
    fn extract(raw: &git2::Commit<'_>) -> Self {
        let author = raw.author();
        Self {
            oid: raw.id(),
            short: short_id(raw),
            summary: raw.summary().map(str::to_owned),
            message: raw.message().map(str::to_owned),
            author_name: author.name().map(str::to_owned),
            author_email: author.email().map(str::to_owned),
            seconds_since_epoch: raw.time().seconds(),
            parent_ids: raw.parent_ids().collect(),
        }
    }

    #[cfg(test)]
    pub(crate) fn synthetic(oid: Oid) -> Self {
        Self {
            oid,
            short: oid.to_string()[..7].to_string(),
            summary: None,
            message: None,
            author_name: None,
            author_email: None,
            seconds_since_epoch: 0,
            parent_ids: Vec::new(),
        }
    }
}

fn short_id(raw: &git2::Commit<'_>) -> String {
    raw.as_object()
        .short_id()
        .ok()
        .and_then(|buf| buf.as_str().map(str::to_owned))
        .unwrap_or_else(|| raw.id().to_string()[..7].to_string())
}

impl Commit {
    pub(crate) fn wrap(engine: &EngineHandle, raw: &git2::Commit<'_>) -> Self {
        let data = engine.cache().commit(raw.id(), || CommitData::extract(raw));
        Self {
            engine: engine.clone(),
            data,
        }
    }

    pub fn id(&self) -> Oid {
        self.data.oid
    }

    /// Abbreviated hash as the object database disambiguates it.
    pub fn short_id(&self) -> &str {
        &self.data.short
    }

    /// First line of the message.
    pub fn summary(&self) -> Option<&str> {
        self.data.summary.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.data.message.as_deref()
    }

    pub fn author_name(&self) -> Option<&str> {
        self.data.author_name.as_deref()
    }

    pub fn author_email(&self) -> Option<&str> {
        self.data.author_email.as_deref()
    }

    pub fn seconds_since_epoch(&self) -> i64 {
        self.data.seconds_since_epoch
    }

    pub fn parent_count(&self) -> usize {
        self.data.parent_ids.len()
    }

    pub fn parent_ids(&self) -> &[Oid] {
        &self.data.parent_ids
    }

    /// True when both handles share one cached snapshot. Lookups of the
    /// same oid through the same repository always do.
    pub fn same_as(&self, other: &Commit) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Resolves parents through the engine. Each parent goes through the
    /// cache, so repeated walks share allocations.
    pub fn parents(&self) -> Result<Vec<Commit>> {
        self.engine.with_repo(|repo| {
            self.data
                .parent_ids
                .iter()
                .map(|oid| {
                    let raw = repo.find_commit(*oid)?;
                    Ok(Commit::wrap(&self.engine, &raw))
                })
                .collect()
        })
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
            || (self.data.oid == other.data.oid && self.engine.same_engine(&other.engine))
    }
}

impl Eq for Commit {}

impl Hash for Commit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.oid.hash(state);
    }
}

impl fmt::Debug for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commit")
            .field("id", &self.data.oid)
            .field("summary", &self.data.summary)
            .finish_non_exhaustive()
    }
}
