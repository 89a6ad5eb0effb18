//! Branch views over references.

use std::fmt;

use crate::objects::Reference;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Local,
    Remote,
}

/// A reference known to live under `refs/heads/` or `refs/remotes/`.
///
/// Remote branch names keep git's `remote/branch` shorthand, and
/// `local_name` is the piece a checkout would create locally.
#[derive(Clone, PartialEq, Eq)]
pub struct Branch {
    reference: Reference,
    kind: BranchKind,
}

impl Branch {
    pub(crate) fn from_reference(reference: Reference) -> Option<Self> {
        let kind = if reference.is_local_branch() {
            BranchKind::Local
        } else if reference.is_remote_branch() {
            BranchKind::Remote
        } else {
            return None;
        };
        Some(Self { reference, kind })
    }

    pub fn kind(&self) -> BranchKind {
        self.kind
    }

    pub fn is_local(&self) -> bool {
        self.kind == BranchKind::Local
    }

    pub fn is_remote(&self) -> bool {
        self.kind == BranchKind::Remote
    }

    /// `main` for local branches, `origin/feature` for remote ones.
    pub fn name(&self) -> &str {
        self.reference.shorthand()
    }

    /// The branch name without its remote: `origin/feature` -> `feature`.
    ///
    /// Remote names cannot contain `/`, so splitting at the first slash is
    /// exact. Local branches come back unchanged.
    pub fn local_name(&self) -> &str {
        match self.kind {
            BranchKind::Local => self.name(),
            BranchKind::Remote => self
                .name()
                .split_once('/')
                .map(|(_, rest)| rest)
                .unwrap_or_else(|| self.name()),
        }
    }

    /// Remote this branch belongs to, `None` for local branches.
    pub fn remote_name(&self) -> Option<&str> {
        match self.kind {
            BranchKind::Local => None,
            BranchKind::Remote => self.name().split_once('/').map(|(remote, _)| remote),
        }
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn into_reference(self) -> Reference {
        self.reference
    }

    /// Upstream of a local branch, `None` when no tracking is configured.
    pub fn upstream(&self) -> Result<Option<Branch>> {
        if self.kind != BranchKind::Local {
            return Ok(None);
        }
        let engine = self.reference.engine().clone();
        let name = self.name().to_string();
        engine.with_repo(|repo| {
            let local = match repo.find_branch(&name, git2::BranchType::Local) {
                Ok(branch) => branch,
                Err(err) if err.code() == git2::ErrorCode::NotFound => return Ok(None),
                Err(err) => return Err(err.into()),
            };
            match local.upstream() {
                Ok(upstream) => {
                    let refname = upstream
                        .get()
                        .name()
                        .map(str::to_owned)
                        .unwrap_or_default();
                    if refname.is_empty() {
                        return Ok(None);
                    }
                    Ok(Reference::wrap(&engine, &refname).as_branch())
                }
                Err(err) if err.code() == git2::ErrorCode::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        })
    }
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("name", &self.name())
            .field("kind", &self.kind)
            .finish()
    }
}
