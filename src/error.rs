//! Error types for repository state and operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by repository accessors and operations.
///
/// Raw engine failures are wrapped rather than leaked: callers match on
/// these variants, not on libgit2 codes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("no repository found at {0} or any parent directory")]
    NotARepository(PathBuf),

    #[error("local branch {0} already exists")]
    LocalBranchExists(String),

    #[error("failed to check out working tree: {0}")]
    CheckoutFailed(#[source] git2::Error),

    #[error("branch created but tracking setup failed: {0}")]
    TrackingSetupFailed(#[source] git2::Error),

    #[error(transparent)]
    Engine(#[from] git2::Error),

    #[error("{0}")]
    Unspecified(String),
}

impl Error {
    /// True when retrying the same call cannot succeed without the user
    /// changing repository state first.
    pub fn is_branch_collision(&self) -> bool {
        matches!(self, Error::LocalBranchExists(_))
    }
}
