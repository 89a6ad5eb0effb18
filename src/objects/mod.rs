//! Domain objects resolved through the engine.
//!
//! Provides:
//! - `Commit`, `Reference`, `Branch`: cheap clonable views over engine
//!   objects, deduplicated through the per-engine [`ObjectCache`]
//! - `StatusEntry` / `StatusFlags`: working tree status rows
//!
//! Commits are immutable snapshots. References deliberately cache nothing
//! but their name; targets are looked up fresh on every call so a ref
//! moved behind our back never yields stale answers.

mod branch;
mod cache;
mod commit;
mod reference;
mod status;

pub use branch::{Branch, BranchKind};
pub use commit::Commit;
pub use reference::Reference;
pub use status::{StatusEntry, StatusFlags};

pub(crate) use cache::ObjectCache;

pub use git2::Oid;
