#![forbid(unsafe_code)]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
mod creds;
mod engine;
pub mod error;
pub mod events;
pub mod objects;
pub mod ops;
pub mod repo;
#[cfg(feature = "cli")]
pub mod telemetry;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the working surface at crate root for convenience
pub use engine::EngineCapability;
pub use events::RepositoryEvent;
pub use objects::{Branch, BranchKind, Commit, Oid, Reference, StatusEntry, StatusFlags};
pub use ops::{CloneOptions, OpKind, OpPhase, OpSnapshot, OperationHandle};
pub use repo::{BranchFilter, RepoState, Repository};
