//! Working tree status rows.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::path::PathBuf;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// What happened to one path, folded across index and working tree.
///
/// A path staged as modified and then deleted on disk carries both the
/// `MODIFIED` and `DELETED` bits.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusFlags(u16);

impl StatusFlags {
    pub const CURRENT: StatusFlags = StatusFlags(0x01);
    pub const NEW: StatusFlags = StatusFlags(0x02);
    pub const MODIFIED: StatusFlags = StatusFlags(0x04);
    pub const DELETED: StatusFlags = StatusFlags(0x08);
    pub const TYPE_CHANGED: StatusFlags = StatusFlags(0x10);
    pub const RENAMED: StatusFlags = StatusFlags(0x20);
    pub const IGNORED: StatusFlags = StatusFlags(0x40);
    pub const CONFLICTED: StatusFlags = StatusFlags(0x80);

    const NAMED: [(StatusFlags, &'static str); 8] = [
        (StatusFlags::CURRENT, "current"),
        (StatusFlags::NEW, "new"),
        (StatusFlags::MODIFIED, "modified"),
        (StatusFlags::DELETED, "deleted"),
        (StatusFlags::TYPE_CHANGED, "type-changed"),
        (StatusFlags::RENAMED, "renamed"),
        (StatusFlags::IGNORED, "ignored"),
        (StatusFlags::CONFLICTED, "conflicted"),
    ];

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: StatusFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Folds libgit2's separate index and working tree bits into one set.
    pub(crate) fn from_engine(status: git2::Status) -> Self {
        let mut flags = StatusFlags::default();
        if status.is_index_new() || status.is_wt_new() {
            flags |= StatusFlags::NEW;
        }
        if status.is_index_modified() || status.is_wt_modified() {
            flags |= StatusFlags::MODIFIED;
        }
        if status.is_index_deleted() || status.is_wt_deleted() {
            flags |= StatusFlags::DELETED;
        }
        if status.is_index_typechange() || status.is_wt_typechange() {
            flags |= StatusFlags::TYPE_CHANGED;
        }
        if status.is_index_renamed() || status.is_wt_renamed() {
            flags |= StatusFlags::RENAMED;
        }
        if status.is_ignored() {
            flags |= StatusFlags::IGNORED;
        }
        if status.is_conflicted() {
            flags |= StatusFlags::CONFLICTED;
        }
        if flags.is_empty() {
            flags = StatusFlags::CURRENT;
        }
        flags
    }
}

impl BitOr for StatusFlags {
    type Output = StatusFlags;

    fn bitor(self, rhs: StatusFlags) -> StatusFlags {
        StatusFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for StatusFlags {
    fn bitor_assign(&mut self, rhs: StatusFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusFlags({})", self.names().join("|"))
    }
}

impl Serialize for StatusFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let names = self.names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

/// One changed path as reported by a status walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    /// Path relative to the working tree root.
    pub path: PathBuf,
    pub flags: StatusFlags,
}
