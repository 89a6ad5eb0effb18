//! Working tree and index status folding.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bough::{Repository, StatusFlags};

use crate::fixtures::git::{init_repo, seeded_repo};

fn by_path(repo: &Repository) -> HashMap<PathBuf, StatusFlags> {
    repo.file_statuses()
        .expect("statuses")
        .into_iter()
        .map(|entry| (entry.path, entry.flags))
        .collect()
}

#[test]
fn clean_tree_reports_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    seeded_repo(dir.path()).expect("seed repo");

    let repo = Repository::open(dir.path()).expect("open");
    assert!(repo.file_statuses().expect("statuses").is_empty());
}

#[test]
fn untracked_files_are_walked_into() {
    let dir = tempfile::tempdir().expect("tempdir");
    seeded_repo(dir.path()).expect("seed repo");
    std::fs::create_dir_all(dir.path().join("deep/nested")).expect("mkdirs");
    std::fs::write(dir.path().join("deep/nested/inner.txt"), "x\n").expect("write");

    let repo = Repository::open(dir.path()).expect("open");
    let statuses = by_path(&repo);
    assert_eq!(statuses.len(), 1);
    let flags = statuses
        .get(Path::new("deep/nested/inner.txt"))
        .expect("nested untracked file listed");
    assert_eq!(*flags, StatusFlags::NEW);
}

#[test]
fn index_and_worktree_changes_fold_into_one_listing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = seeded_repo(dir.path()).expect("seed repo");

    std::fs::write(dir.path().join("README.md"), "changed\n").expect("modify tracked file");

    std::fs::write(dir.path().join("staged.txt"), "s\n").expect("write new file");
    let mut index = raw.index().expect("index");
    index.add_path(Path::new("staged.txt")).expect("stage");
    index.write().expect("write index");

    let repo = Repository::open(dir.path()).expect("open");
    let statuses = by_path(&repo);
    assert!(statuses[Path::new("README.md")].contains(StatusFlags::MODIFIED));
    assert!(statuses[Path::new("staged.txt")].contains(StatusFlags::NEW));
}

#[test]
fn deleted_paths_carry_the_deleted_bit() {
    let dir = tempfile::tempdir().expect("tempdir");
    seeded_repo(dir.path()).expect("seed repo");
    std::fs::remove_file(dir.path().join("README.md")).expect("delete tracked file");

    let repo = Repository::open(dir.path()).expect("open");
    let statuses = by_path(&repo);
    assert!(statuses[Path::new("README.md")].contains(StatusFlags::DELETED));
}

#[test]
fn ignored_files_stay_out_of_the_listing() {
    let dir = tempfile::tempdir().expect("tempdir");
    seeded_repo(dir.path()).expect("seed repo");
    std::fs::write(dir.path().join(".gitignore"), "*.log\n").expect("write gitignore");
    std::fs::write(dir.path().join("junk.log"), "noise\n").expect("write ignored file");

    let repo = Repository::open(dir.path()).expect("open");
    let statuses = by_path(&repo);
    assert!(statuses.contains_key(Path::new(".gitignore")));
    assert!(!statuses.contains_key(Path::new("junk.log")));
}

#[test]
fn status_works_before_the_first_commit() {
    let dir = tempfile::tempdir().expect("tempdir");
    init_repo(dir.path()).expect("init repo");
    std::fs::write(dir.path().join("hello.txt"), "hi\n").expect("write");

    let repo = Repository::open(dir.path()).expect("open");
    let statuses = by_path(&repo);
    assert!(statuses[Path::new("hello.txt")].contains(StatusFlags::NEW));
}
