//! Domain object identity and snapshot semantics.

use bough::{BranchFilter, BranchKind, Repository};

use crate::fixtures::git::{commit_file, init_repo, repo_with_remote_branch, seeded_repo};

#[test]
fn commit_lookups_share_one_object() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = seeded_repo(dir.path()).expect("seed repo");
    let second = commit_file(&raw, "src/lib.rs", "pub fn hi() {}\n", "second commit")
        .expect("second commit");

    let repo = Repository::open(dir.path()).expect("open");
    let via_head = repo
        .head()
        .expect("head")
        .expect("head exists")
        .peel_to_commit()
        .expect("peel head");
    let via_lookup = repo.commit(second).expect("lookup");

    assert_eq!(via_head.id(), second);
    assert!(via_head.same_as(&via_lookup));
    assert_eq!(via_head, via_lookup);
}

#[test]
fn parents_resolve_through_the_same_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = init_repo(dir.path()).expect("init repo");
    let first = commit_file(&raw, "README.md", "one\n", "first commit").expect("first commit");
    let second = commit_file(&raw, "README.md", "two\n", "second commit").expect("second commit");

    let repo = Repository::open(dir.path()).expect("open");
    let tip = repo.commit(second).expect("tip");
    assert_eq!(tip.parent_count(), 1);
    assert_eq!(tip.parent_ids(), &[first]);

    let parents = tip.parents().expect("parents");
    let direct = repo.commit(first).expect("parent lookup");
    assert!(parents[0].same_as(&direct));
}

#[test]
fn commit_snapshot_carries_author_and_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = init_repo(dir.path()).expect("init repo");
    let oid = commit_file(&raw, "README.md", "hello\n", "add readme\n\nlonger body\n")
        .expect("commit");

    let repo = Repository::open(dir.path()).expect("open");
    let commit = repo.commit(oid).expect("lookup");

    assert_eq!(commit.summary(), Some("add readme"));
    assert_eq!(commit.message(), Some("add readme\n\nlonger body\n"));
    assert_eq!(commit.author_name(), Some("Test"));
    assert_eq!(commit.author_email(), Some("test@test.com"));
    assert!(commit.seconds_since_epoch() > 0);
    assert!(commit.short_id().len() >= 7);
    assert_eq!(commit.parent_count(), 0);
}

#[test]
fn reference_lookups_share_one_entry() {
    let dir = tempfile::tempdir().expect("tempdir");
    seeded_repo(dir.path()).expect("seed repo");

    let repo = Repository::open(dir.path()).expect("open");
    let first = repo
        .reference("refs/heads/main")
        .expect("lookup")
        .expect("exists");
    let again = repo
        .reference("refs/heads/main")
        .expect("lookup")
        .expect("exists");

    assert!(first.same_as(&again));
    assert_eq!(first.shorthand(), "main");
    assert!(first.is_local_branch());
    assert!(repo
        .reference("refs/heads/absent")
        .expect("lookup")
        .is_none());
}

#[test]
fn reference_target_follows_the_moving_ref() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = init_repo(dir.path()).expect("init repo");
    let first = commit_file(&raw, "README.md", "one\n", "first commit").expect("first commit");

    let repo = Repository::open(dir.path()).expect("open");
    let main = repo
        .reference("refs/heads/main")
        .expect("lookup")
        .expect("exists");
    assert_eq!(main.target().expect("target"), Some(first));

    // The ref moves underneath the wrapper; lookups stay fresh.
    let second = commit_file(&raw, "README.md", "two\n", "second commit").expect("second commit");
    assert_eq!(main.target().expect("target"), Some(second));
    assert_eq!(main.peel_to_commit().expect("peel").id(), second);
}

#[test]
fn branch_listing_respects_the_filter() {
    let dir = tempfile::tempdir().expect("tempdir");
    repo_with_remote_branch(dir.path(), "feature").expect("fixture");

    let repo = Repository::open(dir.path()).expect("open");

    let local = repo.branches(BranchFilter::Local).expect("local");
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].name(), "main");
    assert_eq!(local[0].kind(), BranchKind::Local);

    let remote = repo.branches(BranchFilter::Remote).expect("remote");
    assert_eq!(remote.len(), 1);
    assert_eq!(remote[0].name(), "origin/feature");
    assert_eq!(remote[0].local_name(), "feature");
    assert_eq!(remote[0].remote_name(), Some("origin"));

    let all = repo.branches(BranchFilter::All).expect("all");
    assert_eq!(all.len(), 2);
}
