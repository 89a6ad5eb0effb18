//! HEAD switching: local branches, remote-tracking branches, failures.

use std::time::Duration;

use bough::{Error, OpPhase, Repository, RepositoryEvent};

use crate::fixtures::git::{
    commit_file, init_repo, repo_with_remote_branch, DEFAULT_BRANCH,
};

fn head_name(repo: &Repository) -> String {
    repo.head()
        .expect("head")
        .expect("head exists")
        .name()
        .to_string()
}

#[test]
fn remote_branch_checkout_creates_a_tracking_local() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_raw, tip) = repo_with_remote_branch(dir.path(), "feature").expect("fixture");

    let repo = Repository::open(dir.path()).expect("open");
    let remote_ref = repo
        .reference("refs/remotes/origin/feature")
        .expect("lookup")
        .expect("remote ref exists");

    repo.set_head_and_checkout(&remote_ref).expect("checkout");

    assert_eq!(head_name(&repo), "refs/heads/feature");
    let local = repo
        .reference("refs/heads/feature")
        .expect("lookup")
        .expect("local branch created");
    assert_eq!(local.target().expect("target"), Some(tip));

    let branch = local.as_branch().expect("branch view");
    let upstream = branch
        .upstream()
        .expect("upstream lookup")
        .expect("tracking configured");
    assert_eq!(upstream.name(), "origin/feature");
}

#[test]
fn checkout_refuses_to_clobber_an_existing_local_branch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (raw, _tip) = repo_with_remote_branch(dir.path(), "feature").expect("fixture");
    let second = commit_file(&raw, "CHANGES.md", "news\n", "second commit").expect("commit");
    let commit = raw.find_commit(second).expect("find commit");
    raw.branch("feature", &commit, false)
        .expect("existing local branch");

    let repo = Repository::open(dir.path()).expect("open");
    let remote_ref = repo
        .reference("refs/remotes/origin/feature")
        .expect("lookup")
        .expect("remote ref exists");

    let err = repo.set_head_and_checkout(&remote_ref).unwrap_err();
    assert!(matches!(&err, Error::LocalBranchExists(name) if name == "feature"));

    // Neither HEAD nor the colliding branch moved.
    assert_eq!(head_name(&repo), format!("refs/heads/{DEFAULT_BRANCH}"));
    let local = repo
        .reference("refs/heads/feature")
        .expect("lookup")
        .expect("branch still there");
    assert_eq!(local.target().expect("target"), Some(second));
}

#[test]
fn failed_checkout_leaves_head_and_tree_alone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = init_repo(dir.path()).expect("init repo");
    let first = commit_file(&raw, "file.txt", "one\n", "first commit").expect("first commit");
    let base = raw.find_commit(first).expect("find commit");
    raw.branch("other", &base, false).expect("branch");
    commit_file(&raw, "file.txt", "two\n", "second commit").expect("second commit");

    // A local edit neither side of the switch matches blocks the safe
    // checkout.
    std::fs::write(dir.path().join("file.txt"), "local edit\n").expect("dirty the tree");

    let repo = Repository::open(dir.path()).expect("open");
    let other = repo
        .reference("refs/heads/other")
        .expect("lookup")
        .expect("exists");
    let err = repo.set_head_and_checkout(&other).unwrap_err();
    assert!(matches!(err, Error::CheckoutFailed(_)));

    assert_eq!(head_name(&repo), format!("refs/heads/{DEFAULT_BRANCH}"));
    let content = std::fs::read_to_string(dir.path().join("file.txt")).expect("read back");
    assert_eq!(content, "local edit\n");
}

#[test]
fn local_branch_checkout_updates_the_working_tree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = init_repo(dir.path()).expect("init repo");
    let first = commit_file(&raw, "file.txt", "one\n", "first commit").expect("first commit");
    let base = raw.find_commit(first).expect("find commit");
    raw.branch("other", &base, false).expect("branch");
    commit_file(&raw, "file.txt", "two\n", "second commit").expect("second commit");

    let repo = Repository::open(dir.path()).expect("open");
    let other = repo
        .reference("refs/heads/other")
        .expect("lookup")
        .expect("exists");

    let op = repo.checkout_async(&other);
    assert_eq!(
        op.wait_timeout(Duration::from_secs(30)),
        Some(OpPhase::Succeeded)
    );

    assert_eq!(head_name(&repo), "refs/heads/other");
    let content = std::fs::read_to_string(dir.path().join("file.txt")).expect("read back");
    assert_eq!(content, "one\n");
    assert!(!repo.busy());
}

#[test]
fn non_branch_checkout_detaches_head() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = init_repo(dir.path()).expect("init repo");
    let first = commit_file(&raw, "file.txt", "one\n", "first commit").expect("first commit");
    let object = raw.find_object(first, None).expect("find object");
    raw.tag_lightweight("v1", &object, false).expect("tag");
    commit_file(&raw, "file.txt", "two\n", "second commit").expect("second commit");

    let repo = Repository::open(dir.path()).expect("open");
    let tag = repo
        .reference("refs/tags/v1")
        .expect("lookup")
        .expect("tag exists");
    repo.set_head_and_checkout(&tag).expect("checkout");

    let head = repo.head().expect("head").expect("head exists");
    assert!(head.as_branch().is_none());

    let probe = git2::Repository::open(dir.path()).expect("reopen");
    assert!(probe.head_detached().expect("detached query"));
    assert_eq!(probe.head().expect("raw head").target(), Some(first));
    let content = std::fs::read_to_string(dir.path().join("file.txt")).expect("read back");
    assert_eq!(content, "one\n");
}

#[test]
fn checkout_notifies_subscribers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let raw = init_repo(dir.path()).expect("init repo");
    let first = commit_file(&raw, "file.txt", "one\n", "first commit").expect("first commit");
    let base = raw.find_commit(first).expect("find commit");
    raw.branch("other", &base, false).expect("branch");

    let repo = Repository::open(dir.path()).expect("open");
    let rx = repo.subscribe();
    let other = repo
        .reference("refs/heads/other")
        .expect("lookup")
        .expect("exists");
    repo.set_head_and_checkout(&other).expect("checkout");

    let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    assert!(events.contains(&RepositoryEvent::StateChanged));
    assert!(events.contains(&RepositoryEvent::RepositoryUpdated));
}
