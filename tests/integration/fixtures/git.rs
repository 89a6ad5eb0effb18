use std::path::Path;

use git2::Repository;

/// Every fixture repository gets this branch as its initial branch, so
/// tests never depend on the host's `init.defaultBranch`.
pub const DEFAULT_BRANCH: &str = "main";

pub fn init_bare_repo(path: &Path) -> Result<(), String> {
    Repository::init_bare(path)
        .map_err(|err| format!("git init --bare failed for {path:?}: {err}"))?;
    Ok(())
}

pub fn init_repo(path: &Path) -> Result<Repository, String> {
    let repo =
        Repository::init(path).map_err(|err| format!("git init failed for {path:?}: {err}"))?;
    configure_test_repo(&repo)?;
    repo.set_head(&format!("refs/heads/{DEFAULT_BRANCH}"))
        .map_err(|err| format!("set HEAD to {DEFAULT_BRANCH} failed: {err}"))?;
    Ok(repo)
}

pub fn init_repo_with_origin(repo_dir: &Path, remote_dir: &Path) -> Result<Repository, String> {
    let repo = init_repo(repo_dir)?;
    add_origin_remote(&repo, remote_dir)?;
    Ok(repo)
}

/// An initialized repository with one commit on the default branch.
pub fn seeded_repo(path: &Path) -> Result<Repository, String> {
    let repo = init_repo(path)?;
    commit_file(&repo, "README.md", "hello\n", "initial commit")?;
    Ok(repo)
}

/// A seeded repository carrying `refs/remotes/origin/<branch>` at its tip
/// commit, with `origin` configured so tracking setup can resolve the
/// remote. The remote url is never contacted. Returns the tip oid too.
pub fn repo_with_remote_branch(
    path: &Path,
    branch: &str,
) -> Result<(Repository, git2::Oid), String> {
    let repo = seeded_repo(path)?;
    add_origin_remote(&repo, path)?;
    let tip = head_oid(&repo)?;
    repo.reference(
        &format!("refs/remotes/origin/{branch}"),
        tip,
        true,
        "test remote-tracking branch",
    )
    .map_err(|err| format!("create remote-tracking ref failed: {err}"))?;
    Ok((repo, tip))
}

/// Writes `content` to `rel` inside the working tree, stages it, and
/// commits on HEAD. Returns the new commit id.
pub fn commit_file(
    repo: &Repository,
    rel: &str,
    content: &str,
    message: &str,
) -> Result<git2::Oid, String> {
    let workdir = repo
        .workdir()
        .ok_or_else(|| "repository has no working tree".to_string())?;
    let file = workdir.join(rel);
    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|err| format!("create {parent:?} failed: {err}"))?;
    }
    std::fs::write(&file, content).map_err(|err| format!("write {file:?} failed: {err}"))?;

    let mut index = repo
        .index()
        .map_err(|err| format!("open index failed: {err}"))?;
    index
        .add_path(Path::new(rel))
        .map_err(|err| format!("stage {rel} failed: {err}"))?;
    index
        .write()
        .map_err(|err| format!("write index failed: {err}"))?;
    let tree_id = index
        .write_tree()
        .map_err(|err| format!("write tree failed: {err}"))?;
    let tree = repo
        .find_tree(tree_id)
        .map_err(|err| format!("find tree failed: {err}"))?;

    let signature = repo
        .signature()
        .map_err(|err| format!("build signature failed: {err}"))?;
    let parent = match repo.head() {
        Ok(head) => Some(
            head.peel_to_commit()
                .map_err(|err| format!("peel HEAD failed: {err}"))?,
        ),
        Err(err)
            if matches!(
                err.code(),
                git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound
            ) =>
        {
            None
        }
        Err(err) => return Err(format!("read HEAD failed: {err}")),
    };
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )
    .map_err(|err| format!("commit failed: {err}"))
}

pub fn head_oid(repo: &Repository) -> Result<git2::Oid, String> {
    let head = repo
        .head()
        .map_err(|err| format!("read HEAD failed: {err}"))?;
    head.target()
        .ok_or_else(|| "HEAD does not point at a commit".to_string())
}

pub fn clone_local(source: &Path, destination: &Path) -> Result<(), String> {
    let url = source
        .to_str()
        .ok_or_else(|| format!("source path is not utf8: {source:?}"))?;
    Repository::clone(url, destination)
        .map_err(|err| format!("git clone {url} failed: {err}"))?;
    Ok(())
}

pub fn repo_has_branch(repo_dir: &Path, branch: &str) -> Result<bool, String> {
    let repo = Repository::open(repo_dir)
        .map_err(|err| format!("open repo failed for {repo_dir:?}: {err}"))?;
    let refname = format!("refs/heads/{branch}");
    Ok(repo.find_reference(&refname).is_ok())
}

fn configure_test_repo(repo: &Repository) -> Result<(), String> {
    let mut cfg = repo
        .config()
        .map_err(|err| format!("open repo config failed: {err}"))?;
    cfg.set_str("user.name", "Test")
        .map_err(|err| format!("set user.name failed: {err}"))?;
    cfg.set_str("user.email", "test@test.com")
        .map_err(|err| format!("set user.email failed: {err}"))?;
    Ok(())
}

fn add_origin_remote(repo: &Repository, remote_dir: &Path) -> Result<(), String> {
    let remote = remote_dir
        .to_str()
        .ok_or_else(|| format!("remote dir path is not utf8: {remote_dir:?}"))?;
    repo.remote("origin", remote)
        .map_err(|err| format!("git remote add origin failed: {err}"))?;
    Ok(())
}
