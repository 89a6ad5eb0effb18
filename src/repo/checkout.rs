//! Head switching with working tree checkout.
//!
//! Checking out a remote-tracking branch transparently creates the local
//! branch and wires tracking, the same flow `git checkout feature` gives
//! you for `origin/feature`. The working tree is updated before HEAD
//! moves, so a checkout that fails leaves HEAD where it was.

use crate::engine::EngineHandle;
use crate::objects::Reference;
use crate::{Error, Result};

struct Target {
    refname: String,
    oid: git2::Oid,
}

/// Runs the whole switch under the engine lock.
pub(crate) fn perform(engine: &EngineHandle, reference: &Reference) -> Result<()> {
    engine.with_repo(|repo| {
        let target = resolve_target(repo, reference)?;

        let object = repo.find_object(target.oid, Some(git2::ObjectType::Commit))?;
        let mut options = git2::build::CheckoutBuilder::new();
        options.safe();
        repo.checkout_tree(&object, Some(&mut options))
            .map_err(Error::CheckoutFailed)?;

        repo.set_head(&target.refname)?;
        Ok(())
    })
}

/// For remote-tracking branches: refuse if the local name is taken, then
/// create the local branch at the remote tip and set its upstream. The
/// local branch becomes the checkout target. Everything else checks out
/// as itself.
fn resolve_target(repo: &git2::Repository, reference: &Reference) -> Result<Target> {
    let remote_branch = reference.as_branch().filter(|branch| branch.is_remote());
    let Some(remote_branch) = remote_branch else {
        let raw = repo.find_reference(reference.name())?;
        let commit = raw.peel_to_commit()?;
        return Ok(Target {
            refname: reference.name().to_string(),
            oid: commit.id(),
        });
    };

    let local_name = remote_branch.local_name().to_string();
    match repo.find_branch(&local_name, git2::BranchType::Local) {
        Ok(_) => return Err(Error::LocalBranchExists(local_name)),
        Err(err) if err.code() == git2::ErrorCode::NotFound => {}
        Err(err) => return Err(err.into()),
    }

    let raw = repo.find_reference(reference.name())?;
    let tip = raw.peel_to_commit()?;

    // A racing branch creation still surfaces as the collision error.
    let mut created = match repo.branch(&local_name, &tip, false) {
        Ok(branch) => branch,
        Err(err) if err.code() == git2::ErrorCode::Exists => {
            return Err(Error::LocalBranchExists(local_name));
        }
        Err(err) => return Err(err.into()),
    };

    created
        .set_upstream(Some(remote_branch.name()))
        .map_err(Error::TrackingSetupFailed)?;

    let refname = created
        .get()
        .name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("refs/heads/{local_name}"));

    Ok(Target {
        refname,
        oid: tip.id(),
    })
}
