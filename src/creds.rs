//! Credential resolution for remote operations.
//!
//! The chain is: ssh agent, then private key files on disk, then the
//! configured credential helper, then libgit2's default. The first rung
//! that produces a credential wins; a rung that fails falls through
//! rather than aborting the transfer.

use std::path::{Path, PathBuf};

/// Builds the callback handed to `RemoteCallbacks::credentials`.
///
/// `git_config` carries the credential helper configuration; it is `None`
/// before a repository exists (fresh clones fall back to the global
/// config upstream of this call).
pub(crate) fn credential_callback(
    ssh_dir: Option<PathBuf>,
    git_config: Option<git2::Config>,
) -> impl FnMut(&str, Option<&str>, git2::CredentialType) -> Result<git2::Cred, git2::Error> {
    move |url, username_from_url, allowed| {
        if allowed.is_ssh_key()
            && let Some(user) = username_from_url
        {
            if let Ok(cred) = git2::Cred::ssh_key_from_agent(user) {
                return Ok(cred);
            }
            if let Some(cred) = key_file_credential(ssh_dir.as_deref(), user) {
                return Ok(cred);
            }
        }
        if allowed.is_user_pass_plaintext()
            && let Some(ref cfg) = git_config
            && let Ok(cred) = git2::Cred::credential_helper(cfg, url, username_from_url)
        {
            return Ok(cred);
        }
        git2::Cred::default()
    }
}

/// Tries the conventional private key files under `ssh_dir`. The paired
/// `.pub` file is passed along when present; libgit2 can work without it.
fn key_file_credential(ssh_dir: Option<&Path>, user: &str) -> Option<git2::Cred> {
    let dir = ssh_dir?;
    for name in ["id_ed25519", "id_rsa"] {
        let private = dir.join(name);
        if !private.is_file() {
            continue;
        }
        let public = dir.join(format!("{name}.pub"));
        let public = public.is_file().then_some(public);
        match git2::Cred::ssh_key(user, public.as_deref(), &private, None) {
            Ok(cred) => return Some(cred),
            Err(err) => {
                tracing::debug!("ssh key {} unusable: {err}", private.display());
            }
        }
    }
    None
}
