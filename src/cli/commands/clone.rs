use std::path::PathBuf;

use crate::cli::{finish_operation, CloneArgs};
use crate::ops::CloneOptions;
use crate::repo::Repository;
use crate::{Error, Result};

pub(crate) fn handle(args: CloneArgs, json: bool) -> Result<()> {
    let destination = destination_for(&args.url, args.directory)?;
    let options = CloneOptions { bare: args.bare };
    let (repo, op) = Repository::clone_repository(&args.url, &destination, options);

    finish_operation(&repo, &op, json)?;
    if !json {
        println!("Cloned into {}", destination.display());
    }
    Ok(())
}

/// `https://host/dir/name.git` and `git@host:dir/name.git` both land in
/// `./name` when no directory is given.
fn destination_for(url: &str, directory: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(directory) = directory {
        return Ok(directory);
    }
    let tail = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or("");
    let name = tail.strip_suffix(".git").unwrap_or(tail);
    if name.is_empty() {
        return Err(Error::Unspecified(format!(
            "cannot derive a directory name from {url}"
        )));
    }
    Ok(PathBuf::from(name))
}
