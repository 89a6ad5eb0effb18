use std::path::PathBuf;

use crate::cli::to_json;
use crate::repo::Repository;
use crate::{Error, Result};

pub(crate) fn handle(path: Option<PathBuf>, json: bool) -> Result<()> {
    let target = match path {
        Some(path) => path,
        None => std::env::current_dir().map_err(|err| {
            Error::Unspecified(format!("cannot determine working directory: {err}"))
        })?,
    };
    let repo = Repository::init_at(&target)?;
    let root = repo.workdir().or_else(|| repo.git_dir());

    if json {
        println!("{}", to_json(&serde_json::json!({ "initialized": root }))?);
    } else if let Some(root) = root {
        println!("Initialized repository at {}", root.display());
    }
    Ok(())
}
