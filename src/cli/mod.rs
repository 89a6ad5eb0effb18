//! CLI surface for bough.
//!
//! Thin handlers over the library: every command resolves a repository,
//! calls the same API an embedding client would, and renders either
//! human text or `--json`.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use crossbeam::channel::RecvTimeoutError;
use serde::Serialize;

use crate::events::RepositoryEvent;
use crate::objects::Reference;
use crate::ops::{OpPhase, OperationHandle};
use crate::repo::Repository;
use crate::{Error, Result};

mod commands;
mod render;

// =============================================================================
// Entry + global options
// =============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "bough",
    version,
    about = "Repository state and operation engine",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Machine-readable JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Repository path (default: discover from cwd).
    #[arg(long, global = true, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Debug output (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new repository.
    Init,

    /// Show repository state and HEAD.
    Info,

    /// Show working tree status.
    #[command(alias = "st")]
    Status,

    /// List branches.
    #[command(alias = "br")]
    Branches(BranchesArgs),

    /// Switch HEAD and working tree to a reference.
    #[command(alias = "co")]
    Checkout(CheckoutArgs),

    /// Clone a repository.
    Clone(CloneArgs),

    /// Fetch from a remote.
    Fetch(FetchArgs),

    /// Push to a remote.
    Push(PushArgs),
}

#[derive(Args, Debug)]
pub struct BranchesArgs {
    /// Local branches only.
    #[arg(long)]
    pub local: bool,

    /// Remote branches only.
    #[arg(long, conflicts_with = "local")]
    pub remote: bool,
}

#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// Branch, tag, or full reference name.
    pub name: String,
}

#[derive(Args, Debug)]
pub struct CloneArgs {
    pub url: String,

    /// Destination directory (default: derived from the URL).
    pub directory: Option<PathBuf>,

    /// Clone without a working tree.
    #[arg(long)]
    pub bare: bool,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Remote name (default: origin).
    pub remote: Option<String>,
}

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Remote name (default: origin).
    pub remote: Option<String>,

    /// Refspecs (default: the current branch).
    pub refspec: Vec<String>,
}

pub fn parse_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::parse_from(args)
}

/// Run the CLI (used by bin).
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        // Init and clone work without an existing repository.
        Commands::Init => commands::init::handle(cli.repo, cli.json),
        Commands::Clone(args) => commands::clone::handle(args, cli.json),
        cmd => {
            let repo = open_repo(cli.repo)?;
            let ctx = Ctx {
                repo,
                json: cli.json,
            };
            match cmd {
                Commands::Info => commands::info::handle(&ctx),
                Commands::Status => commands::status::handle(&ctx),
                Commands::Branches(args) => commands::branches::handle(&ctx, args),
                Commands::Checkout(args) => commands::checkout::handle(&ctx, args),
                Commands::Fetch(args) => commands::fetch::handle(&ctx, args),
                Commands::Push(args) => commands::push::handle(&ctx, args),
                // Handled above.
                Commands::Init | Commands::Clone(_) => Ok(()),
            }
        }
    }
}

// =============================================================================
// Context + helpers
// =============================================================================

pub(crate) struct Ctx {
    pub(crate) repo: Arc<Repository>,
    pub(crate) json: bool,
}

fn open_repo(path: Option<PathBuf>) -> Result<Arc<Repository>> {
    let start = match path {
        Some(path) => path,
        None => std::env::current_dir().map_err(|err| {
            Error::Unspecified(format!("cannot determine working directory: {err}"))
        })?,
    };
    Repository::open(&start)
}

/// Accepts `main`, `origin/feature`, `v1.0`, or a full refname.
pub(crate) fn resolve_reference(repo: &Repository, name: &str) -> Result<Reference> {
    let candidates = [
        name.to_string(),
        format!("refs/heads/{name}"),
        format!("refs/remotes/{name}"),
        format!("refs/tags/{name}"),
    ];
    for candidate in &candidates {
        if let Some(reference) = repo.reference(candidate)? {
            return Ok(reference);
        }
    }
    Err(Error::Unspecified(format!("no reference matches {name}")))
}

/// Waits for `op`, echoing progress to stderr in human mode, and turns a
/// failed operation into a CLI error.
pub(crate) fn finish_operation(
    repo: &Arc<Repository>,
    op: &OperationHandle,
    json: bool,
) -> Result<()> {
    let rx = repo.subscribe();
    let mut progressed = false;
    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(RepositoryEvent::ProgressChanged) if !json => {
                let line = render::progress_line(&op.snapshot());
                if !line.is_empty() {
                    eprint!("\r{line}");
                    progressed = true;
                }
            }
            Ok(RepositoryEvent::OperationDone { .. }) => break,
            Ok(_) => {}
            Err(RecvTimeoutError::Timeout) => {
                if op.is_finished() {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    if progressed {
        eprintln!();
    }

    let snapshot = op.snapshot();
    if json {
        println!("{}", to_json(&snapshot)?);
    }
    match snapshot.phase {
        OpPhase::Failed => Err(Error::Unspecified(snapshot.error.unwrap_or_else(|| {
            format!("{} failed", snapshot.kind.verb())
        }))),
        _ => Ok(()),
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| Error::Unspecified(format!("json render failed: {err}")))
}
