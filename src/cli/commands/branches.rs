use crate::cli::render::BranchRow;
use crate::cli::{render, to_json, BranchesArgs, Ctx};
use crate::repo::BranchFilter;
use crate::Result;

pub(crate) fn handle(ctx: &Ctx, args: BranchesArgs) -> Result<()> {
    let filter = if args.local {
        BranchFilter::Local
    } else if args.remote {
        BranchFilter::Remote
    } else {
        BranchFilter::All
    };

    let head_name = ctx
        .repo
        .head()?
        .map(|reference| reference.name().to_string());

    let mut rows = Vec::new();
    for branch in ctx.repo.branches(filter)? {
        // A branch whose tip cannot be resolved still deserves a row.
        let tip = branch
            .reference()
            .peel_to_commit()
            .ok()
            .map(|commit| commit.short_id().to_string());
        rows.push(BranchRow {
            current: head_name.as_deref() == Some(branch.reference().name()),
            name: branch.name().to_string(),
            kind: if branch.is_local() { "local" } else { "remote" },
            local_name: branch.local_name().to_string(),
            tip,
        });
    }

    if ctx.json {
        println!("{}", to_json(&rows)?);
    } else {
        println!("{}", render::render_branches(&rows));
    }
    Ok(())
}
