use crate::cli::{finish_operation, Ctx, FetchArgs};
use crate::Result;

pub(crate) fn handle(ctx: &Ctx, args: FetchArgs) -> Result<()> {
    let op = ctx.repo.fetch(args.remote.as_deref())?;
    finish_operation(&ctx.repo, &op, ctx.json)
}
