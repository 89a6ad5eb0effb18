use crate::cli::{finish_operation, Ctx, PushArgs};
use crate::Result;

pub(crate) fn handle(ctx: &Ctx, args: PushArgs) -> Result<()> {
    let op = ctx.repo.push(args.remote.as_deref(), args.refspec)?;
    finish_operation(&ctx.repo, &op, ctx.json)
}
