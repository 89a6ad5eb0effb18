use crate::cli::{resolve_reference, to_json, CheckoutArgs, Ctx};
use crate::Result;

pub(crate) fn handle(ctx: &Ctx, args: CheckoutArgs) -> Result<()> {
    let reference = resolve_reference(&ctx.repo, &args.name)?;
    ctx.repo.set_head_and_checkout(&reference)?;

    let head = ctx.repo.head()?;
    if ctx.json {
        let value = serde_json::json!({
            "checked_out": reference.name(),
            "head": head.as_ref().map(|reference| reference.shorthand()),
        });
        println!("{}", to_json(&value)?);
    } else {
        match head {
            Some(head) => println!("Switched to {}", head.shorthand()),
            None => println!("Switched to {}", reference.shorthand()),
        }
    }
    Ok(())
}
