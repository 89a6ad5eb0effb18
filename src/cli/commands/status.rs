use crate::cli::{render, to_json, Ctx};
use crate::Result;

pub(crate) fn handle(ctx: &Ctx) -> Result<()> {
    let entries = ctx.repo.file_statuses()?;
    if ctx.json {
        println!("{}", to_json(&entries)?);
    } else {
        println!("{}", render::render_status(&entries));
    }
    Ok(())
}
