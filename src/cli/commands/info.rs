use crate::cli::{render, to_json, Ctx};
use crate::Result;

pub(crate) fn handle(ctx: &Ctx) -> Result<()> {
    let repo = &ctx.repo;
    let head = repo.head()?;
    let tip = match &head {
        Some(reference) => Some(reference.peel_to_commit()?),
        None => None,
    };

    if ctx.json {
        let value = serde_json::json!({
            "state": repo.state(),
            "description": repo.state_description(),
            "busy": repo.busy(),
            "workdir": repo.workdir(),
            "git_dir": repo.git_dir(),
            "head": head.as_ref().map(|reference| serde_json::json!({
                "name": reference.name(),
                "shorthand": reference.shorthand(),
                "commit": tip.as_ref().map(|tip| serde_json::json!({
                    "id": tip.id().to_string(),
                    "short": tip.short_id(),
                    "summary": tip.summary(),
                })),
            })),
        });
        println!("{}", to_json(&value)?);
    } else {
        println!(
            "{}",
            render::render_info(
                repo.state(),
                &repo.state_description(),
                repo.workdir().as_deref(),
                head.as_ref(),
                tip.as_ref(),
            )
        );
    }
    Ok(())
}
