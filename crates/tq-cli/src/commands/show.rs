use tq_core::entities::Entity;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ShowArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tq show`.
pub async fn handle(args: &ShowArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&run(args, ctx).await?, flags.format)
}

pub async fn run(args: &ShowArgs, ctx: &AppContext) -> anyhow::Result<Entity> {
    ctx.store
        .find_by_name(&args.name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no entity named '{}'", args.name.trim()))
}
