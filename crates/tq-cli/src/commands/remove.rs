use anyhow::Context;
use tq_core::entities::Entity;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RemoveArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tq remove`.
pub async fn handle(args: &RemoveArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&run(args, ctx).await?, flags.format)
}

pub async fn run(args: &RemoveArgs, ctx: &AppContext) -> anyhow::Result<Entity> {
    ctx.store
        .remove(args.id)
        .await
        .with_context(|| format!("failed to remove entity {}", args.id))
}
