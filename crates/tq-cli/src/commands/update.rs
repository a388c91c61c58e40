use anyhow::{Context, bail};
use tq_core::entities::{Entity, EntityUpdate};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::UpdateArgs;
use crate::commands::shared::parse::parse_attributes;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tq update`.
pub async fn handle(
    args: &UpdateArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    output(&run(args, ctx).await?, flags.format)
}

pub async fn run(args: &UpdateArgs, ctx: &AppContext) -> anyhow::Result<Entity> {
    let changes = EntityUpdate {
        name: args.name.clone(),
        attributes: parse_attributes(&args.attrs)?,
    };
    if changes.is_empty() {
        bail!("nothing to update: pass --name and/or --attr");
    }
    ctx.store
        .update(args.id, changes)
        .await
        .with_context(|| format!("failed to update entity {}", args.id))
}
