use anyhow::Context;
use tq_core::entities::{Entity, NewEntity};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AddArgs;
use crate::commands::shared::parse::parse_attributes;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tq add`.
pub async fn handle(args: &AddArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&run(args, ctx).await?, flags.format)
}

pub async fn run(args: &AddArgs, ctx: &AppContext) -> anyhow::Result<Entity> {
    let new = NewEntity {
        name: args.name.clone(),
        attributes: parse_attributes(&args.attrs)?,
    };
    ctx.store
        .add(new)
        .await
        .with_context(|| format!("failed to add '{}'", args.name.trim()))
}
