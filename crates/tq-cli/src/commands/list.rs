use serde::Serialize;
use tq_core::entities::Entity;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ListArgs;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct EntityListResponse {
    pub entities: Vec<Entity>,
}

/// Handle `tq list`.
pub async fn handle(args: &ListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&run(args, ctx, flags).await?, flags.format)
}

pub async fn run(
    args: &ListArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<EntityListResponse> {
    let limit = effective_limit(args.limit, flags.limit, ctx.config.general.default_limit);
    let mut entities = match args.filter.as_deref() {
        Some(filter) => {
            let Some((attribute, value)) = filter.split_once('=') else {
                anyhow::bail!("invalid --where '{filter}': expected ATTR=VALUE");
            };
            ctx.store.find_by_attribute(attribute.trim(), value).await?
        }
        None => ctx.store.list_all().await?,
    };
    entities.truncate(limit);
    Ok(EntityListResponse { entities })
}
