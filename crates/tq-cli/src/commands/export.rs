use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ExportArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub path: String,
    pub entity_count: usize,
    pub version: String,
    pub exported_at: DateTime<Utc>,
}

/// Handle `tq export`.
pub async fn handle(args: &ExportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&run(args, ctx).await?, flags.format)
}

pub async fn run(args: &ExportArgs, ctx: &AppContext) -> anyhow::Result<ExportResponse> {
    let path = PathBuf::from(&args.file);
    let snapshot = ctx
        .store
        .export_snapshot_to(&path)
        .await
        .with_context(|| format!("failed to export to {}", path.display()))?;
    Ok(ExportResponse {
        path: path.display().to_string(),
        entity_count: snapshot.metadata.entity_count,
        version: snapshot.metadata.version,
        exported_at: snapshot.metadata.exported_at,
    })
}
