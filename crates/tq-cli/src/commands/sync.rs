use std::time::Instant;

use anyhow::Context;
use serde::Serialize;
use tq_core::responses::{ImportReport, SyncReport};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SyncArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    #[serde(flatten)]
    pub report: SyncReport,
    /// Present with `--pull`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulled: Option<ImportReport>,
}

/// Handle `tq sync`.
pub async fn handle(args: &SyncArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&run(args, ctx).await?, flags.format)
}

pub async fn run(args: &SyncArgs, ctx: &AppContext) -> anyhow::Result<SyncResponse> {
    let started = Instant::now();

    let pulled = if args.pull && ctx.store.snapshot_path().exists() {
        Some(
            ctx.store
                .import_document_store()
                .await
                .context("failed to merge document store edits")?,
        )
    } else {
        None
    };

    let snapshot = ctx
        .store
        .export_snapshot()
        .await
        .context("failed to rebuild document store")?;

    let report = SyncReport {
        snapshot_path: ctx.store.snapshot_path().display().to_string(),
        entity_count: snapshot.metadata.entity_count,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    };
    Ok(SyncResponse { report, pulled })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::run;
    use crate::cli::root_commands::SyncArgs;
    use crate::test_support;

    #[tokio::test]
    async fn rebuilds_missing_document_store() {
        let (_dir, ctx) = test_support::seeded_context().await;
        std::fs::remove_file(ctx.store.snapshot_path()).expect("snapshot should delete");

        let response = run(&SyncArgs { pull: false }, &ctx).await.expect("sync should run");
        assert_eq!(response.report.entity_count, 3);
        assert!(response.pulled.is_none());
        assert!(ctx.store.snapshot_path().is_file());
    }

    #[tokio::test]
    async fn pull_merges_hand_edits_first() {
        let (_dir, ctx) = test_support::seeded_context().await;
        let path = ctx.store.snapshot_path().to_path_buf();
        let mut document: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("snapshot exists"))
                .expect("snapshot parses");
        document["entities"]
            .as_array_mut()
            .expect("entities array")
            .push(json!({ "name": "Frank", "attributes": { "hair": "white" } }));
        std::fs::write(&path, document.to_string()).expect("snapshot should write");

        let response = run(&SyncArgs { pull: true }, &ctx).await.expect("sync should run");
        let pulled = response.pulled.expect("pull report");
        assert_eq!(pulled.inserted, 1);
        assert_eq!(response.report.entity_count, 4);
        assert!(ctx.store.find_by_name("frank").await.expect("query").is_some());
    }
}
