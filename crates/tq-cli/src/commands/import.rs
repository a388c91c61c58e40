use std::path::Path;

use anyhow::Context;
use tq_core::responses::ImportReport;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ImportArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `tq import`.
pub async fn handle(args: &ImportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&run(args, ctx).await?, flags.format)
}

pub async fn run(args: &ImportArgs, ctx: &AppContext) -> anyhow::Result<ImportReport> {
    let path = Path::new(&args.file);
    ctx.store
        .import_snapshot_file(path)
        .await
        .with_context(|| format!("failed to import {}", path.display()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tq_db::error::StoreError;

    use super::run;
    use crate::cli::root_commands::ImportArgs;
    use crate::test_support;

    fn write(dir: &std::path::Path, value: &serde_json::Value) -> ImportArgs {
        let path = dir.join("import.json");
        std::fs::write(&path, value.to_string()).expect("import file should write");
        ImportArgs {
            file: path.to_string_lossy().into_owned(),
        }
    }

    #[tokio::test]
    async fn merges_by_name_and_counts_rejections() {
        let (dir, ctx) = test_support::seeded_context().await;
        let args = write(
            dir.path(),
            &json!({
                "entities": [
                    { "id": 77, "name": "alice", "attributes": { "hair": "grey" } },
                    { "name": "Erin", "attributes": { "hair": "black" } },
                    { "attributes": { "hair": "none" } },
                    { "name": "Bad", "attributes": { "Hair Colour": "x" } }
                ],
                "metadata": {
                    "version": "1.0.0",
                    "exported_at": "2026-01-01T00:00:00Z",
                    "entity_count": 4
                }
            }),
        );

        let report = run(&args, &ctx).await.expect("import should run");
        assert_eq!((report.inserted, report.updated, report.rejected, report.total), (1, 1, 2, 2));

        let alice = ctx.store.find_by_name("Alice").await.expect("query").expect("alice exists");
        assert_eq!(alice.value_of("hair").as_deref(), Some("grey"));
    }

    #[tokio::test]
    async fn newer_major_version_is_refused() {
        let (dir, ctx) = test_support::seeded_context().await;
        let args = write(
            dir.path(),
            &json!({
                "entities": [],
                "metadata": {
                    "version": "2.0.0",
                    "exported_at": "2026-01-01T00:00:00Z",
                    "entity_count": 0
                }
            }),
        );

        let err = run(&args, &ctx).await.expect_err("import should fail");
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::SchemaVersion { .. })
        ));
    }
}
