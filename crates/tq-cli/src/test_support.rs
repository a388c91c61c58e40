use tempfile::TempDir;
use tq_core::entities::NewEntity;
use tq_db::service::CandidateStore;

use crate::cli::{ColorMode, GlobalFlags, OutputFormat};
use crate::context::AppContext;

pub fn flags() -> GlobalFlags {
    GlobalFlags {
        format: OutputFormat::Raw,
        limit: None,
        quiet: true,
        verbose: false,
        color: ColorMode::Never,
        project: None,
    }
}

/// In-memory relational store with its document store in a temp dir.
pub async fn context() -> (TempDir, AppContext) {
    let dir = tempfile::tempdir().expect("tempdir should create");
    let store = CandidateStore::open_local(":memory:", dir.path().join(".twentyq/entities.json"))
        .await
        .expect("store should open");
    let ctx = AppContext::with_store(store, dir.path().to_path_buf());
    (dir, ctx)
}

/// Alice (brown hair), Bob (blond hair), Carol (red hair).
pub async fn seeded_context() -> (TempDir, AppContext) {
    let (dir, ctx) = context().await;
    for (name, hair) in [("Alice", "brown"), ("Bob", "blond"), ("Carol", "red")] {
        ctx.store
            .add(NewEntity::new(name).with("hair", hair))
            .await
            .expect("seed entity should add");
    }
    (dir, ctx)
}
