use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tq_config::{PROJECT_DIR, TqConfig};
use tq_core::responses::ImportReport;
use tq_db::service::CandidateStore;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub project_root: String,
    pub config_path: String,
    pub config_written: bool,
    pub database: String,
    pub snapshot: String,
    pub entities: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seeded: Option<ImportReport>,
}

/// Handle `tq init`.
pub async fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let root = match &flags.project {
        Some(project) => PathBuf::from(project),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    output(&run(&root, args.force).await?, flags.format)
}

/// Create `.twentyq/` with a default config, then open (and seed) both stores.
///
/// An existing config is kept unless `force` is set. A document store already
/// present seeds an empty relational store.
pub async fn run(root: &Path, force: bool) -> anyhow::Result<InitResponse> {
    let data_dir = root.join(PROJECT_DIR);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let config_path = TqConfig::project_config_path(root);
    let config_written = force || !config_path.exists();
    if config_written {
        let contents = TqConfig::default().to_toml()?;
        std::fs::write(&config_path, contents)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
    }

    let config = bootstrap::load_config(root)?;
    let store = CandidateStore::open(&config.store, root)
        .await
        .context("failed to open candidate store")?;
    let seeded = store.seed_if_empty().await?;
    if !store.snapshot_path().exists() {
        store.export_snapshot().await?;
    }

    tracing::info!(root = %root.display(), "project initialized");
    Ok(InitResponse {
        project_root: root.display().to_string(),
        config_path: config_path.display().to_string(),
        config_written,
        database: config.store.database_path_in(root).display().to_string(),
        snapshot: store.snapshot_path().display().to_string(),
        entities: store.count().await?,
        seeded,
    })
}
