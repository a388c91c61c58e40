use std::path::PathBuf;

use anyhow::Context;
use tq_config::TqConfig;
use tq_db::service::CandidateStore;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub store: CandidateStore,
    pub config: TqConfig,
    pub project_root: PathBuf,
}

impl AppContext {
    /// Open the stores for `project_root` and seed an empty relational store
    /// from the document store.
    pub async fn init(project_root: PathBuf, config: TqConfig) -> anyhow::Result<Self> {
        let store = CandidateStore::open(&config.store, &project_root)
            .await
            .context("failed to open candidate store")?;

        if let Some(report) = store
            .seed_if_empty()
            .await
            .context("failed to seed candidate store from document store")?
        {
            tracing::info!(
                inserted = report.inserted,
                rejected = report.rejected,
                "seeded relational store from document store"
            );
        }

        Ok(Self {
            store,
            config,
            project_root,
        })
    }

    /// Build a context around an already opened store.
    #[cfg(test)]
    pub fn with_store(store: CandidateStore, project_root: PathBuf) -> Self {
        Self {
            store,
            config: TqConfig::default(),
            project_root,
        }
    }
}
