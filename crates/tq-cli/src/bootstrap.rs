use std::path::Path;

use anyhow::Context;
use tq_config::TqConfig;

/// Load `.env` for the project, then the layered config rooted at `project_root`.
pub fn load_config(project_root: &Path) -> anyhow::Result<TqConfig> {
    load_project_dotenv(project_root)?;
    TqConfig::load_for(project_root).with_context(|| {
        format!(
            "failed to load configuration for {}",
            project_root.display()
        )
    })
}

fn load_project_dotenv(project_root: &Path) -> anyhow::Result<()> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
        return Ok(());
    }

    dotenvy::dotenv().ok();
    Ok(())
}
