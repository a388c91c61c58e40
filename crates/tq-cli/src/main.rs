#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tq_config::PROJECT_DIR;

mod bootstrap;
mod cli;
mod commands;
mod context;
mod output;
#[cfg(test)]
mod test_support;
mod ui;
mod write_lock;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("tq error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    match &cli.command {
        cli::Commands::Init(args) => return commands::init::handle(args, &flags).await,
        cli::Commands::Schema => return commands::schema::handle(&flags),
        _ => {}
    }

    let project_root = resolve_project_root(flags.project.as_deref())?;
    let config = bootstrap::load_config(&project_root)?;

    let command = cli.command;
    let write_lock = if command_requires_write_lock(&command) {
        Some(write_lock::acquire_for_project(&project_root).await?)
    } else {
        None
    };

    let mut ctx = context::AppContext::init(project_root, config)
        .await
        .context("failed to initialize twentyq application context")?;

    let result = commands::dispatch::dispatch(command, &mut ctx, &flags).await;
    drop(write_lock);
    result
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("TQ_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn resolve_project_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    if let Some(path) = project_override {
        let explicit = PathBuf::from(path);
        if explicit
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == PROJECT_DIR)
        {
            return explicit
                .parent()
                .map(Path::to_path_buf)
                .context("invalid --project path: '.twentyq' directory has no parent");
        }
        if explicit.is_dir() {
            return Ok(explicit);
        }
        anyhow::bail!(
            "invalid --project '{}': directory does not exist",
            explicit.display()
        );
    }

    let start = std::env::current_dir().context("failed to read current directory")?;
    context::find_project_root(&start)
        .context("not a twentyq project (no .twentyq directory found). Run 'tq init' first.")
}

/// Commands that mutate either store take the project write lock.
fn command_requires_write_lock(command: &cli::Commands) -> bool {
    match command {
        cli::Commands::Play(_)
        | cli::Commands::Add(_)
        | cli::Commands::Update(_)
        | cli::Commands::Remove(_)
        | cli::Commands::Import(_)
        | cli::Commands::Sync(_) => true,
        cli::Commands::Stats
        | cli::Commands::List(_)
        | cli::Commands::Show(_)
        | cli::Commands::Export(_)
        | cli::Commands::Init(_)
        | cli::Commands::Schema => false,
    }
}
