use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the .twentyq directory, config and stores for a project.
    Init(InitArgs),
    /// Play one or more interactive games.
    Play(PlayArgs),
    /// Aggregate statistics over recorded games.
    Stats,
    /// List known entities.
    List(ListArgs),
    /// Show one entity by name.
    Show(ShowArgs),
    /// Register a new entity.
    Add(AddArgs),
    /// Rename an entity or change its attributes.
    Update(UpdateArgs),
    /// Remove an entity by id.
    Remove(RemoveArgs),
    /// Import a snapshot file into the stores.
    Import(ImportArgs),
    /// Write a snapshot of all entities to a file.
    Export(ExportArgs),
    /// Rebuild the document store from the relational store.
    Sync(SyncArgs),
    /// Print the JSON schema of the snapshot format.
    Schema,
}

/// Arguments for `tq init`.
#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config.toml.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `tq play`.
#[derive(Clone, Debug, Args)]
pub struct PlayArgs {
    /// Stop after this many games instead of offering another round.
    #[arg(long)]
    pub rounds: Option<u32>,
}

/// Arguments for `tq list`.
#[derive(Clone, Debug, Args)]
pub struct ListArgs {
    /// Only entities with `attribute=value`.
    #[arg(long = "where", value_name = "ATTR=VALUE")]
    pub filter: Option<String>,
    #[arg(long)]
    pub limit: Option<u32>,
}

/// Arguments for `tq show`.
#[derive(Clone, Debug, Args)]
pub struct ShowArgs {
    pub name: String,
}

/// Arguments for `tq add`.
#[derive(Clone, Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    /// Attribute as `key=value`; repeat for more. An empty value records the
    /// attribute as unknown.
    #[arg(long = "attr", value_name = "KEY=VALUE")]
    pub attrs: Vec<String>,
}

/// Arguments for `tq update`.
#[derive(Clone, Debug, Args)]
pub struct UpdateArgs {
    pub id: i64,
    /// New name.
    #[arg(long)]
    pub name: Option<String>,
    /// Attribute as `key=value`, merged into the existing ones.
    #[arg(long = "attr", value_name = "KEY=VALUE")]
    pub attrs: Vec<String>,
}

/// Arguments for `tq remove`.
#[derive(Clone, Debug, Args)]
pub struct RemoveArgs {
    pub id: i64,
}

/// Arguments for `tq import`.
#[derive(Clone, Debug, Args)]
pub struct ImportArgs {
    pub file: String,
}

/// Arguments for `tq export`.
#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    pub file: String,
}

/// Arguments for `tq sync`.
#[derive(Clone, Debug, Args)]
pub struct SyncArgs {
    /// Merge hand edits of the document store into the relational store first.
    #[arg(long)]
    pub pull: bool,
}
