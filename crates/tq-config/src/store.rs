//! Candidate store locations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Relational path value that selects an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

fn default_data_dir() -> String {
    ".twentyq".to_string()
}

fn default_database_file() -> String {
    "twentyq.db".to_string()
}

fn default_snapshot_file() -> String {
    "entities.json".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Directory holding both stores. Relative paths resolve against the project root.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Relational database file name inside `data_dir`, or `:memory:`.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Document-store JSON file name inside `data_dir`.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            snapshot_file: default_snapshot_file(),
        }
    }
}

impl StoreConfig {
    /// Reject empty file names before anything touches the filesystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("store.data_dir", &self.data_dir),
            ("store.database_file", &self.database_file),
            ("store.snapshot_file", &self.snapshot_file),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Absolute data directory for a project rooted at `root`.
    pub fn data_dir_in(&self, root: &Path) -> PathBuf {
        let dir = Path::new(&self.data_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            root.join(dir)
        }
    }

    /// Relational store path, or `:memory:` unchanged.
    pub fn database_path_in(&self, root: &Path) -> PathBuf {
        if self.is_in_memory() {
            PathBuf::from(IN_MEMORY)
        } else {
            self.data_dir_in(root).join(&self.database_file)
        }
    }

    pub fn snapshot_path_in(&self, root: &Path) -> PathBuf {
        self.data_dir_in(root).join(&self.snapshot_file)
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_file == IN_MEMORY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_under_root() {
        let config = StoreConfig::default();
        let root = Path::new("/tmp/project");
        assert_eq!(
            config.database_path_in(root),
            PathBuf::from("/tmp/project/.twentyq/twentyq.db")
        );
        assert_eq!(
            config.snapshot_path_in(root),
            PathBuf::from("/tmp/project/.twentyq/entities.json")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn in_memory_database_is_not_joined() {
        let config = StoreConfig {
            database_file: IN_MEMORY.into(),
            ..Default::default()
        };
        assert!(config.is_in_memory());
        assert_eq!(config.database_path_in(Path::new("/x")), PathBuf::from(":memory:"));
    }

    #[test]
    fn absolute_data_dir_ignores_root() {
        let config = StoreConfig {
            data_dir: "/var/lib/tq".into(),
            ..Default::default()
        };
        assert_eq!(config.data_dir_in(Path::new("/x")), PathBuf::from("/var/lib/tq"));
    }

    #[test]
    fn empty_snapshot_file_is_invalid() {
        let config = StoreConfig {
            snapshot_file: " ".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("store.snapshot_file"));
    }
}
