use std::path::{Path, PathBuf};

use tq_config::PROJECT_DIR;

/// Walk upwards from `start` until a `.twentyq` directory is found.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::find_project_root;

    #[test]
    fn finds_project_root_in_current_directory() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::create_dir(temp.path().join(".twentyq")).expect(".twentyq should create");

        let found = find_project_root(temp.path());
        assert_eq!(found.as_deref(), Some(temp.path()));
    }

    #[test]
    fn finds_project_root_in_parent_directory() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::create_dir(temp.path().join(".twentyq")).expect(".twentyq should create");
        std::fs::create_dir_all(temp.path().join("a/b")).expect("nested dirs should create");

        let found = find_project_root(&temp.path().join("a/b"));
        assert_eq!(found.as_deref(), Some(temp.path()));
    }

    #[test]
    fn ignores_plain_file_named_like_the_data_dir() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::create_dir_all(temp.path().join("inner")).expect("dir should create");
        std::fs::write(temp.path().join("inner/.twentyq"), "").expect("file should write");

        let found = find_project_root(&temp.path().join("inner"));
        assert_ne!(found.as_deref(), Some(temp.path().join("inner").as_path()));
    }
}
