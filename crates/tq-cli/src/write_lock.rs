//! Process-level lock so only one `tq` process mutates a project at a time.
//!
//! The lock is a file holding the owner's pid, created with `create_new`.
//! A lock whose pid is no longer running is treated as stale and removed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tq_config::PROJECT_DIR;

const LOCK_FILE: &str = "write.lock";
const LOCK_WAIT_TIMEOUT: Duration = Duration::from_secs(30);
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Removes the lock file when dropped.
#[derive(Debug)]
pub struct WriteLockGuard {
    path: PathBuf,
}

impl WriteLockGuard {
    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WriteLockGuard {
    fn drop(&mut self) {
        if let Err(error) = std::fs::remove_file(&self.path) {
            tracing::warn!(%error, path = %self.path.display(), "failed to release write lock");
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LockState {
    HeldBy(u32),
    Stale,
    Unreadable,
}

/// Wait for and take the write lock under `<project_root>/.twentyq/`.
pub async fn acquire_for_project(project_root: &Path) -> anyhow::Result<WriteLockGuard> {
    let lock_path = project_root.join(PROJECT_DIR).join(LOCK_FILE);
    let started = Instant::now();

    loop {
        let state = match try_acquire(&lock_path) {
            Ok(guard) => return Ok(guard),
            Err(state) => state,
        };

        if state == LockState::Stale {
            tracing::warn!(path = %lock_path.display(), "removing stale write lock");
            let _ = std::fs::remove_file(&lock_path);
            continue;
        }

        if started.elapsed() >= LOCK_WAIT_TIMEOUT {
            match state {
                LockState::HeldBy(pid) => anyhow::bail!(
                    "another tq process (pid {pid}) is writing to this project; try again after it finishes"
                ),
                _ => anyhow::bail!(
                    "could not acquire write lock at {}; remove it if no tq process is running",
                    lock_path.display()
                ),
            }
        }
        tokio::time::sleep(LOCK_RETRY_DELAY).await;
    }
}

fn try_acquire(lock_path: &Path) -> Result<WriteLockGuard, LockState> {
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent).map_err(|_| LockState::Unreadable)?;
    }

    match OpenOptions::new().create_new(true).write(true).open(lock_path) {
        Ok(mut file) => {
            let _ = writeln!(file, "{}", std::process::id());
            Ok(WriteLockGuard {
                path: lock_path.to_path_buf(),
            })
        }
        Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => {
            let owner = std::fs::read_to_string(lock_path).map_err(|_| LockState::Unreadable)?;
            match owner.trim().parse::<u32>() {
                Ok(pid) if is_process_running(pid) => Err(LockState::HeldBy(pid)),
                Ok(_) => Err(LockState::Stale),
                Err(_) => Err(LockState::Unreadable),
            }
        }
        Err(_) => Err(LockState::Unreadable),
    }
}

fn is_process_running(pid: u32) -> bool {
    if pid == std::process::id() {
        return true;
    }
    std::process::Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}
