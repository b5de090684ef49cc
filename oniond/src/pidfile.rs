//! PID-file based single-instance guard.
//!
//! `start` refuses to run if the file exists and names a live process; a
//! stale PID file (the named process is gone) is replaced silently. The
//! file is removed on orderly shutdown and intentionally left behind on a
//! crash so an operator can diagnose an unclean exit.

use anyhow::{Context, Result};
use nix::sys::signal;
use nix::unistd::Pid;
use onion_core::OnionError;
use std::path::PathBuf;

pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Acquire the PID file at `path`, failing if a live process already
    /// holds it.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Ok(existing) = std::fs::read_to_string(&path) {
            if let Ok(pid) = existing.trim().parse::<i32>() {
                if process_is_alive(pid) {
                    return Err(
                        OnionError::AlreadyRunning(path.display().to_string(), pid as u32).into(),
                    );
                }
            }
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating pid file directory {}", parent.display()))?;
        }
        std::fs::write(&path, format!("{}\n", std::process::id()))
            .with_context(|| format!("writing pid file {}", path.display()))?;

        Ok(Self { path })
    }

    /// Remove the PID file on orderly shutdown.
    pub fn release(&self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::warn!(error = %err, path = %self.path.display(), "failed to remove pid file");
        }
    }
}

fn process_is_alive(pid: i32) -> bool {
    signal::kill(Pid::from_raw(pid), None).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_writes_current_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oniond.pid");

        let guard = PidFile::acquire(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), std::process::id().to_string());

        guard.release();
        assert!(!path.exists());
    }

    #[test]
    fn acquire_replaces_a_stale_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oniond.pid");
        // A pid that is vanishingly unlikely to be a live process.
        std::fs::write(&path, "999999\n").unwrap();

        let guard = PidFile::acquire(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), std::process::id().to_string());
        guard.release();
    }

    #[test]
    fn acquire_refuses_when_a_live_process_holds_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oniond.pid");
        std::fs::write(&path, format!("{}\n", std::process::id())).unwrap();

        let err = PidFile::acquire(&path).unwrap_err();
        assert!(err.to_string().contains("already held by a running process"));
    }
}
