//! Single-instance guard for daemon mode

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::debug;

use super::runtime_dir::runtime_file;

const PID_FILE_NAME: &str = "rollcap.pid";

#[derive(Debug, thiserror::Error)]
pub enum PidFileError {
    #[error("Another daemon is already running (PID: {0})")]
    AlreadyRunning(u32),

    #[error("Cannot write PID file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Holds the daemon PID file until dropped
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Claim the default PID file
    pub fn acquire() -> Result<Self, PidFileError> {
        Self::acquire_at(runtime_file(PID_FILE_NAME))
    }

    /// Claim `path`, replacing it if the recorded process is gone
    pub fn acquire_at(path: impl Into<PathBuf>) -> Result<Self, PidFileError> {
        let path = path.into();
        if let Some(pid) = live_owner(&path) {
            return Err(PidFileError::AlreadyRunning(pid));
        }

        let io_err = |source| PidFileError::Io {
            path: path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(io_err)?;
        writeln!(file, "{}", process::id()).map_err(io_err)?;

        debug!(path = %path.display(), "pid file written");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// PID recorded in `path` if that process still exists
fn live_owner(path: &Path) -> Option<u32> {
    let pid: u32 = fs::read_to_string(path).ok()?.trim().parse().ok()?;
    let raw = i32::try_from(pid).ok()?;

    match kill(Pid::from_raw(raw), None::<Signal>) {
        Ok(()) | Err(Errno::EPERM) => Some(pid),
        Err(_) => None,
    }
}
