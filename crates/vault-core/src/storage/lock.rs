//! Single-writer lock for a vault data directory
//!
//! The lock is a file created with `create_new`, so at most one process can
//! hold it. It records the owner PID and is removed when the guard drops.
//! A process killed before its guard drops leaves the file behind; the next
//! `acquire` reclaims it once the recorded PID is no longer running.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, VaultError};

/// Name of the lock file inside the data directory
pub const LOCK_FILE: &str = "passvault.lock";

/// Held for the lifetime of a vault session
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    /// Acquire the lock for `dir`, failing with `StoreLocked` if a running
    /// process holds it
    pub fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE);

        match Self::create(&path) {
            Err(VaultError::StoreLocked(_)) if is_stale(&path) => {
                warn!("Reclaiming stale store lock {:?}", path);
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
                Self::create(&path)
            }
            result => result,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn create(path: &Path) -> Result<Self> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(VaultError::StoreLocked(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            let _ = fs::remove_file(path);
            return Err(e.into());
        }

        debug!("Acquired store lock {:?}", path);
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Released store lock {:?}", self.path),
            Err(e) => debug!("Could not remove store lock {:?}: {}", self.path, e),
        }
    }
}

/// A lock file is stale when its content is not a PID or names a process
/// that is no longer running. An empty file may belong to an owner that has
/// not written its PID yet, so it counts as held.
fn is_stale(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let contents = contents.trim();
    if contents.is_empty() {
        return false;
    }

    match contents.parse::<u32>() {
        Ok(pid) => !process_is_running(pid),
        Err(_) => true,
    }
}

#[cfg(target_os = "linux")]
fn process_is_running(pid: u32) -> bool {
    pid == std::process::id() || Path::new("/proc").join(pid.to_string()).exists()
}

// Without procfs there is no liveness check, so a recorded PID is trusted
#[cfg(not(target_os = "linux"))]
fn process_is_running(_pid: u32) -> bool {
    true
}
