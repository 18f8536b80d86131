//! Filesystem utilities for atomic writes and private directories.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::error::{Result, VaultError};

/// Create `dir` (and parents) if missing, owner-only on Unix
pub fn ensure_private_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
        }

        debug!("Created data directory {:?}", dir);
    }
    Ok(())
}

/// Write `data` to `path` through a synced temp file and a rename
///
/// Readers observe either the previous content or the complete new content,
/// never a partial write. The file is created owner-only on Unix.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| VaultError::StorageError(format!("Invalid path: {}", path.display())))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| VaultError::StorageError(format!("Invalid filename: {}", path.display())))?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| VaultError::StorageError(format!("System time error: {}", e)))?
        .as_nanos();
    let temp_path = parent.join(format!(".{}.{}.tmp", filename, nanos));

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let written = options.open(&temp_path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(VaultError::StorageError(format!(
            "Temp file write failed for {}: {}",
            path.display(),
            e
        )));
    }

    rename_with_fallback(&temp_path, path)
        .map_err(|e| VaultError::StorageError(format!("Atomic rename failed: {}", e)))?;

    debug!("Wrote {} bytes to {:?}", data.len(), path);
    Ok(())
}

/// Rename, retrying after removing the destination on platforms where rename
/// refuses to replace an existing file. The temp file is removed on failure.
fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "initial: {}, retry: {}",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}
