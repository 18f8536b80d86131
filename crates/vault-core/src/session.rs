//! Unlocked vault session
//!
//! A session exists only after the master password has been verified. It
//! holds the data directory lock and the only copy of the encryption key;
//! dropping it zeroizes the key and releases the lock.

use std::path::Path;

use tracing::{debug, info};

use crate::credential::CredentialManager;
use crate::crypto::{CredentialCipher, MasterKey};
use crate::error::Result;
use crate::storage::{SqliteCredentialStore, StoreLock};

/// Access to stored credentials for the lifetime of one unlock
pub struct VaultSession {
    // Declared before the lock so the store is closed first on drop
    credentials: CredentialManager,
    lock: StoreLock,
}

impl VaultSession {
    pub(crate) fn open(lock: StoreLock, key: MasterKey, database_path: &Path) -> Result<Self> {
        let store = SqliteCredentialStore::open(database_path)?;
        let credentials = CredentialManager::new(Box::new(store), CredentialCipher::new(key));

        info!("Vault session opened");
        Ok(Self { credentials, lock })
    }

    /// Credential operations for this session
    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    /// Lock file held by this session
    pub fn lock_path(&self) -> &Path {
        self.lock.path()
    }
}

impl std::fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("backend", &self.credentials.backend_name())
            .field("lock", &self.lock.path())
            .finish()
    }
}

impl Drop for VaultSession {
    fn drop(&mut self) {
        debug!("Vault session closed");
    }
}
