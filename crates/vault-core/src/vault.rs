//! Main vault orchestration

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, info, warn};

use crate::crypto::MasterKey;
use crate::error::{Result, VaultError};
use crate::fs::ensure_private_dir;
use crate::master::{AuthOutcome, MasterAuthenticator, PasswordPrompt};
use crate::session::VaultSession;
use crate::settings::{Settings, SettingsManager};
use crate::storage::{CredentialStore, SqliteCredentialStore, StoreLock};

/// Vault state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// No master password has been set yet
    NotInitialized,
    /// Master password set; a session needs the password
    Locked,
}

/// Result of the interactive startup flow
#[derive(Debug)]
pub enum Startup {
    /// First run: the master password was just set. Nothing else happens
    /// until the next start.
    Established,
    /// The master password was accepted
    Unlocked(VaultSession),
}

/// A vault data directory: settings, master file, and credential database
#[derive(Debug)]
pub struct Vault {
    data_dir: PathBuf,
    settings_manager: SettingsManager,
}

impl Vault {
    /// Open the vault in `data_dir`, creating the directory if needed
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        ensure_private_dir(&data_dir)?;

        let settings_manager = SettingsManager::load(&data_dir)?;
        debug!("Opened vault at {:?}", data_dir);

        Ok(Self {
            data_dir,
            settings_manager,
        })
    }

    /// Get the default data directory
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("com", "passvault", "passvault")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                VaultError::StorageError("Could not determine data directory".to_string())
            })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the current vault state
    pub fn state(&self) -> VaultState {
        if self.authenticator().is_established() {
            VaultState::Locked
        } else {
            VaultState::NotInitialized
        }
    }

    /// Get current settings
    pub fn settings(&self) -> &Settings {
        self.settings_manager.get()
    }

    /// Update settings
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        self.settings_manager.update(settings)
    }

    /// Startup flow: set the master password on first run, otherwise unlock
    ///
    /// The store lock is held across the prompt, so a second instance fails
    /// fast instead of racing the first-run setup.
    pub fn start(&self, prompt: &mut dyn PasswordPrompt) -> Result<Startup> {
        let lock = StoreLock::acquire(&self.data_dir)?;

        let authenticator = self.authenticator();
        if !authenticator.is_established() {
            self.ensure_no_orphaned_database()?;
        }

        match authenticator.establish_or_verify(prompt)? {
            AuthOutcome::Established => {
                info!("Master password set; restart to unlock");
                Ok(Startup::Established)
            }
            AuthOutcome::Authenticated(keys) => {
                let session = self.open_session(lock, keys.into_key())?;
                Ok(Startup::Unlocked(session))
            }
            AuthOutcome::Rejected => Err(VaultError::AuthenticationFailure),
        }
    }

    /// Set the master password for a new vault
    pub fn initialize(&self, password: &str) -> Result<()> {
        let _lock = StoreLock::acquire(&self.data_dir)?;

        let authenticator = self.authenticator();
        if !authenticator.is_established() {
            self.ensure_no_orphaned_database()?;
        }

        info!("Initializing new vault");
        authenticator.establish(password)
    }

    /// Verify the master password and open a session
    pub fn unlock(&self, password: &str) -> Result<VaultSession> {
        let lock = StoreLock::acquire(&self.data_dir)?;

        match self.authenticator().verify(password)? {
            AuthOutcome::Authenticated(keys) => self.open_session(lock, keys.into_key()),
            _ => Err(VaultError::AuthenticationFailure),
        }
    }

    fn authenticator(&self) -> MasterAuthenticator {
        MasterAuthenticator::new(
            self.settings_manager.master_path(),
            self.settings_manager.get().kdf,
        )
    }

    /// A new master password could never decrypt existing records, so setup
    /// refuses to run over a database that still holds any
    fn ensure_no_orphaned_database(&self) -> Result<()> {
        let database_path = self.settings_manager.database_path();
        if !database_path.exists() {
            return Ok(());
        }

        let stored = SqliteCredentialStore::open(&database_path)?.count()?;
        if stored > 0 {
            warn!(
                "{} credentials in {:?} but no master file",
                stored, database_path
            );
            return Err(VaultError::OrphanedDatabase(database_path));
        }
        Ok(())
    }

    fn open_session(&self, lock: StoreLock, key: MasterKey) -> Result<VaultSession> {
        VaultSession::open(lock, key, &self.settings_manager.database_path())
    }
}
