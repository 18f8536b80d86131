//! Master password establishment and verification

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::secret::MasterSecret;
use crate::crypto::{DerivedKeys, KeyDerivationParams, SecretString};
use crate::error::{Result, VaultError};

/// Source of master password input
///
/// The CLI reads from the terminal; tests script the answers.
pub trait PasswordPrompt {
    /// Ask for a new master password during first-run setup
    fn new_master_password(&mut self) -> Result<SecretString>;

    /// Ask for the existing master password
    fn master_password(&mut self) -> Result<SecretString>;
}

/// Result of a startup authentication attempt
#[derive(Debug)]
pub enum AuthOutcome {
    /// No master password existed; one was just set. The caller must exit.
    Established,
    /// The password matched the stored verifier
    Authenticated(DerivedKeys),
    /// The password did not match
    Rejected,
}

/// Gatekeeper over the master file
#[derive(Debug, Clone)]
pub struct MasterAuthenticator {
    path: PathBuf,
    params: KeyDerivationParams,
}

impl MasterAuthenticator {
    /// `params` only applies when a new master password is established;
    /// verification uses the parameters recorded in the master file.
    pub fn new(path: impl Into<PathBuf>, params: KeyDerivationParams) -> Self {
        Self {
            path: path.into(),
            params,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether a master password has been set
    pub fn is_established(&self) -> bool {
        self.path.exists()
    }

    /// Set the master password for a fresh installation
    pub fn establish(&self, password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(VaultError::InvalidArgument(
                "Master password must not be empty".to_string(),
            ));
        }
        if self.is_established() {
            return Err(VaultError::AlreadyInitialized);
        }

        let (secret, _keys) = MasterSecret::create(password, &self.params)?;
        secret.persist(&self.path)?;

        info!("Master password established");
        Ok(())
    }

    /// Check a password against the stored verifier
    pub fn verify(&self, password: &str) -> Result<AuthOutcome> {
        let secret = MasterSecret::load(&self.path)?.ok_or(VaultError::NotInitialized)?;

        match secret.verify(password)? {
            Some(keys) => {
                debug!("Master password accepted");
                Ok(AuthOutcome::Authenticated(keys))
            }
            None => {
                warn!("Master password rejected");
                Ok(AuthOutcome::Rejected)
            }
        }
    }

    /// Startup flow: establish on first run, otherwise verify
    pub fn establish_or_verify(&self, prompt: &mut dyn PasswordPrompt) -> Result<AuthOutcome> {
        if self.is_established() {
            let password = prompt.master_password()?;
            self.verify(password.expose())
        } else {
            let password = prompt.new_master_password()?;
            self.establish(password.expose())?;
            Ok(AuthOutcome::Established)
        }
    }
}
