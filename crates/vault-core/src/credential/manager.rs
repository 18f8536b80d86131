//! Credential manager for CRUD operations

use chrono::Utc;
use tracing::{debug, info, warn};

use super::types::{Credential, DecryptedCredential, NewCredential};
use crate::crypto::CredentialCipher;
use crate::error::{Result, VaultError};
use crate::storage::CredentialStore;

/// Encrypting facade over a credential store
///
/// Plaintext passwords go in through `add`/`update_password` and come back
/// out only through `list_decrypted`; the store sees ciphertext only.
pub struct CredentialManager {
    /// Storage backend
    store: Box<dyn CredentialStore>,
    /// Session cipher
    cipher: CredentialCipher,
}

impl CredentialManager {
    /// Create a new credential manager
    pub fn new(store: Box<dyn CredentialStore>, cipher: CredentialCipher) -> Self {
        Self { store, cipher }
    }

    /// Encrypt and store a new credential
    pub fn add(&self, website: &str, username: &str, password: &str) -> Result<Credential> {
        let website = required_field("website", website)?;
        let username = required_field("username", username)?;

        let encrypted_password = self.cipher.encrypt_password(website, username, password)?;
        let created_at = Utc::now();

        let id = self.store.insert(&NewCredential {
            website: website.to_string(),
            username: username.to_string(),
            encrypted_password,
            created_at,
        })?;

        info!("Added credential {} for {}", id, website);
        Ok(Credential {
            id,
            website: website.to_string(),
            username: username.to_string(),
            created_at,
            updated_at: created_at,
        })
    }

    /// List all credentials without decrypting them
    pub fn list(&self) -> Result<Vec<Credential>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .map(|stored| stored.credential)
            .collect())
    }

    /// Decrypt every stored credential
    ///
    /// A single record failing verification aborts the whole listing.
    pub fn list_decrypted(&self) -> Result<Vec<DecryptedCredential>> {
        let stored = self.store.list()?;
        let mut credentials = Vec::with_capacity(stored.len());

        for record in stored {
            let credential = record.credential;
            let password = self
                .cipher
                .decrypt_password(&credential.website, &credential.username, &record.encrypted_password)
                .map_err(|e| match e {
                    VaultError::IntegrityError(reason) => {
                        warn!("Credential {} failed integrity check", credential.id);
                        VaultError::IntegrityError(format!("credential {}: {}", credential.id, reason))
                    }
                    other => other,
                })?;
            credentials.push(DecryptedCredential::new(credential, password));
        }

        debug!("Decrypted {} credential(s)", credentials.len());
        Ok(credentials)
    }

    /// Replace the password of the matching credential(s)
    ///
    /// Returns the number of records changed; zero means no match.
    pub fn update_password(&self, website: &str, username: &str, new_password: &str) -> Result<usize> {
        let website = required_field("website", website)?;
        let username = required_field("username", username)?;

        let encrypted_password = self.cipher.encrypt_password(website, username, new_password)?;
        let changed = self.store.update_password(website, username, &encrypted_password)?;

        if changed > 0 {
            info!("Updated password for {} ({} record(s))", website, changed);
        } else {
            debug!("No credential matched update for {}", website);
        }
        Ok(changed)
    }

    /// Delete the matching credential(s)
    ///
    /// Returns the number of records removed; zero means no match.
    pub fn delete(&self, website: &str, username: &str) -> Result<usize> {
        let removed = self.store.delete(website.trim(), username.trim())?;

        if removed > 0 {
            info!("Deleted {} credential(s) for {}", removed, website.trim());
        } else {
            debug!("No credential matched delete for {}", website.trim());
        }
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }
}

fn required_field<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(VaultError::InvalidArgument(format!("{} must not be empty", name)));
    }
    Ok(value)
}
