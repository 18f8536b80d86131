//! Per-session credential cipher
//!
//! Owns the session key for the lifetime of an unlocked session. Password
//! ciphertexts are bound to their `(website, username)` pair through the
//! GCM associated data, so a blob moved onto another row fails to decrypt.

use zeroize::Zeroize;

use super::encryption::{self, EncryptedData, NONCE_LEN};
use super::{MasterKey, SecretString};
use crate::error::{Result, VaultError};

/// Domain separator for record associated data
const RECORD_AAD_PREFIX: &[u8] = b"passvault:credential:v1";

/// Authenticated encryption context for stored credentials
pub struct CredentialCipher {
    key: MasterKey,
}

impl CredentialCipher {
    pub fn new(key: MasterKey) -> Self {
        Self { key }
    }

    /// Encrypt with a fresh random nonce
    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<EncryptedData> {
        encryption::encrypt(plaintext, &self.key, aad)
    }

    /// Encrypt with an explicit nonce; the nonce must be unique per key
    pub fn encrypt_with_nonce(
        &self,
        plaintext: &[u8],
        nonce: [u8; NONCE_LEN],
        aad: &[u8],
    ) -> Result<EncryptedData> {
        encryption::encrypt_with_nonce(plaintext, &self.key, nonce, aad)
    }

    pub fn decrypt(&self, encrypted: &EncryptedData, aad: &[u8]) -> Result<Vec<u8>> {
        encryption::decrypt(encrypted, &self.key, aad)
    }

    /// Encrypt a credential password into its stored text form
    pub fn encrypt_password(&self, website: &str, username: &str, password: &str) -> Result<String> {
        let aad = record_aad(website, username);
        let encrypted = self.encrypt(password.as_bytes(), &aad)?;
        Ok(encrypted.to_string())
    }

    /// Decrypt a stored credential password
    pub fn decrypt_password(
        &self,
        website: &str,
        username: &str,
        stored: &str,
    ) -> Result<SecretString> {
        let encrypted = EncryptedData::from_string(stored)?;
        let aad = record_aad(website, username);
        let plaintext = self.decrypt(&encrypted, &aad)?;

        String::from_utf8(plaintext)
            .map(SecretString::new)
            .map_err(|e| {
                e.into_bytes().zeroize();
                VaultError::IntegrityError("Decrypted password is not valid UTF-8".to_string())
            })
    }
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCipher")
            .field("key", &self.key)
            .finish()
    }
}

/// Length-prefixed encoding so ("ab", "c") and ("a", "bc") never collide
fn record_aad(website: &str, username: &str) -> Vec<u8> {
    let mut aad = Vec::with_capacity(RECORD_AAD_PREFIX.len() + 16 + website.len() + username.len());
    aad.extend_from_slice(RECORD_AAD_PREFIX);
    for field in [website, username] {
        aad.extend_from_slice(&(field.len() as u64).to_be_bytes());
        aad.extend_from_slice(field.as_bytes());
    }
    aad
}
