//! Credential type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::SecretString;

/// Credential metadata (safe to display)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Row identifier assigned by the store
    pub id: i64,

    /// Website or service the login belongs to (e.g., "example.com")
    pub website: String,

    /// Account name on that website
    pub username: String,

    /// Created timestamp
    pub created_at: DateTime<Utc>,

    /// Last time the password was replaced
    pub updated_at: DateTime<Utc>,
}

/// Stored credential (encrypted)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    /// Credential metadata
    pub credential: Credential,

    /// Encrypted password (nonce:tag:ciphertext format)
    pub encrypted_password: String,
}

/// Credential about to be inserted; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub website: String,
    pub username: String,
    pub encrypted_password: String,
    pub created_at: DateTime<Utc>,
}

/// Credential with its decrypted password - the password is zeroed when dropped
pub struct DecryptedCredential {
    pub credential: Credential,
    password: SecretString,
}

impl DecryptedCredential {
    pub fn new(credential: Credential, password: SecretString) -> Self {
        Self {
            credential,
            password,
        }
    }

    /// Get the password (use carefully)
    pub fn expose(&self) -> &str {
        self.password.expose()
    }

    pub fn website(&self) -> &str {
        &self.credential.website
    }

    pub fn username(&self) -> &str {
        &self.credential.username
    }
}

impl std::fmt::Debug for DecryptedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptedCredential")
            .field("credential", &self.credential)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
