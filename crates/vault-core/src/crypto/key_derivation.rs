//! Password-based key derivation using Argon2id
//!
//! A single Argon2id run over the master password and the installation salt
//! yields 64 bytes. The first half is the verifier persisted in the master
//! file, the second half is the AES-256 session key, which never touches disk.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use super::secure_memory::{MasterKey, KEY_LEN};
use crate::error::{Result, VaultError};

/// Length of the installation salt in bytes
pub const SALT_LEN: usize = 16;

/// Length of the stored password verifier in bytes
pub const VERIFIER_LEN: usize = 32;

const OUTPUT_LEN: usize = VERIFIER_LEN + KEY_LEN;

/// Parameters for Argon2id key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDerivationParams {
    /// Memory cost in KiB (default: 65536 = 64MB)
    pub memory_cost: u32,
    /// Time cost / iterations (default: 3)
    pub time_cost: u32,
    /// Parallelism (default: 4)
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KeyDerivationParams {
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// Check the parameters against the limits Argon2 accepts
    pub fn validate(&self) -> Result<()> {
        self.to_argon2().map(|_| ())
    }

    fn to_argon2(self) -> Result<Params> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(OUTPUT_LEN),
        )
        .map_err(|e| VaultError::KeyDerivationError(e.to_string()))
    }
}

/// Output of a master password derivation
pub struct DerivedKeys {
    verifier: Zeroizing<[u8; VERIFIER_LEN]>,
    key: MasterKey,
}

impl DerivedKeys {
    /// Value persisted in the master file and compared on unlock
    pub fn verifier(&self) -> &[u8; VERIFIER_LEN] {
        &self.verifier
    }

    /// Session key for the credential cipher
    pub fn key(&self) -> &MasterKey {
        &self.key
    }

    /// Discard the verifier and keep only the session key
    pub fn into_key(self) -> MasterKey {
        self.key
    }
}

impl std::fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeys")
            .field("verifier", &"[REDACTED]")
            .field("key", &self.key)
            .finish()
    }
}

/// Generate a cryptographically secure random salt
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive the verifier and session key from a master password using Argon2id
///
/// # Arguments
/// * `password` - The master password
/// * `salt` - The installation salt (at least 16 bytes, see `generate_salt()`)
/// * `params` - Argon2id cost parameters
pub fn derive_keys(
    password: &str,
    salt: &[u8],
    params: &KeyDerivationParams,
) -> Result<DerivedKeys> {
    if salt.len() < SALT_LEN {
        return Err(VaultError::KeyDerivationError(format!(
            "Salt too short: expected at least {} bytes, got {}",
            SALT_LEN,
            salt.len()
        )));
    }

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);

    let mut output = Zeroizing::new([0u8; OUTPUT_LEN]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut output[..])
        .map_err(|e| VaultError::KeyDerivationError(e.to_string()))?;

    let mut verifier = Zeroizing::new([0u8; VERIFIER_LEN]);
    verifier.copy_from_slice(&output[..VERIFIER_LEN]);

    let mut key_bytes = [0u8; KEY_LEN];
    key_bytes.copy_from_slice(&output[VERIFIER_LEN..]);
    let key = MasterKey::new(key_bytes);
    key_bytes.zeroize();

    Ok(DerivedKeys { verifier, key })
}
