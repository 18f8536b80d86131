//! Master file format
//!
//! One text line:
//! `passvault:v1:argon2id:m={KiB},t={iterations},p={lanes}:{salt_hex}:{verifier_hex}`

use std::path::Path;

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::crypto::{
    derive_keys, generate_salt, DerivedKeys, KeyDerivationParams, SALT_LEN, VERIFIER_LEN,
};
use crate::error::{Result, VaultError};
use crate::fs::write_atomic;

const MAGIC: &str = "passvault";
const FORMAT_VERSION: &str = "v1";
const KDF_ALGORITHM: &str = "argon2id";

/// Persisted master password verifier with the salt and KDF parameters used
#[derive(Clone, PartialEq, Eq)]
pub struct MasterSecret {
    pub params: KeyDerivationParams,
    pub salt: [u8; SALT_LEN],
    pub verifier: [u8; VERIFIER_LEN],
}

// Salt and verifier together allow an offline guessing attack
impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterSecret")
            .field("params", &self.params)
            .field("salt", &"[REDACTED]")
            .field("verifier", &"[REDACTED]")
            .finish()
    }
}

impl std::fmt::Display for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:m={},t={},p={}:{}:{}",
            MAGIC,
            FORMAT_VERSION,
            KDF_ALGORITHM,
            self.params.memory_cost,
            self.params.time_cost,
            self.params.parallelism,
            hex::encode(self.salt),
            hex::encode(self.verifier)
        )
    }
}

impl MasterSecret {
    /// Derive a verifier for a new master password under a fresh salt
    ///
    /// Returns the secret to persist together with the derived keys.
    pub fn create(password: &str, params: &KeyDerivationParams) -> Result<(Self, DerivedKeys)> {
        let salt = generate_salt();
        let keys = derive_keys(password, &salt, params)?;

        let secret = Self {
            params: *params,
            salt,
            verifier: *keys.verifier(),
        };
        Ok((secret, keys))
    }

    /// Derive with the stored salt and parameters and compare in constant time
    ///
    /// Returns the derived keys when the password matches.
    pub fn verify(&self, password: &str) -> Result<Option<DerivedKeys>> {
        let keys = derive_keys(password, &self.salt, &self.params)?;

        if bool::from(keys.verifier().ct_eq(&self.verifier)) {
            Ok(Some(keys))
        } else {
            Ok(None)
        }
    }

    /// Parse the master file line
    pub fn from_string(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 6 {
            return Err(VaultError::ParseError(format!(
                "Invalid master file: expected 6 fields, got {}",
                parts.len()
            )));
        }

        if parts[0] != MAGIC {
            return Err(VaultError::ParseError("Not a passvault master file".to_string()));
        }
        if parts[1] != FORMAT_VERSION {
            return Err(VaultError::ParseError(format!(
                "Unsupported master file version: {}",
                parts[1]
            )));
        }
        if parts[2] != KDF_ALGORITHM {
            return Err(VaultError::ParseError(format!(
                "Unsupported key derivation function: {}",
                parts[2]
            )));
        }

        let params = parse_params(parts[3])?;
        params
            .validate()
            .map_err(|e| VaultError::ParseError(format!("Invalid KDF parameters: {}", e)))?;

        let salt = decode_fixed::<SALT_LEN>("salt", parts[4])?;
        let verifier = decode_fixed::<VERIFIER_LEN>("verifier", parts[5])?;

        Ok(Self {
            params,
            salt,
            verifier,
        })
    }

    /// Read the master file, `None` if it does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            debug!("No master file at {:?}", path);
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_string(&contents).map(Some)
    }

    /// Write the master file atomically; an existing file is never replaced
    pub fn persist(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Err(VaultError::AlreadyInitialized);
        }

        write_atomic(path, format!("{}\n", self).as_bytes())?;
        debug!("Saved master file to {:?}", path);
        Ok(())
    }
}

fn parse_params(field: &str) -> Result<KeyDerivationParams> {
    let values: Vec<(&str, &str)> = field
        .split(',')
        .map(|pair| pair.split_once('='))
        .collect::<Option<_>>()
        .ok_or_else(|| VaultError::ParseError(format!("Invalid KDF parameters: {}", field)))?;

    let value = |name: &str| -> Result<u32> {
        values
            .iter()
            .find(|(key, _)| *key == name)
            .ok_or_else(|| VaultError::ParseError(format!("Missing KDF parameter: {}", name)))?
            .1
            .parse::<u32>()
            .map_err(|e| VaultError::ParseError(format!("Invalid KDF parameter {}: {}", name, e)))
    };

    if values.len() != 3 {
        return Err(VaultError::ParseError(format!("Invalid KDF parameters: {}", field)));
    }

    Ok(KeyDerivationParams::new(value("m")?, value("t")?, value("p")?))
}

fn decode_fixed<const N: usize>(name: &str, field: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(field)
        .map_err(|e| VaultError::ParseError(format!("Invalid {} hex: {}", name, e)))?;

    bytes.as_slice().try_into().map_err(|_| {
        VaultError::ParseError(format!(
            "Invalid {} length: expected {}, got {}",
            name,
            N,
            bytes.len()
        ))
    })
}
