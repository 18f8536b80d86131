//! Cryptographic primitives for secure credential storage
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption
//! - Argon2id key derivation from the master password
//! - The per-session credential cipher
//! - Secure memory handling with zeroize

mod cipher;
mod encryption;
mod key_derivation;
mod secure_memory;

pub use cipher::CredentialCipher;
pub use encryption::{
    decrypt, encrypt, encrypt_with_nonce, generate_nonce, EncryptedData, NONCE_LEN, TAG_LEN,
};
pub use key_derivation::{
    derive_keys, generate_salt, DerivedKeys, KeyDerivationParams, SALT_LEN, VERIFIER_LEN,
};
pub use secure_memory::{MasterKey, SecretString, KEY_LEN};
