//! Error types for vault-core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Vault error types
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Ciphertext failed authentication (tampered, corrupted, or wrong key)
    #[error("Integrity check failed: {0}")]
    IntegrityError(String),

    #[error("Incorrect master password")]
    AuthenticationFailure,

    #[error("Vault is not initialized - set a master password first")]
    NotInitialized,

    #[error("Vault is already initialized")]
    AlreadyInitialized,

    #[error("Vault is in use by another process (lock file {})", .0.display())]
    StoreLocked(PathBuf),

    /// Credentials exist but the master file that unlocks them is gone
    #[error("Credential database {} exists without a master file; restore the master file or move the database aside", .0.display())]
    OrphanedDatabase(PathBuf),

    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
