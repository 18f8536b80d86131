//! # vault-core
//!
//! Core functionality for passvault, a local password vault:
//! - Master password verification with salted Argon2id
//! - AES-256-GCM encryption of stored passwords, bound to their record
//! - SQLite credential storage with zeroize-on-drop secrets
//! - Random password generation from the OS CSPRNG

pub mod credential;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod generator;
pub mod master;
pub mod session;
pub mod settings;
pub mod storage;
mod vault;

pub use credential::{Credential, CredentialManager, DecryptedCredential};
pub use crypto::{CredentialCipher, KeyDerivationParams, MasterKey, SecretString};
pub use error::{Result, VaultError};
pub use generator::{generate_password, CharsetFlags};
pub use master::{AuthOutcome, MasterAuthenticator, MasterSecret, PasswordPrompt};
pub use session::VaultSession;
pub use settings::{Settings, SettingsManager};
pub use storage::{CredentialStore, SqliteCredentialStore, StoreLock};
pub use vault::{Startup, Vault, VaultState};
