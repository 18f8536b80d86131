//! Storage trait definitions

use crate::credential::{NewCredential, StoredCredential};
use crate::error::Result;

/// Trait for credential storage backends
///
/// Backends only ever see encrypted passwords; encryption happens in
/// `CredentialManager` before anything reaches the store.
pub trait CredentialStore {
    /// Insert a record and return its assigned id
    fn insert(&self, credential: &NewCredential) -> Result<i64>;

    /// All records, oldest first
    fn list(&self) -> Result<Vec<StoredCredential>>;

    /// Replace the password of every record matching `(website, username)`.
    /// Returns the number of records changed.
    fn update_password(&self, website: &str, username: &str, encrypted_password: &str) -> Result<usize>;

    /// Remove every record matching `(website, username)`.
    /// Returns the number of records removed.
    fn delete(&self, website: &str, username: &str) -> Result<usize>;

    /// Number of stored records
    fn count(&self) -> Result<usize>;

    /// Get a human-readable name for this storage backend
    fn backend_name(&self) -> &'static str;
}
