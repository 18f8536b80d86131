//! Storage backends for credential persistence
//!
//! - `CredentialStore`: the record store seam
//! - `SqliteCredentialStore`: SQLite implementation
//! - `StoreLock`: single-writer lock on the data directory

mod lock;
mod sqlite;
mod traits;

pub use lock::{StoreLock, LOCK_FILE};
pub use sqlite::SqliteCredentialStore;
pub use traits::CredentialStore;
