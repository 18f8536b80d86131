//! SQLite credential store
//!
//! Each operation opens its own connection and drops it before returning,
//! so the database file is never held open between operations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use super::CredentialStore;
use crate::credential::{Credential, NewCredential, StoredCredential};
use crate::error::{Result, VaultError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS credentials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    website TEXT NOT NULL,
    username TEXT NOT NULL,
    password TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_credentials_site_user ON credentials (website, username);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Credential store backed by a SQLite database file
#[derive(Debug)]
pub struct SqliteCredentialStore {
    path: PathBuf,
}

impl SqliteCredentialStore {
    /// Open (or create) the database at `path` and ensure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        let created = !path.exists();
        let store = Self {
            path: path.to_path_buf(),
        };

        let conn = store.connect()?;
        conn.execute_batch(SCHEMA)?;
        drop(conn);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if created {
                std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
            }
        }

        debug!("Credential database ready at {:?} (created: {})", path, created);
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| VaultError::StorageError(format!("Invalid timestamp {:?}: {}", value, e)))
}

impl CredentialStore for SqliteCredentialStore {
    fn insert(&self, credential: &NewCredential) -> Result<i64> {
        let conn = self.connect()?;
        let timestamp = credential.created_at.to_rfc3339();

        conn.execute(
            "INSERT INTO credentials (website, username, password, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![
                credential.website,
                credential.username,
                credential.encrypted_password,
                timestamp
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!("Inserted credential row {}", id);
        Ok(id)
    }

    fn list(&self) -> Result<Vec<StoredCredential>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, website, username, password, created_at, updated_at
             FROM credentials ORDER BY id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(id, website, username, encrypted_password, created_at, updated_at)| {
                    Ok(StoredCredential {
                        credential: Credential {
                            id,
                            website,
                            username,
                            created_at: parse_timestamp(&created_at)?,
                            updated_at: parse_timestamp(&updated_at)?,
                        },
                        encrypted_password,
                    })
                },
            )
            .collect()
    }

    fn update_password(&self, website: &str, username: &str, encrypted_password: &str) -> Result<usize> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE credentials SET password = ?1, updated_at = ?2
             WHERE website = ?3 AND username = ?4",
            params![encrypted_password, Utc::now().to_rfc3339(), website, username],
        )?;

        debug!("Updated {} credential row(s)", changed);
        Ok(changed)
    }

    fn delete(&self, website: &str, username: &str) -> Result<usize> {
        let conn = self.connect()?;
        let removed = conn.execute(
            "DELETE FROM credentials WHERE website = ?1 AND username = ?2",
            params![website, username],
        )?;

        debug!("Deleted {} credential row(s)", removed);
        Ok(removed)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM credentials", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|e| VaultError::StorageError(e.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "SQLite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (SqliteCredentialStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteCredentialStore::open(&temp_dir.path().join("passwords.db")).unwrap();
        (store, temp_dir)
    }

    fn new_credential(website: &str, username: &str, blob: &str) -> NewCredential {
        NewCredential {
            website: website.to_string(),
            username: username.to_string(),
            encrypted_password: blob.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_list() {
        let (store, _temp) = test_store();

        let first = store.insert(&new_credential("example.com", "alice", "blob-1")).unwrap();
        let second = store.insert(&new_credential("example.org", "bob", "blob-2")).unwrap();
        assert!(second > first);

        let rows = store.list().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].credential.id, first);
        assert_eq!(rows[0].credential.website, "example.com");
        assert_eq!(rows[0].credential.username, "alice");
        assert_eq!(rows[0].encrypted_password, "blob-1");
        assert_eq!(rows[1].credential.username, "bob");
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_update_password() {
        let (store, _temp) = test_store();
        store.insert(&new_credential("example.com", "alice", "old")).unwrap();

        assert_eq!(store.update_password("example.com", "alice", "new").unwrap(), 1);

        let rows = store.list().unwrap();
        assert_eq!(rows[0].encrypted_password, "new");
        assert!(rows[0].credential.updated_at >= rows[0].credential.created_at);
    }

    #[test]
    fn test_update_missing_affects_nothing() {
        let (store, _temp) = test_store();
        store.insert(&new_credential("example.com", "alice", "old")).unwrap();

        assert_eq!(store.update_password("example.com", "bob", "new").unwrap(), 0);
        assert_eq!(store.list().unwrap()[0].encrypted_password, "old");
    }

    #[test]
    fn test_delete() {
        let (store, _temp) = test_store();
        store.insert(&new_credential("example.com", "alice", "a")).unwrap();
        store.insert(&new_credential("example.com", "bob", "b")).unwrap();

        assert_eq!(store.delete("example.com", "alice").unwrap(), 1);
        assert_eq!(store.delete("example.com", "alice").unwrap(), 0);

        let rows = store.list().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].credential.username, "bob");
    }

    #[test]
    fn test_input_is_not_interpreted_as_sql() {
        let (store, _temp) = test_store();
        store.insert(&new_credential("example.com", "alice", "a")).unwrap();

        assert_eq!(store.delete("x' OR '1'='1", "y' OR '1'='1").unwrap(), 0);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("passwords.db");

        {
            let store = SqliteCredentialStore::open(&path).unwrap();
            store.insert(&new_credential("example.com", "alice", "blob")).unwrap();
        }

        let store = SqliteCredentialStore::open(&path).unwrap();
        assert_eq!(store.list().unwrap()[0].encrypted_password, "blob");
        assert_eq!(store.backend_name(), "SQLite");
    }
}
