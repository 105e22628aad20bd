// ============================================================================
// UserStore — Embedded Database (redb)
// ============================================================================
// Persistent local storage for registered storefront users.
// Default path: ~/.stylesync/storefront.redb (override via STYLESYNC_DB_PATH)
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

// Keyed by lowercased email
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// A registered storefront user. Passwords are stored as SHA-256 digests;
/// there is no session or token issuance here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_digest: String,
    pub created_at: i64,
}

/// Embedded database for storefront user accounts
pub struct UserStore {
    db: Database,
    path: PathBuf,
}

impl UserStore {
    /// Open (or create) the database at the given path.
    /// If `path` is None, uses STYLESYNC_DB_PATH or ~/.stylesync/storefront.redb
    pub fn open(path: Option<&str>) -> Result<Self> {
        let db_path = if let Some(p) = path {
            PathBuf::from(p)
        } else if let Ok(env_path) = std::env::var("STYLESYNC_DB_PATH") {
            PathBuf::from(env_path)
        } else {
            let home =
                dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
            let app_dir = home.join(".stylesync");
            std::fs::create_dir_all(&app_dir)
                .map_err(|e| anyhow!("Failed to create .stylesync directory: {}", e))?;
            app_dir.join("storefront.redb")
        };

        info!("Opening user database at: {}", db_path.display());

        let db = Database::create(&db_path)
            .map_err(|e| anyhow!("Failed to open database: {}", e))?;

        // Ensure the table exists by doing a write transaction
        let write_txn = db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let _ = write_txn
                .open_table(USERS)
                .map_err(|e| anyhow!("Failed to create users table: {}", e))?;
        }
        write_txn
            .commit()
            .map_err(|e| anyhow!("Failed to commit init: {}", e))?;

        Ok(Self { db, path: db_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a new user. The caller is responsible for checking the email is
    /// not already registered.
    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<UserRecord> {
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: normalize_email(email),
            password_digest: digest_password(password),
            created_at: chrono::Utc::now().timestamp(),
        };

        let value = bincode::serialize(&record)
            .map_err(|e| anyhow!("Failed to serialize user: {}", e))?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let mut table = write_txn
                .open_table(USERS)
                .map_err(|e| anyhow!("Failed to open users table: {}", e))?;
            table
                .insert(record.email.as_str(), value.as_slice())
                .map_err(|e| anyhow!("Failed to insert user: {}", e))?;
        }
        write_txn
            .commit()
            .map_err(|e| anyhow!("Failed to commit: {}", e))?;

        debug!("Stored user: {}", record.email);
        Ok(record)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let key = normalize_email(email);

        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| anyhow!("Failed to begin read: {}", e))?;
        let table = read_txn
            .open_table(USERS)
            .map_err(|e| anyhow!("Failed to open users table: {}", e))?;

        match table
            .get(key.as_str())
            .map_err(|e| anyhow!("Failed to get user: {}", e))?
        {
            Some(value) => {
                let record: UserRecord = bincode::deserialize(value.value())
                    .map_err(|e| anyhow!("Failed to deserialize user: {}", e))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    pub fn count(&self) -> Result<usize> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| anyhow!("Failed to begin read: {}", e))?;
        let table = read_txn
            .open_table(USERS)
            .map_err(|e| anyhow!("Failed to open users table: {}", e))?;

        let mut total = 0;
        let iter = table
            .range::<&str>(..)
            .map_err(|e| anyhow!("Failed to iterate users: {}", e))?;
        for entry in iter {
            entry.map_err(|e| anyhow!("Failed to read entry: {}", e))?;
            total += 1;
        }
        Ok(total)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn digest_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (UserStore, PathBuf) {
        let path = std::env::temp_dir().join(format!("stylesync-test-{}.redb", Uuid::new_v4()));
        let store = UserStore::open(Some(path.to_str().unwrap())).unwrap();
        (store, path)
    }

    #[test]
    fn test_register_and_find_round_trip() {
        let (store, path) = temp_store();

        let user = store
            .register("ada", "Ada@Example.com", "hunter2")
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password_digest, "hunter2");

        let found = store.find_by_email("ada@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(store.count().unwrap(), 1);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_missing_user_is_none() {
        let (store, path) = temp_store();
        assert!(store.find_by_email("nobody@example.com").unwrap().is_none());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_store_persists_across_reopen() {
        let (store, path) = temp_store();
        store.register("bo", "bo@example.com", "pw").unwrap();
        drop(store);

        let reopened = UserStore::open(Some(path.to_str().unwrap())).unwrap();
        assert!(reopened.find_by_email("bo@example.com").unwrap().is_some());

        let _ = std::fs::remove_file(path);
    }
}
