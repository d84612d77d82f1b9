use redb::Database as RedbDatabase;
use std::path::Path;
use thiserror::Error;

use chrono::Utc;

use super::models::StoredCredentials;
use super::tables::{CREDENTIALS, CREDENTIALS_KEY};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store error: {0}")]
    Redb(#[from] redb::Error),
    #[error("Store error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),
}

/// Persistent holder for the bearer token and its cached role.
///
/// One fixed key, surviving process restarts. Validity of the token is never
/// judged here; the server decides via 401s.
pub struct TokenStore {
    db: RedbDatabase,
}

impl TokenStore {
    /// Open or create the store under the given data directory.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("console.redb");
        let db = RedbDatabase::create(db_path)?;

        // Create the table if it doesn't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CREDENTIALS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Read the stored credentials. `None` means logged out.
    pub fn get(&self) -> Result<Option<StoredCredentials>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CREDENTIALS)?;

        match table.get(CREDENTIALS_KEY)? {
            Some(data) => {
                let creds: StoredCredentials = bincode::deserialize(data.value())?;
                Ok(Some(creds))
            }
            None => Ok(None),
        }
    }

    /// The raw bearer token, if any.
    pub fn token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.get()?.map(|c| c.token))
    }

    /// Store a token and its role, replacing any previous credentials.
    pub fn set(&self, token: &str, role: &str) -> Result<(), StoreError> {
        let creds = StoredCredentials {
            role: role.to_string(),
            saved_at: Utc::now(),
            token: token.to_string(),
        };

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CREDENTIALS)?;
            let data = bincode::serialize(&creds)?;
            table.insert(CREDENTIALS_KEY, data.as_slice())?;
        }
        write_txn.commit()?;

        tracing::debug!(role = %role, "Stored credentials");
        Ok(())
    }

    /// Refresh only the cached role, keeping the token.
    ///
    /// No-op when logged out.
    pub fn set_role(&self, role: &str) -> Result<(), StoreError> {
        match self.get()? {
            Some(creds) => self.set(&creds.token, role),
            None => Ok(()),
        }
    }

    /// Remove the stored credentials, reporting whether any were present.
    pub fn clear(&self) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(CREDENTIALS)?;
            let was_present = table.remove(CREDENTIALS_KEY)?.is_some();
            was_present
        };
        write_txn.commit()?;

        if removed {
            tracing::debug!("Cleared credentials");
        }
        Ok(removed)
    }
}
