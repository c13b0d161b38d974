mod migrations;
mod queries;

use std::io;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::warn;

/// Fixed slot holding the OAuth access token.
pub const ACCESS_TOKEN_SLOT: &str = "access_token";

#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    Migration { version: i64, error: String },
    NoDbPathParent,
    IO(io::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Sqlite(e) => write!(f, "Database error: {}", e),
            StorageError::Migration { version, error } => {
                write!(f, "Migration {} failed: {}", version, error)
            }
            StorageError::NoDbPathParent => write!(f, "db path did not have a parent dir"),
            StorageError::IO(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Sqlite(e)
    }
}

/// Durable single-slot credential holder.
///
/// Implementations never surface errors: a failed read is reported as an
/// absent credential and a failed write is logged.
pub trait TokenStore: Send + Sync {
    /// Overwrites the stored credential.
    fn save(&self, token: &str);
    fn load(&self) -> Option<String>;
    /// Removes the credential. Clearing an empty store is a no-op.
    fn clear(&self);
}

/// Token store backed by a SQLite file in the config directory.
pub struct SqliteTokenStore {
    conn: Mutex<Connection>,
}

impl SqliteTokenStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let parent = path.parent().ok_or(StorageError::NoDbPathParent)?;
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(StorageError::IO)?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        f(&conn)
    }
}

impl TokenStore for SqliteTokenStore {
    fn save(&self, token: &str) {
        if let Err(e) = self.with_conn(|c| queries::save_credential(c, ACCESS_TOKEN_SLOT, token)) {
            warn!(error = %e, "failed to persist access token");
        }
    }

    fn load(&self) -> Option<String> {
        match self.with_conn(|c| queries::load_credential(c, ACCESS_TOKEN_SLOT)) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "failed to read access token");
                None
            }
        }
    }

    fn clear(&self) {
        if let Err(e) = self.with_conn(|c| queries::clear_credential(c, ACCESS_TOKEN_SLOT)) {
            warn!(error = %e, "failed to clear access token");
        }
    }
}

/// Process-local token store, used for `--ephemeral` sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
    }

    fn load(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .filter(|t| !t.is_empty())
    }

    fn clear(&self) {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).take();
    }
}
