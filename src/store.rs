use std::path::Path;
use std::sync::Mutex;

use dashmap::DashMap;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::AppError;
use crate::traits::QuotaStore;

/// The three persisted quota entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum StoreKey {
    LastSendDate,
    MessageCount,
    AlertShownOn,
}

impl StoreKey {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            StoreKey::LastSendDate => "lastSendDate",
            StoreKey::MessageCount => "messageCount",
            StoreKey::AlertShownOn => "alertShownOn",
        }
    }
}

/// Quota entries kept in a single-table SQLite database on the device.
pub(crate) struct SqliteQuotaStore {
    conn: Mutex<Connection>,
}

impl SqliteQuotaStore {
    pub(crate) fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub(crate) fn in_memory() -> Result<Self, AppError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS quota_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|_| AppError::StorageUnavailable("connection poisoned".into()))
    }
}

impl QuotaStore for SqliteQuotaStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>, AppError> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM quota_state WHERE key = ?1",
                params![key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<(), AppError> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO quota_state (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key.as_str(), value],
        )?;
        debug!(key = key.as_str(), value, "Quota entry written");
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<(), AppError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM quota_state WHERE key = ?1", params![key.as_str()])?;
        Ok(())
    }
}

/// Process-lifetime store, used when the database cannot be opened.
#[derive(Default)]
pub(crate) struct MemoryQuotaStore {
    entries: DashMap<StoreKey, String>,
}

impl QuotaStore for MemoryQuotaStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(&key).map(|v| v.value().clone()))
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<(), AppError> {
        self.entries.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<(), AppError> {
        self.entries.remove(&key);
        Ok(())
    }
}
