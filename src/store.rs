use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::error::StoreError;

/// String-keyed blob storage underneath `KvStore`
pub trait StoreBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// SQLite-backed store, one row per key
#[derive(Debug)]
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open the store under the user's state directory, creating it if needed
    pub fn open_default() -> Result<Self, StoreError> {
        let path = AppDirs::db_path().ok_or_else(|| {
            StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no state directory available",
            ))
        })?;
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }
}

impl StoreBackend for SqliteBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }
}

/// In-process backend. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.map.lock() {
            map.insert(key.to_string(), value.to_string());
        }
    }
}

fn poisoned() -> StoreError {
    StoreError::Io(std::io::Error::other("memory store lock poisoned"))
}

impl StoreBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map.lock().map_err(|_| poisoned())?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.map
            .lock()
            .map_err(|_| poisoned())?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.map.lock().map_err(|_| poisoned())?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.map.lock().map_err(|_| poisoned())?.clear();
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct Expiring<T> {
    value: T,
    /// Unix milliseconds
    expiry: i64,
}

/// JSON key-value layer with optional per-key expiry.
///
/// Never fails: with no backend every read is `None` and every write is
/// dropped; backend errors are logged and treated the same way.
pub struct KvStore {
    backend: Option<Box<dyn StoreBackend>>,
}

impl KvStore {
    pub fn new(backend: Box<dyn StoreBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A store with no durable backend (headless runs, `--no-persist`)
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    pub fn open_default() -> Self {
        match SqliteBackend::open_default() {
            Ok(backend) => Self::new(Box::new(backend)),
            Err(e) => {
                log::warn!("durable store unavailable, persistence disabled: {e}");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    fn raw_get(&self, key: &str) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.get(key) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("error reading [{key}] from store: {e}");
                None
            }
        }
    }

    fn raw_set(&self, key: &str, value: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        if let Err(e) = backend.set(key, value) {
            log::warn!("error writing [{key}] to store: {e}");
        }
    }

    /// True if anything at all is stored under `key`, expired or not
    pub fn contains_key(&self, key: &str) -> bool {
        self.raw_get(key).is_some()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = self.raw_get(key)?;
        match serde_json::from_str(&text) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("discarding unreadable value under [{key}]: {e}");
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(text) => self.raw_set(key, &text),
            Err(e) => log::warn!("error serializing [{key}]: {e}"),
        }
    }

    pub fn remove(&self, key: &str) {
        if let Some(backend) = self.backend.as_ref() {
            if let Err(e) = backend.remove(key) {
                log::warn!("error removing [{key}] from store: {e}");
            }
        }
    }

    pub fn clear(&self) {
        if let Some(backend) = self.backend.as_ref() {
            if let Err(e) = backend.clear() {
                log::warn!("error clearing store: {e}");
            }
        }
    }

    pub fn set_with_expiry<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        self.set_with_expiry_at(key, value, ttl, Utc::now());
    }

    pub fn get_with_expiry<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_with_expiry_at(key, Utc::now())
    }

    pub(crate) fn set_with_expiry_at<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        now: DateTime<Utc>,
    ) {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let entry = Expiring {
            value,
            expiry: now.timestamp_millis().saturating_add(ttl_ms),
        };
        self.set(key, &entry);
    }

    /// Expired entries are deleted before reporting absence
    pub(crate) fn get_with_expiry_at<T: DeserializeOwned>(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Option<T> {
        let entry: Expiring<T> = self.get(key)?;
        if now.timestamp_millis() > entry.expiry {
            log::debug!("evicting expired entry [{key}]");
            self.remove(key);
            return None;
        }
        Some(entry.value)
    }
}
