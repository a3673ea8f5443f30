//! Key-value store over a single `kv` table.

use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tabula_orm::{Error, Executor, Record, Result, Table};

use crate::default_impl::DRIVER;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS kv (
    key VARCHAR(255) PRIMARY KEY,
    value BLOB NOT NULL,
    updated_at BIGINT NOT NULL
)";

/// Source of the `updated_at` timestamps written by [`KvStore`].
pub trait Clock: Send + Sync {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] reading the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Default, Record)]
#[record(table = "kv")]
struct Entry {
    #[record(primary_key)]
    key: String,
    value: Vec<u8>,
    updated_at: i64,
}

/// Persistent settings keyed by string.
///
/// Values are stored as bytes; the typed accessors encode strings as UTF-8,
/// integers as decimal text and structured values as JSON. Saving a key
/// replaces any previous value.
pub struct KvStore<C: Clock = SystemClock> {
    table: Table<Entry>,
    clock: C,
    lock: RwLock<()>,
}

impl<C: Clock> KvStore<C> {
    /// Opens the store on `executor`, creating the `kv` table if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created.
    pub fn open(executor: Arc<dyn Executor>, clock: C) -> Result<Self> {
        executor.exec(CREATE_TABLE, &[]).map_err(|e| {
            tracing::error!("failed to create kv table: {e:#}");
            Error::Exec(e)
        })?;

        Ok(Self {
            table: Table::new(executor, DRIVER),
            clock,
            lock: RwLock::new(()),
        })
    }

    /// Stores raw bytes under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_data(&self, key: &str, data: &[u8]) -> Result<()> {
        let mut entry = Entry {
            key: key.to_string(),
            value: data.to_vec(),
            updated_at: self.clock.now().timestamp_millis(),
        };

        let _guard = self.lock.write();
        self.table.save(&mut entry).inspect_err(|e| tracing::error!(key, "save failed: {e}"))
    }

    /// Reads the bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for a missing key, or an error if the read
    /// fails.
    pub fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        let mut entry = Entry::default();

        let _guard = self.lock.read();
        self.table.select_one(&mut entry, "key = ?", &[key.into()])?;
        Ok(entry.value)
    }

    /// Stores a string under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_string(&self, key: &str, value: &str) -> Result<()> {
        self.save_data(key, value.as_bytes())
    }

    /// Reads the string stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for a missing key, or an error if the read
    /// fails or the value is not UTF-8.
    pub fn get_string(&self, key: &str) -> Result<String> {
        String::from_utf8(self.get_data(key)?).map_err(|e| Error::Decode {
            column: "value".to_string(),
            source: e.into(),
        })
    }

    /// Stores an integer under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_i64(&self, key: &str, value: i64) -> Result<()> {
        self.save_string(key, &value.to_string())
    }

    /// Reads the integer stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for a missing key, or an error if the read
    /// fails or the value is not an integer.
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value.trim().parse().map_err(|_e| Error::Decode {
            column: "value".to_string(),
            source: anyhow!("invalid integer: {value}"),
        })
    }

    /// Stores `value` as a JSON document under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized or the write fails.
    pub fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let data = serde_json::to_vec(value).map_err(|source| Error::Encode {
            column: "value".to_string(),
            source: source.into(),
        })?;
        self.save_data(key, &data)
    }

    /// Reads the JSON document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for a missing key, or an error if the read
    /// fails or the document does not describe `T`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        serde_json::from_slice(&self.get_data(key)?).map_err(|e| Error::Decode {
            column: "value".to_string(),
            source: e.into(),
        })
    }

    /// Removes `key`, returning whether it was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let _guard = self.lock.write();
        Ok(self.table.delete("key = ?", &[key.into()])? > 0)
    }
}

impl<C: Clock> fmt::Debug for KvStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvStore").field("table", &self.table).finish_non_exhaustive()
    }
}
