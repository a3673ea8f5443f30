//! Upsert strategy per SQL driver.

use crate::error::Result;
use crate::query::{Query, QueryBuilder};
use crate::record::Record;

/// How a [`Table`](crate::Table) writes "insert or update" for its driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    /// `INSERT … ON DUPLICATE KEY UPDATE`.
    MySql,
    /// `INSERT OR REPLACE INTO …`.
    Sqlite,
    /// Any other driver. Saving panics; every other operation works.
    Unsupported(String),
}

impl Dialect {
    /// Selects the dialect for a driver identifier such as `"mysql"` or
    /// `"sqlite3"`.
    #[must_use]
    pub fn from_driver(driver: &str) -> Self {
        match driver {
            "mysql" => Self::MySql,
            "sqlite3" | "sqlite" => Self::Sqlite,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Build the upsert statement for `record`.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be encoded.
    ///
    /// # Panics
    ///
    /// Panics for [`Dialect::Unsupported`].
    pub fn upsert<R: Record>(&self, builder: &QueryBuilder<'_>, record: &R) -> Result<Query> {
        match self {
            Self::MySql => builder.insert_or_update(record),
            Self::Sqlite => builder.insert_or_replace(record),
            Self::Unsupported(driver) => panic!("save is not supported for driver: {driver}"),
        }
    }
}
