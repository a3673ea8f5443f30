//! # Traits for SQL backends
//!
//! This module contains the capabilities the mapping engine consumes from a
//! concrete database backend.

use anyhow::Result;

use crate::types::{DataType, Row};

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Number of rows changed by the statement.
    pub rows_affected: u64,

    /// Identifier generated for an auto-increment column, when the driver
    /// reports one.
    pub last_insert_id: Option<i64>,
}

/// SQL providers implement [`Executor`] to run the statements generated by a
/// [`Table`](crate::Table).
///
/// Implementations own connection handling and must be safe to share between
/// threads.
pub trait Executor: Send + Sync {
    /// Execute a statement that does not return rows (`INSERT`, `UPDATE`,
    /// `DELETE`, DDL).
    ///
    /// # Errors
    ///
    /// Returns an error if the statement cannot be prepared or executed.
    fn exec(&self, query: &str, params: &[DataType]) -> Result<ExecResult>;

    /// Execute a query and return every resulting row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be prepared or executed.
    fn query(&self, query: &str, params: &[DataType]) -> Result<Vec<Row>>;

    /// Execute a query and return its first row, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be prepared or executed.
    fn query_row(&self, query: &str, params: &[DataType]) -> Result<Option<Row>> {
        Ok(self.query(query, params)?.into_iter().next())
    }
}

/// Implemented by backend resources so they can be connected from
/// configuration.
pub trait Backend: Sized + Sync + Send {
    /// The options used to connect to the backend.
    type ConnectOptions: FromEnv;

    /// Connect to the resource using options loaded from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be loaded or the connection
    /// fails.
    fn connect() -> Result<Self> {
        Self::connect_with(Self::ConnectOptions::from_env()?)
    }

    /// Connect to the resource with the specified options.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    fn connect_with(options: Self::ConnectOptions) -> Result<Self>;
}

/// Trait for creating connection options from environment variables.
pub trait FromEnv: Sized {
    /// Create connection options from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    fn from_env() -> Result<Self>;
}
