//! Default `SQLite` executor
//!
//! A single rusqlite connection shared behind a mutex. Suited to development,
//! tests and small embedded stores.

#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::cast_possible_truncation)]

use std::sync::Arc;

use anyhow::{Context, Result};
use fromenv::FromEnv;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection as SqliteConnection, params_from_iter};
use tabula_orm::{Backend, DataType, ExecResult, Executor, Field, Record, Row, Table};
use tracing::instrument;

/// Driver identifier passed to [`Table`] for `SQLite` connections.
pub const DRIVER: &str = "sqlite3";

/// Options used to connect to the `SQLite` database.
///
/// Loaded from environment variables by [`Backend::connect`].
#[derive(Debug, Clone, FromEnv)]
pub struct ConnectOptions {
    /// Database path or URI.
    #[env(from = "SQL_DATABASE", default = "file::memory:?cache=shared")]
    pub database: String,
}

impl tabula_orm::FromEnv for ConnectOptions {
    fn from_env() -> Result<Self> {
        Self::from_env().finalize().context("issue loading connection options")
    }
}

/// Default [`Executor`] backed by `SQLite`.
#[derive(Debug, Clone)]
pub struct SqlDefault {
    // Mutex is necessary since rusqlite::Connection isn't `Sync`
    conn: Arc<parking_lot::Mutex<SqliteConnection>>,
}

impl Backend for SqlDefault {
    type ConnectOptions = ConnectOptions;

    #[instrument]
    fn connect_with(options: Self::ConnectOptions) -> Result<Self> {
        tracing::debug!("initializing SQLite connection to: {}", options.database);

        let conn = Arc::new(parking_lot::Mutex::new(
            SqliteConnection::open(&options.database).context("failed to open SQLite database")?,
        ));

        Ok(Self { conn })
    }
}

impl SqlDefault {
    /// A [`Table`] for `R` on this connection, named after the record type.
    #[must_use]
    pub fn table<R: Record>(&self) -> Table<R> {
        Table::new(Arc::new(self.clone()), DRIVER)
    }
}

impl Executor for SqlDefault {
    fn exec(&self, query: &str, params: &[DataType]) -> Result<ExecResult> {
        tracing::debug!("executing statement: {query}");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(query).context("failed to prepare statement")?;

        let values = params.iter().map(datatype_to_rusqlite_value).collect::<Result<Vec<_>>>()?;
        let rows_affected = stmt
            .execute(params_from_iter(values.iter()))
            .context("failed to execute statement")?;

        // rowid 0 means nothing has been inserted on this connection
        let rowid = conn.last_insert_rowid();
        Ok(ExecResult {
            rows_affected: rows_affected as u64,
            last_insert_id: (rowid != 0).then_some(rowid),
        })
    }

    fn query(&self, query: &str, params: &[DataType]) -> Result<Vec<Row>> {
        tracing::debug!("executing query: {query}");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(query).context("failed to prepare statement")?;

        let values = params.iter().map(datatype_to_rusqlite_value).collect::<Result<Vec<_>>>()?;
        let column_names: Vec<String> =
            stmt.column_names().iter().map(ToString::to_string).collect();

        let mut rows =
            stmt.query(params_from_iter(values.iter())).context("failed to execute query")?;

        let mut result_rows = Vec::new();
        let mut index = 0;
        while let Some(row) = rows.next().context("failed to fetch row")? {
            let mut fields = Vec::with_capacity(column_names.len());

            for (i, name) in column_names.iter().enumerate() {
                let value = row.get_ref(i).context("failed to get column value")?;
                fields.push(Field {
                    name: name.clone(),
                    value: rusqlite_value_to_datatype(value)?,
                });
            }

            result_rows.push(Row {
                index: index.to_string(),
                fields,
            });
            index += 1;
        }

        Ok(result_rows)
    }
}

fn datatype_to_rusqlite_value(dt: &DataType) -> Result<Value> {
    let value = match dt {
        DataType::Boolean(Some(b)) => Value::Integer(i64::from(*b)),
        DataType::Int32(Some(i)) => Value::Integer(i64::from(*i)),
        DataType::Int64(Some(i)) => Value::Integer(*i),
        DataType::Uint32(Some(u)) => Value::Integer(i64::from(*u)),
        DataType::Uint64(Some(u)) => {
            Value::Integer(i64::try_from(*u).context("u64 parameter out of range")?)
        }
        DataType::Float(Some(f)) => Value::Real(f64::from(*f)),
        DataType::Double(Some(f)) => Value::Real(*f),
        DataType::Str(Some(s))
        | DataType::Date(Some(s))
        | DataType::Timestamp(Some(s)) => Value::Text(s.clone()),
        DataType::Binary(Some(b)) => Value::Blob(b.clone()),
        // All None variants map to NULL
        _ => Value::Null,
    };
    Ok(value)
}

fn rusqlite_value_to_datatype(value: ValueRef) -> Result<DataType> {
    match value {
        ValueRef::Null => Ok(DataType::Str(None)),
        ValueRef::Integer(i) => Ok(DataType::Int64(Some(i))),
        ValueRef::Real(f) => Ok(DataType::Double(Some(f))),
        ValueRef::Text(t) => {
            let s = std::str::from_utf8(t).context("invalid UTF-8 in text value")?;
            Ok(DataType::Str(Some(s.to_string())))
        }
        ValueRef::Blob(b) => Ok(DataType::Binary(Some(b.to_vec()))),
    }
}
