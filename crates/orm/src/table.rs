//! # Table
//!
//! A [`Table`] binds a record type to a table name, a driver and an
//! [`Executor`], and exposes single-table CRUD over whole records.
//!
//! ```ignore
//! let posts: Table<Post> = Table::new(Arc::clone(&executor), "sqlite3");
//!
//! let mut post = Post { title: "hello".into(), ..Post::default() };
//! posts.insert(&mut post)?;
//! assert_ne!(post.id, 0);
//!
//! let mut recent = Vec::<Post>::new();
//! posts.select(&mut recent, "id > ? ORDER BY id", &[10.into()])?;
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::anyhow;

use crate::codec::decode_row;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::naming::table_name;
use crate::query::{Query, QueryBuilder, assigns_id};
use crate::record::{FieldMut, Record};
use crate::schema::ColumnMetadata;
use crate::traits::{ExecResult, Executor};
use crate::types::DataType;
use crate::value::Scalar;

/// Single-table access for records of type `R`.
pub struct Table<R: Record> {
    executor: Arc<dyn Executor>,
    name: String,
    dialect: Dialect,
    metadata: Arc<ColumnMetadata>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Table<R> {
    /// Creates a table named after `R` (see [`table_name`]).
    ///
    /// `driver` selects the upsert dialect used by [`Table::save`].
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>, driver: &str) -> Self {
        Self::with_name(executor, driver, table_name::<R>())
    }

    /// Creates a table with an explicit name.
    #[must_use]
    pub fn with_name(executor: Arc<dyn Executor>, driver: &str, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
            dialect: Dialect::from_driver(driver),
            metadata: ColumnMetadata::of::<R>(),
            _record: PhantomData,
        }
    }

    /// The table name used in generated statements.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dialect selected from the driver identifier.
    #[must_use]
    pub const fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Insert `record`.
    ///
    /// When the auto-increment column holds zero it is left to the database
    /// and the generated id is written back into `record` once the insert has
    /// succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be encoded or the statement fails.
    pub fn insert(&self, record: &mut R) -> Result<()> {
        let query = self.builder().insert(record)?;
        self.write(record, query)
    }

    /// Update `record`'s row, matched on its primary key, returning the
    /// number of rows changed. No matching row is not an error.
    ///
    /// A record made only of primary-key columns has nothing to set: no SQL
    /// is issued and zero rows are reported.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be encoded or the statement fails.
    ///
    /// # Panics
    ///
    /// Panics if `R` has no primary key.
    pub fn update(&self, record: &R) -> Result<u64> {
        let Some(query) = self.builder().update(record)? else {
            tracing::debug!(table = %self.name, "update skipped: no columns outside the primary key");
            return Ok(0);
        };
        Ok(self.exec(query)?.rows_affected)
    }

    /// Insert `record`, or overwrite the row sharing its key.
    ///
    /// Generated ids are written back as for [`Table::insert`].
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be encoded or the statement fails.
    ///
    /// # Panics
    ///
    /// Panics, before any SQL is issued, if the driver has no upsert dialect.
    pub fn save(&self, record: &mut R) -> Result<()> {
        let query = self.dialect.upsert(&self.builder(), record)?;
        self.write(record, query)
    }

    /// Append every row matching `predicate` to `records`.
    ///
    /// An empty predicate selects the whole table. `records` keeps its
    /// existing contents and is only extended once every row has decoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn select<T: From<R>>(
        &self, records: &mut Vec<T>, predicate: &str, args: &[DataType],
    ) -> Result<()> {
        let Query { sql, params } = self.builder().select(predicate, args);
        let rows = self.executor.query(&sql, &params).map_err(|e| {
            tracing::error!(table = %self.name, "select failed: {e:#}");
            Error::Query(e)
        })?;

        let decoded = rows
            .iter()
            .map(|row| decode_row::<R>(row, &self.metadata).map(T::from))
            .collect::<Result<Vec<_>>>()?;

        records.extend(decoded);
        Ok(())
    }

    /// Load the first row matching `predicate` into `record`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when nothing matches, or an error if the
    /// query fails or the row cannot be decoded. `record` is untouched on
    /// error.
    pub fn select_one(&self, record: &mut R, predicate: &str, args: &[DataType]) -> Result<()> {
        let Query { sql, params } = self.builder().select(predicate, args);
        let row = self.executor.query_row(&sql, &params).map_err(|e| {
            tracing::error!(table = %self.name, "select one failed: {e:#}");
            Error::Query(e)
        })?;

        let Some(row) = row else {
            return Err(Error::NotFound);
        };
        *record = decode_row(&row, &self.metadata)?;
        Ok(())
    }

    /// Delete every row matching `predicate`, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    ///
    /// # Panics
    ///
    /// Panics if `predicate` is empty.
    pub fn delete(&self, predicate: &str, args: &[DataType]) -> Result<u64> {
        let query = self.builder().delete(predicate, args);
        Ok(self.exec(query)?.rows_affected)
    }

    /// Count rows matching `predicate`, or all rows when it is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or returns no count.
    pub fn count(&self, predicate: &str, args: &[DataType]) -> Result<i64> {
        let Query { sql, params } = self.builder().count(predicate, args);
        let row = self.executor.query_row(&sql, &params).map_err(|e| {
            tracing::error!(table = %self.name, "count failed: {e:#}");
            Error::Query(e)
        })?;

        let value = row
            .and_then(|row| row.fields.into_iter().next())
            .map(|field| field.value)
            .ok_or_else(|| Error::Query(anyhow!("count returned no rows")))?;

        let mut count = 0_i64;
        count.assign(&value).map_err(|source| Error::Decode {
            column: "COUNT(*)".to_string(),
            source,
        })?;
        Ok(count)
    }

    fn builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.name, &self.metadata)
    }

    fn exec(&self, query: Query) -> Result<ExecResult> {
        self.executor.exec(&query.sql, &query.params).map_err(|e| {
            tracing::error!(table = %self.name, sql = %query.sql, "exec failed: {e:#}");
            Error::Exec(e)
        })
    }

    // runs an insert or upsert, then writes the generated id back
    fn write(&self, record: &mut R, query: Query) -> Result<()> {
        let generated = assigns_id(record, &self.metadata);
        let result = self.exec(query)?;

        if !generated {
            return Ok(());
        }
        let (Some(column), Some(id)) = (self.metadata.auto_increment(), result.last_insert_id)
        else {
            tracing::warn!(table = %self.name, "driver reported no generated id");
            return Ok(());
        };

        if let Some(FieldMut::Scalar(field)) = record.field_mut(column) {
            field.assign(&DataType::Int64(Some(id))).map_err(|source| Error::Decode {
                column: column.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

impl<R: Record> Clone for Table<R> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            name: self.name.clone(),
            dialect: self.dialect.clone(),
            metadata: Arc::clone(&self.metadata),
            _record: PhantomData,
        }
    }
}

impl<R: Record> fmt::Debug for Table<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("record", &R::NAME)
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}
