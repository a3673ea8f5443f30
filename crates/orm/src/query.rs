use crate::codec::{encode_field, encode_key};
use crate::error::Result;
use crate::record::{FieldRef, Record};
use crate::schema::ColumnMetadata;
use crate::types::DataType;

/// A statement ready for an [`Executor`](crate::Executor).
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Parameters in placeholder order.
    pub params: Vec<DataType>,
}

/// Assembles statements for one table from its record type's metadata.
///
/// Column order always follows the metadata so placeholders and parameters
/// line up. Caller predicates are inserted verbatim after `WHERE`; only their
/// arguments are bound.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    table: &'a str,
    metadata: &'a ColumnMetadata,
}

impl<'a> QueryBuilder<'a> {
    /// Creates a builder for `table` with the record type's `metadata`.
    #[must_use]
    pub const fn new(table: &'a str, metadata: &'a ColumnMetadata) -> Self {
        Self { table, metadata }
    }

    /// Build the INSERT statement for `record`.
    ///
    /// The auto-increment column is left out while it holds zero so the
    /// database assigns it.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be encoded.
    pub fn insert<R: Record>(&self, record: &R) -> Result<Query> {
        let Query { sql, params } = self.insert_statement(record)?;
        Ok(self.finish("insert", sql, params))
    }

    /// Build the UPDATE statement for `record`, matched on its primary key.
    ///
    /// Returns `None` when every column belongs to the primary key, leaving
    /// nothing to set.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be encoded.
    ///
    /// # Panics
    ///
    /// Panics if the record type has no primary key.
    pub fn update<R: Record>(&self, record: &R) -> Result<Option<Query>> {
        let keys = self.metadata.primary_keys();
        assert!(!keys.is_empty(), "{}: no primary key, use insert instead", self.table);
        let columns = self.metadata.not_primary_key();
        if columns.is_empty() {
            return Ok(None);
        }

        let mut params = self.encode(record, columns)?;
        for key in keys {
            params.push(encode_key(record, key)?);
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            self.table,
            assignments(columns),
            keys.iter().map(|key| format!("{key} = ?")).collect::<Vec<_>>().join(" AND ")
        );

        Ok(Some(self.finish("update", sql, params)))
    }

    /// Build the MySQL upsert: the INSERT statement followed by an `ON
    /// DUPLICATE KEY UPDATE` over every persisted column.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be encoded.
    pub fn insert_or_update<R: Record>(&self, record: &R) -> Result<Query> {
        let Query { mut sql, mut params } = self.insert_statement(record)?;
        let columns = self.metadata.names();

        sql.push_str(" ON DUPLICATE KEY UPDATE ");
        sql.push_str(&assignments(columns));
        params.extend(self.encode(record, columns)?);

        Ok(self.finish("insert_or_update", sql, params))
    }

    /// Build the SQLite upsert: the INSERT statement as `INSERT OR REPLACE`.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be encoded.
    pub fn insert_or_replace<R: Record>(&self, record: &R) -> Result<Query> {
        let Query { sql, params } = self.insert_statement(record)?;
        let sql = sql.replacen("INSERT INTO", "INSERT OR REPLACE INTO", 1);
        Ok(self.finish("insert_or_replace", sql, params))
    }

    /// Build a SELECT of every persisted column, filtered by `predicate` when
    /// it is not empty. Serves both multi-row and single-row reads.
    #[must_use]
    pub fn select(&self, predicate: &str, args: &[DataType]) -> Query {
        let sql = with_predicate(
            format!("SELECT {} FROM {}", self.metadata.names().join(", "), self.table),
            predicate,
        );
        self.finish("select", sql, args.to_vec())
    }

    /// Build a DELETE filtered by `predicate`.
    ///
    /// # Panics
    ///
    /// Panics if `predicate` is empty; unconditional deletes are not built.
    #[must_use]
    pub fn delete(&self, predicate: &str, args: &[DataType]) -> Query {
        assert!(!predicate.is_empty(), "{}: delete requires a predicate", self.table);
        let sql = format!("DELETE FROM {} WHERE {predicate}", self.table);
        self.finish("delete", sql, args.to_vec())
    }

    /// Build a row count, filtered by `predicate` when it is not empty.
    #[must_use]
    pub fn count(&self, predicate: &str, args: &[DataType]) -> Query {
        let sql = with_predicate(format!("SELECT COUNT(*) FROM {}", self.table), predicate);
        self.finish("count", sql, args.to_vec())
    }

    // INSERT shared by the plain and upsert statements; logged by the caller.
    fn insert_statement<R: Record>(&self, record: &R) -> Result<Query> {
        let columns = if assigns_id(record, self.metadata) {
            self.metadata.not_auto_increment()
        } else {
            self.metadata.names()
        };

        let params = self.encode(record, columns)?;
        let sql = format!(
            "INSERT INTO {}({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders(columns.len())
        );

        Ok(Query { sql, params })
    }

    fn encode<R: Record>(&self, record: &R, columns: &[&str]) -> Result<Vec<DataType>> {
        columns.iter().map(|column| encode_field(record, self.metadata, column)).collect()
    }

    fn finish(&self, statement: &str, sql: String, params: Vec<DataType>) -> Query {
        tracing::debug!(
            table = self.table,
            sql = %sql,
            param_count = params.len(),
            "{statement} generated SQL"
        );
        Query { sql, params }
    }
}

/// Whether inserting `record` leaves its auto-increment column for the
/// database to assign.
pub fn assigns_id<R: Record>(record: &R, metadata: &ColumnMetadata) -> bool {
    metadata.auto_increment().is_some_and(|column| {
        matches!(record.field(column), Some(FieldRef::Scalar(value)) if value.is_zero())
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn assignments(columns: &[&str]) -> String {
    columns.iter().map(|column| format!("{column} = ?")).collect::<Vec<_>>().join(", ")
}

fn with_predicate(mut sql: String, predicate: &str) -> String {
    if !predicate.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(predicate);
    }
    sql
}
