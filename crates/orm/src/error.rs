//! Errors

use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Runtime failures returned by [`Table`](crate::Table) operations.
///
/// Misuse of the API (updating a record without a primary key, deleting
/// without a predicate, upserting on an unsupported driver, declaring an
/// unmappable field) panics instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The predicate matched no rows.
    #[error("record not found")]
    NotFound,

    /// A field could not be serialized for writing.
    #[error("encode column `{column}`: {source}")]
    Encode {
        /// Column being encoded.
        column: String,
        /// Underlying serialization error.
        source: anyhow::Error,
    },

    /// A column could not be read back into its field.
    #[error("decode column `{column}`: {source}")]
    Decode {
        /// Column being decoded.
        column: String,
        /// Underlying conversion error.
        source: anyhow::Error,
    },

    /// A statement failed to execute.
    #[error("exec: {0}")]
    Exec(#[source] anyhow::Error),

    /// A query failed to execute.
    #[error("query: {0}")]
    Query(#[source] anyhow::Error),
}

impl Error {
    /// Returns `true` for [`Error::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
