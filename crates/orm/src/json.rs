//! JSON-encoded columns.

use std::ops::{Deref, DerefMut};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::DataType;
use crate::value::{Kind, Scalar, as_bytes};

/// A field persisted as a serialized JSON document.
///
/// Blanket-implemented for every serde type; fields opt in with
/// `#[record(json)]`.
pub trait JsonField {
    /// Serialize the current value.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error, e.g. for maps with non-string keys.
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;

    /// Replace the current value with the deserialized document.
    ///
    /// # Errors
    ///
    /// Returns the deserializer's error when the bytes do not describe the
    /// field's type.
    fn from_json(&mut self, bytes: &[u8]) -> serde_json::Result<()>;
}

impl<T: Serialize + DeserializeOwned> JsonField for T {
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    fn from_json(&mut self, bytes: &[u8]) -> serde_json::Result<()> {
        *self = serde_json::from_slice(bytes)?;
        Ok(())
    }
}

/// Returns `true` for the serialized forms a nullable JSON column stores as
/// SQL `NULL`.
#[must_use]
pub fn is_empty_document(bytes: &[u8]) -> bool {
    matches!(bytes, b"{}" | b"[]" | b"null" | b"NULL")
}

/// Wraps a value so it is bound and read as a JSON document without marking
/// the field `#[record(json)]`.
///
/// A wrapped value serializing to `null` is bound as SQL `NULL`; a `NULL` or
/// empty column leaves the default in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwraps the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> From<T> for Json<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T: Serialize + DeserializeOwned + Default> Scalar for Json<T> {
    fn kind() -> Kind {
        Kind::Json
    }

    fn to_data(&self) -> Result<DataType> {
        let bytes = serde_json::to_vec(&self.0).context("marshal")?;
        if bytes == b"null" {
            return Ok(DataType::Binary(None));
        }
        Ok(DataType::Binary(Some(bytes)))
    }

    fn is_zero(&self) -> bool {
        serde_json::to_vec(&self.0).is_ok_and(|bytes| is_empty_document(&bytes))
    }

    fn assign(&mut self, value: &DataType) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        let bytes = as_bytes(value)?;
        if bytes.is_empty() {
            return Ok(());
        }
        self.0 = serde_json::from_slice(&bytes).context("unmarshal")?;
        Ok(())
    }
}
