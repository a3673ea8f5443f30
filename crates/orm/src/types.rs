//! Values exchanged with an [`Executor`](crate::Executor).
//!
//! Parameters and row values are typed optionals: `None` in any variant is a
//! SQL `NULL` of that type.

use chrono::{DateTime, NaiveDate, Utc};

/// A single value bound as a statement parameter or read from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    /// Boolean value.
    Boolean(Option<bool>),
    /// 32-bit signed integer.
    Int32(Option<i32>),
    /// 64-bit signed integer.
    Int64(Option<i64>),
    /// 32-bit unsigned integer.
    Uint32(Option<u32>),
    /// 64-bit unsigned integer.
    Uint64(Option<u64>),
    /// Single precision float.
    Float(Option<f32>),
    /// Double precision float.
    Double(Option<f64>),
    /// Text.
    Str(Option<String>),
    /// Raw bytes.
    Binary(Option<Vec<u8>>),
    /// Date formatted as `%Y-%m-%d`.
    Date(Option<String>),
    /// Timestamp formatted as RFC 3339.
    Timestamp(Option<String>),
}

impl DataType {
    /// Returns `true` when the value is SQL `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(
            self,
            Self::Boolean(None)
                | Self::Int32(None)
                | Self::Int64(None)
                | Self::Uint32(None)
                | Self::Uint64(None)
                | Self::Float(None)
                | Self::Double(None)
                | Self::Str(None)
                | Self::Binary(None)
                | Self::Date(None)
                | Self::Timestamp(None)
        )
    }
}

/// A named column value within a [`Row`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Column name as reported by the driver.
    pub name: String,
    /// Column value.
    pub value: DataType,
}

/// A single result row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Position of the row within its result set.
    pub index: String,
    /// Column values in select order.
    pub fields: Vec<Field>,
}

impl Row {
    /// Returns the value of the named column, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DataType> {
        self.fields.iter().find(|field| field.name == name).map(|field| &field.value)
    }
}

// Conversions used when passing predicate arguments.

impl From<bool> for DataType {
    fn from(value: bool) -> Self {
        Self::Boolean(Some(value))
    }
}

impl From<i32> for DataType {
    fn from(value: i32) -> Self {
        Self::Int32(Some(value))
    }
}

impl From<i64> for DataType {
    fn from(value: i64) -> Self {
        Self::Int64(Some(value))
    }
}

impl From<u32> for DataType {
    fn from(value: u32) -> Self {
        Self::Uint32(Some(value))
    }
}

impl From<u64> for DataType {
    fn from(value: u64) -> Self {
        Self::Uint64(Some(value))
    }
}

impl From<f64> for DataType {
    fn from(value: f64) -> Self {
        Self::Double(Some(value))
    }
}

impl From<&str> for DataType {
    fn from(value: &str) -> Self {
        Self::Str(Some(value.to_string()))
    }
}

impl From<String> for DataType {
    fn from(value: String) -> Self {
        Self::Str(Some(value))
    }
}

impl From<Vec<u8>> for DataType {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(Some(value))
    }
}

impl From<DateTime<Utc>> for DataType {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(Some(value.to_rfc3339()))
    }
}

impl From<NaiveDate> for DataType {
    fn from(value: NaiveDate) -> Self {
        Self::Date(Some(value.to_string()))
    }
}

impl<T: Into<Self>> From<Option<T>> for DataType {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Str(None), Into::into)
    }
}
