//! Conversion between record fields and driver values.

use anyhow::anyhow;

use crate::error::{Error, Result};
use crate::json::is_empty_document;
use crate::record::{FieldMut, FieldRef, Record};
use crate::schema::ColumnMetadata;
use crate::types::{DataType, Row};
use crate::value::as_bytes;

/// Converts `column`'s field into a statement parameter.
///
/// JSON columns are serialized, and bound as `NULL` when nullable and the
/// document is empty (`{}`, `[]`, `null`). Nullable scalars holding their
/// zero value are bound as `NULL`.
///
/// # Errors
///
/// Returns [`Error::Encode`] if the field cannot be converted, e.g. a JSON
/// document that fails to serialize.
pub fn encode_field<R: Record>(
    record: &R, metadata: &ColumnMetadata, column: &str,
) -> Result<DataType> {
    let nullable = metadata.is_nullable(column);

    match field(record, column) {
        FieldRef::Json(value) => {
            let bytes = value.to_json().map_err(|source| encode_error(column, source.into()))?;
            if nullable && is_empty_document(&bytes) {
                Ok(DataType::Binary(None))
            } else {
                Ok(DataType::Binary(Some(bytes)))
            }
        }
        FieldRef::Scalar(value) => {
            if nullable && value.is_zero() {
                let kind = metadata.field(column).map(|spec| spec.kind);
                Ok(kind.map_or(DataType::Str(None), |kind| kind.null()))
            } else {
                value.to_data().map_err(|source| encode_error(column, source))
            }
        }
    }
}

/// Converts `column`'s field into a parameter without `NULL` substitution.
///
/// Used for primary-key predicates, which always compare the literal value.
///
/// # Errors
///
/// Returns [`Error::Encode`] if the field cannot be converted, e.g. a JSON
/// document that fails to serialize.
pub fn encode_key<R: Record>(record: &R, column: &str) -> Result<DataType> {
    match field(record, column) {
        FieldRef::Json(value) => value
            .to_json()
            .map(|bytes| DataType::Binary(Some(bytes)))
            .map_err(|source| encode_error(column, source.into())),
        FieldRef::Scalar(value) => value.to_data().map_err(|source| encode_error(column, source)),
    }
}

/// Builds a fresh record from a row selected with `metadata`'s columns.
///
/// # Errors
///
/// Returns [`Error::Decode`] if a column is missing from the row or cannot be
/// converted into its field.
pub fn decode_row<R: Record>(row: &Row, metadata: &ColumnMetadata) -> Result<R> {
    let mut record = R::default();

    for &column in metadata.names() {
        let value = row.get(column).ok_or_else(|| Error::Decode {
            column: column.to_string(),
            source: anyhow!("missing column '{column}'"),
        })?;

        let decoded = match field_mut(&mut record, column) {
            // an absent document leaves the field at its default
            FieldMut::Json(target) => {
                if value.is_null() {
                    Ok(())
                } else {
                    as_bytes(value).and_then(|bytes| {
                        if bytes.is_empty() {
                            return Ok(());
                        }
                        target.from_json(&bytes).map_err(anyhow::Error::from)
                    })
                }
            }
            FieldMut::Scalar(target) => {
                if metadata.is_nullable(column) && value.is_null() {
                    Ok(())
                } else {
                    target.assign(value)
                }
            }
        };

        decoded.map_err(|source| Error::Decode {
            column: column.to_string(),
            source,
        })?;
    }

    Ok(record)
}

fn encode_error(column: &str, source: anyhow::Error) -> Error {
    Error::Encode {
        column: column.to_string(),
        source,
    }
}

fn field<'a, R: Record>(record: &'a R, column: &str) -> FieldRef<'a> {
    record
        .field(column)
        .unwrap_or_else(|| panic!("{}: no field for column `{column}`", R::NAME))
}

fn field_mut<'a, R: Record>(record: &'a mut R, column: &str) -> FieldMut<'a> {
    record
        .field_mut(column)
        .unwrap_or_else(|| panic!("{}: no field for column `{column}`", R::NAME))
}
