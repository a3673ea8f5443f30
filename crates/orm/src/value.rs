use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::types::DataType;

/// Storage class of a persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Signed or unsigned integer of any width.
    Integer,
    /// Boolean.
    Bool,
    /// Floating point.
    Float,
    /// Text.
    Text,
    /// Raw bytes.
    Bytes,
    /// Date and time.
    Timestamp,
    /// Calendar date.
    Date,
    /// Serialized document.
    Json,
}

impl Kind {
    /// The SQL `NULL` parameter for a column of this kind.
    #[must_use]
    pub const fn null(self) -> DataType {
        match self {
            Self::Integer => DataType::Int64(None),
            Self::Bool => DataType::Boolean(None),
            Self::Float => DataType::Double(None),
            Self::Text => DataType::Str(None),
            Self::Bytes | Self::Json => DataType::Binary(None),
            Self::Timestamp => DataType::Timestamp(None),
            Self::Date => DataType::Date(None),
        }
    }

    /// Whether a nullable column of this kind can be read back through a
    /// nullable scalar.
    #[must_use]
    pub const fn is_nullable_scalar(self) -> bool {
        matches!(self, Self::Integer | Self::Bool | Self::Float | Self::Text)
    }
}

/// A field type persisted as a single column value.
///
/// Implemented for the standard scalar types (`i32`, `String`, `bool`,
/// `DateTime<Utc>`, ...) and for `Option<T>` of those. Implement it for a
/// newtype to persist it directly.
pub trait Scalar {
    /// Storage class of the type.
    fn kind() -> Kind
    where
        Self: Sized;

    /// Convert the current value into a statement parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as a parameter.
    fn to_data(&self) -> Result<DataType>;

    /// Whether the value equals the type's zero (default) value.
    fn is_zero(&self) -> bool;

    /// Overwrite the value from a column read from a row.
    ///
    /// # Errors
    ///
    /// Returns an error if the column holds an incompatible type or an
    /// out-of-range value.
    fn assign(&mut self, value: &DataType) -> Result<()>;
}

macro_rules! integer_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                fn kind() -> Kind {
                    Kind::Integer
                }

                fn to_data(&self) -> Result<DataType> {
                    Ok(DataType::$variant(Some((*self).into())))
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }

                fn assign(&mut self, value: &DataType) -> Result<()> {
                    let wide = as_integer(value)?;
                    *self = <$ty>::try_from(wide)
                        .map_err(|_e| anyhow!("integer {wide} out of range for {}", stringify!($ty)))?;
                    Ok(())
                }
            }
        )*
    };
}

integer_scalar! {
    i8 => Int32,
    i16 => Int32,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint32,
    u16 => Uint32,
    u32 => Uint32,
    u64 => Uint64,
}

impl Scalar for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn to_data(&self) -> Result<DataType> {
        Ok(DataType::Boolean(Some(*self)))
    }

    fn is_zero(&self) -> bool {
        !*self
    }

    fn assign(&mut self, value: &DataType) -> Result<()> {
        *self = as_bool(value)?;
        Ok(())
    }
}

impl Scalar for f32 {
    fn kind() -> Kind {
        Kind::Float
    }

    fn to_data(&self) -> Result<DataType> {
        Ok(DataType::Float(Some(*self)))
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    #[allow(clippy::cast_possible_truncation)]
    fn assign(&mut self, value: &DataType) -> Result<()> {
        *self = as_f64(value)? as Self;
        Ok(())
    }
}

impl Scalar for f64 {
    fn kind() -> Kind {
        Kind::Float
    }

    fn to_data(&self) -> Result<DataType> {
        Ok(DataType::Double(Some(*self)))
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn assign(&mut self, value: &DataType) -> Result<()> {
        *self = as_f64(value)?;
        Ok(())
    }
}

impl Scalar for String {
    fn kind() -> Kind {
        Kind::Text
    }

    fn to_data(&self) -> Result<DataType> {
        Ok(DataType::Str(Some(self.clone())))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn assign(&mut self, value: &DataType) -> Result<()> {
        *self = as_string(value)?;
        Ok(())
    }
}

impl Scalar for Vec<u8> {
    fn kind() -> Kind {
        Kind::Bytes
    }

    fn to_data(&self) -> Result<DataType> {
        Ok(DataType::Binary(Some(self.clone())))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn assign(&mut self, value: &DataType) -> Result<()> {
        *self = as_bytes(value)?;
        Ok(())
    }
}

impl Scalar for DateTime<Utc> {
    fn kind() -> Kind {
        Kind::Timestamp
    }

    fn to_data(&self) -> Result<DataType> {
        Ok(DataType::Timestamp(Some(self.to_rfc3339())))
    }

    fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    fn assign(&mut self, value: &DataType) -> Result<()> {
        *self = as_timestamp(value)?;
        Ok(())
    }
}

impl Scalar for NaiveDate {
    fn kind() -> Kind {
        Kind::Date
    }

    fn to_data(&self) -> Result<DataType> {
        Ok(DataType::Date(Some(self.to_string())))
    }

    fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    fn assign(&mut self, value: &DataType) -> Result<()> {
        *self = as_date(value)?;
        Ok(())
    }
}

impl<T: Scalar + Default> Scalar for Option<T> {
    fn kind() -> Kind {
        T::kind()
    }

    fn to_data(&self) -> Result<DataType> {
        self.as_ref().map_or_else(|| Ok(T::kind().null()), Scalar::to_data)
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn assign(&mut self, value: &DataType) -> Result<()> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.assign(value)?;
        *self = Some(inner);
        Ok(())
    }
}

// Inbound conversion

fn as_integer(value: &DataType) -> Result<i128> {
    match value {
        DataType::Int32(Some(v)) => Ok(i128::from(*v)),
        DataType::Int64(Some(v)) => Ok(i128::from(*v)),
        DataType::Uint32(Some(v)) => Ok(i128::from(*v)),
        DataType::Uint64(Some(v)) => Ok(i128::from(*v)),
        DataType::Boolean(Some(v)) => Ok(i128::from(*v)),
        _ => bail!("expected integer data type"),
    }
}

fn as_bool(value: &DataType) -> Result<bool> {
    match value {
        DataType::Boolean(Some(v)) => Ok(*v),
        DataType::Int32(Some(_))
        | DataType::Int64(Some(_))
        | DataType::Uint32(Some(_))
        | DataType::Uint64(Some(_)) => Ok(as_integer(value)? != 0),
        _ => bail!("expected boolean data type"),
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(value: &DataType) -> Result<f64> {
    match value {
        DataType::Float(Some(v)) => Ok(f64::from(*v)),
        DataType::Double(Some(v)) => Ok(*v),
        DataType::Int32(Some(v)) => Ok(f64::from(*v)),
        DataType::Int64(Some(v)) => Ok(*v as f64),
        DataType::Uint32(Some(v)) => Ok(f64::from(*v)),
        DataType::Uint64(Some(v)) => Ok(*v as f64),
        _ => bail!("expected floating point data type"),
    }
}

fn as_string(value: &DataType) -> Result<String> {
    match value {
        DataType::Str(Some(raw)) => Ok(raw.clone()),
        DataType::Binary(Some(bytes)) => {
            String::from_utf8(bytes.clone()).map_err(|_e| anyhow!("invalid UTF-8 in binary value"))
        }
        _ => bail!("expected string data type"),
    }
}

pub(crate) fn as_bytes(value: &DataType) -> Result<Vec<u8>> {
    match value {
        DataType::Binary(Some(bytes)) => Ok(bytes.clone()),
        DataType::Str(Some(raw)) => Ok(raw.clone().into_bytes()),
        _ => bail!("expected binary data type"),
    }
}

fn as_timestamp(value: &DataType) -> Result<DateTime<Utc>> {
    match value {
        DataType::Timestamp(Some(raw)) | DataType::Str(Some(raw)) => {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
                return Ok(parsed.with_timezone(&Utc));
            }

            if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
                return Ok(DateTime::<Utc>::from_naive_utc_and_offset(parsed, Utc));
            }

            bail!(
                "unsupported timestamp: {raw}; expected RFC3339 or \"%Y-%m-%d %H:%M:%S%.f\" format"
            )
        }
        _ => bail!("expected timestamp data type"),
    }
}

fn as_date(value: &DataType) -> Result<NaiveDate> {
    match value {
        DataType::Date(Some(raw)) | DataType::Str(Some(raw)) => {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_e| anyhow!("unsupported date: {raw}; expected \"%Y-%m-%d\" format"))
        }
        _ => bail!("expected date data type"),
    }
}
