use crate::json::JsonField;
use crate::value::{Kind, Scalar};

/// Trait for types persisted one-to-one as table rows.
///
/// Typically implemented with `#[derive(Record)]` rather than by hand.
///
/// # Examples
///
/// ```ignore
/// #[derive(Debug, Default, Record)]
/// pub struct Post {
///     #[record(primary_key, auto_increment)]
///     pub id: i64,
///     pub title: String,
///     #[record(json, nullable)]
///     pub tags: Vec<String>,
///     #[record(skip)]
///     pub cached: bool,
/// }
/// ```
pub trait Record: Default + 'static {
    /// The type's own name, used to derive a default table name.
    const NAME: &'static str;

    /// Persisted fields in declaration order.
    ///
    /// Called once per type; the result is cached by
    /// [`ColumnMetadata::of`](crate::ColumnMetadata::of).
    fn schema() -> Vec<FieldSpec>;

    /// Read access to the field persisted as `column`.
    fn field(&self, column: &str) -> Option<FieldRef<'_>>;

    /// Write access to the field persisted as `column`.
    fn field_mut(&mut self, column: &str) -> Option<FieldMut<'_>>;

    /// Explicit table name, overriding the pluralized default.
    #[must_use]
    fn table_name() -> Option<String> {
        None
    }
}

/// Naming capability for records computing their table name from an
/// instance. Enabled with `#[record(naming)]`.
pub trait TableNaming {
    /// The table name for this record type.
    fn table_name(&self) -> String;
}

/// Description of one persisted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Column name.
    pub column: &'static str,
    /// Field names leading from the record to the field.
    pub path: Vec<&'static str>,
    /// Storage class of the field.
    pub kind: Kind,
    /// Part of the primary key.
    pub primary_key: bool,
    /// Assigned by the database on insert.
    pub auto_increment: bool,
    /// Persisted as a serialized document.
    pub json: bool,
    /// Zero values are persisted as SQL `NULL`.
    pub nullable: bool,
}

impl FieldSpec {
    /// A plain column for the field `field`.
    #[must_use]
    pub fn new(column: &'static str, field: &'static str, kind: Kind) -> Self {
        Self {
            column,
            path: vec![field],
            kind,
            primary_key: false,
            auto_increment: false,
            json: false,
            nullable: false,
        }
    }

    /// Marks the column as part of the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the column as assigned by the database.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Marks the column as JSON-encoded.
    #[must_use]
    pub const fn json(mut self) -> Self {
        self.json = true;
        self.kind = Kind::Json;
        self
    }

    /// Marks the column as nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Re-roots the spec under the embedding field `field`.
    #[must_use]
    pub fn nested(mut self, field: &'static str) -> Self {
        self.path.insert(0, field);
        self
    }
}

/// Borrowed view of a persisted field.
pub enum FieldRef<'a> {
    /// Bound as a single scalar value.
    Scalar(&'a dyn Scalar),
    /// Bound as a serialized document.
    Json(&'a dyn JsonField),
}

/// Mutable view of a persisted field.
pub enum FieldMut<'a> {
    /// Assigned from a single scalar value.
    Scalar(&'a mut dyn Scalar),
    /// Assigned by deserializing a document.
    Json(&'a mut dyn JsonField),
}
