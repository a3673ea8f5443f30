//! Per-type column metadata, derived once and shared for the life of the
//! process.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::record::{FieldSpec, Record};
use crate::value::Kind;

static CACHE: LazyLock<RwLock<HashMap<TypeId, Arc<ColumnMetadata>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Persisted columns of a record type and their special handling.
#[derive(Debug)]
pub struct ColumnMetadata {
    names: Vec<&'static str>,
    fields: HashMap<&'static str, FieldSpec>,
    auto_increment: Option<&'static str>,
    primary_keys: Vec<&'static str>,
    json: Vec<&'static str>,
    nullable: Vec<&'static str>,
    not_auto_increment: Vec<&'static str>,
    not_primary_key: Vec<&'static str>,
}

impl ColumnMetadata {
    /// Returns the cached metadata for `R`, deriving it on first use.
    ///
    /// # Panics
    ///
    /// Panics if the record's schema is invalid: a nullable field whose kind
    /// has no nullable scalar form, more than one auto-increment column, a
    /// non-integer auto-increment column, or a repeated column name.
    #[must_use]
    pub fn of<R: Record>() -> Arc<Self> {
        let type_id = TypeId::of::<R>();
        if let Some(metadata) = CACHE.read().get(&type_id) {
            return Arc::clone(metadata);
        }

        let derived = Arc::new(Self::derive(R::NAME, R::schema()));
        tracing::debug!(record = R::NAME, columns = derived.names.len(), "derived column metadata");

        // a concurrent first use may have won the race; keep whichever landed first
        Arc::clone(CACHE.write().entry(type_id).or_insert(derived))
    }

    fn derive(record: &str, specs: Vec<FieldSpec>) -> Self {
        let mut names = Vec::with_capacity(specs.len());
        let mut seen = HashSet::with_capacity(specs.len());
        let mut fields = HashMap::with_capacity(specs.len());
        let mut auto_increment = None;
        let mut primary_keys = Vec::new();
        let mut json = Vec::new();
        let mut nullable = Vec::new();

        for spec in specs {
            let column = spec.column;
            assert!(seen.insert(column), "{record}: duplicate column `{column}`");

            if spec.nullable && !spec.json {
                assert!(
                    spec.kind.is_nullable_scalar(),
                    "{record}: invalid nullable type {:?} for column `{column}`",
                    spec.kind
                );
            }
            if spec.auto_increment {
                assert!(
                    auto_increment.is_none(),
                    "{record}: more than one auto-increment column (`{column}`)"
                );
                assert!(
                    spec.kind == Kind::Integer,
                    "{record}: auto-increment column `{column}` must be an integer"
                );
                auto_increment = Some(column);
            }
            if spec.primary_key {
                primary_keys.push(column);
            }
            if spec.json {
                json.push(column);
            }
            if spec.nullable {
                nullable.push(column);
            }

            names.push(column);
            fields.insert(column, spec);
        }

        let not_auto_increment =
            names.iter().copied().filter(|name| Some(*name) != auto_increment).collect();
        let not_primary_key =
            names.iter().copied().filter(|name| !primary_keys.contains(name)).collect();

        Self {
            names,
            fields,
            auto_increment,
            primary_keys,
            json,
            nullable,
            not_auto_increment,
            not_primary_key,
        }
    }

    /// Persisted column names in declaration order.
    #[must_use]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// The field persisted as `column`.
    #[must_use]
    pub fn field(&self, column: &str) -> Option<&FieldSpec> {
        self.fields.get(column)
    }

    /// Field names leading from the record to `column`'s field.
    #[must_use]
    pub fn path(&self, column: &str) -> Option<&[&'static str]> {
        self.fields.get(column).map(|spec| spec.path.as_slice())
    }

    /// The auto-increment column, if the type has one.
    #[must_use]
    pub const fn auto_increment(&self) -> Option<&'static str> {
        self.auto_increment
    }

    /// Primary-key columns in declaration order.
    #[must_use]
    pub fn primary_keys(&self) -> &[&'static str] {
        &self.primary_keys
    }

    /// JSON-encoded columns.
    #[must_use]
    pub fn json(&self) -> &[&'static str] {
        &self.json
    }

    /// Nullable columns.
    #[must_use]
    pub fn nullable(&self) -> &[&'static str] {
        &self.nullable
    }

    /// Columns other than the auto-increment column.
    #[must_use]
    pub fn not_auto_increment(&self) -> &[&'static str] {
        &self.not_auto_increment
    }

    /// Columns outside the primary key.
    #[must_use]
    pub fn not_primary_key(&self) -> &[&'static str] {
        &self.not_primary_key
    }

    /// Whether `column` is JSON-encoded.
    #[must_use]
    pub fn is_json(&self, column: &str) -> bool {
        self.fields.get(column).is_some_and(|spec| spec.json)
    }

    /// Whether `column` is nullable.
    #[must_use]
    pub fn is_nullable(&self, column: &str) -> bool {
        self.fields.get(column).is_some_and(|spec| spec.nullable)
    }
}
