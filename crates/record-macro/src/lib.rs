//! Derive macro for `tabula-orm` records.

#![forbid(unsafe_code)]

mod record;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Implements `tabula_orm::Record` for a struct with named fields.
///
/// Every field is persisted as a column named after the field unless marked
/// otherwise. The struct must also implement `Default`.
///
/// Struct attributes:
///
/// - `#[record(table = "name")]`: explicit table name.
/// - `#[record(naming)]`: table name from the type's `TableNaming`
///   implementation, called on a default instance.
///
/// Field attributes:
///
/// - `primary_key`, `auto_increment`: key columns.
/// - `json`: stored as a serialized document.
/// - `nullable`: zero values stored as `NULL`.
/// - `name = "column"`: column name override.
/// - `skip`: not persisted.
/// - `flatten`: inline the columns of a nested record.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug, Default, Record)]
/// #[record(table = "orders")]
/// pub struct Order {
///     #[record(primary_key, auto_increment)]
///     pub id: i64,
///     #[record(name = "customer")]
///     pub customer_name: String,
///     #[record(json, nullable)]
///     pub lines: Vec<OrderLine>,
///     #[record(flatten)]
///     pub audit: Audit,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::Model::try_from(&input).map_or_else(|e| e.to_compile_error(), |m| m.expand()).into()
}
