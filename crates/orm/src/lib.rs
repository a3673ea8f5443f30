//! Lightweight record/table mapping for SQL databases.
//!
//! Treats a table as a collection of typed records: column metadata is derived
//! once per record type, statements are generated with `?` placeholders, and
//! values are converted across the boundary (JSON columns, nullable columns,
//! auto-increment keys). Anything beyond single-table CRUD is left to plain
//! SQL predicates.
//!
//! # Quick Start
//!
//! ## Define a Record
//!
//! ```ignore
//! use chrono::{DateTime, Utc};
//! use tabula_orm::Record;
//!
//! #[derive(Debug, Default, Record)]
//! pub struct Post {
//!     #[record(primary_key, auto_increment)]
//!     pub id: i64,
//!     pub title: String,
//!     #[record(nullable)]
//!     pub summary: String,
//!     #[record(json, nullable)]
//!     pub tags: Vec<String>,
//!     pub created_at: DateTime<Utc>,
//! }
//! ```
//!
//! The table name defaults to the snake-cased, pluralized type name (`posts`).
//! Use `#[record(table = "...")]` to name it explicitly, or
//! `#[record(naming)]` with a [`TableNaming`] implementation.
//!
//! ## CRUD Operations
//!
//! ```ignore
//! let posts: Table<Post> = Table::new(executor, "sqlite3");
//!
//! let mut post = Post { title: "Hello".into(), ..Post::default() };
//! posts.insert(&mut post)?;              // id written back
//! post.title = "Hello World".into();
//! posts.update(&post)?;                  // matched on primary key
//! posts.save(&mut post)?;                // dialect upsert
//!
//! let mut found = Post::default();
//! posts.select_one(&mut found, "id = ?", &[post.id.into()])?;
//!
//! let mut all: Vec<Post> = Vec::new();
//! posts.select(&mut all, "created_at > ? ORDER BY id", &[since.into()])?;
//!
//! let n = posts.count("", &[])?;
//! posts.delete("id = ?", &[post.id.into()])?;
//! ```
//!
//! ## Custom Types
//!
//! Any field type implementing [`Scalar`] maps to a single column; any serde
//! type can be stored as a JSON column with `#[record(json)]` or by wrapping
//! it in [`Json`].

mod codec;
mod dialect;
mod error;
mod json;
mod naming;
mod query;
mod record;
mod schema;
mod table;
mod traits;
mod types;
mod value;

pub use codec::{decode_row, encode_field, encode_key};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use json::{Json, JsonField, is_empty_document};
pub use naming::{default_name, pluralize, table_name};
pub use query::{Query, QueryBuilder};
pub use record::{FieldMut, FieldRef, FieldSpec, Record, TableNaming};
pub use schema::ColumnMetadata;
pub use table::Table;
/// Derives [`Record`] for a struct with named fields.
pub use tabula_record_macro::Record;
pub use traits::{Backend, ExecResult, Executor, FromEnv};
pub use types::{DataType, Field, Row};
pub use value::{Kind, Scalar};
