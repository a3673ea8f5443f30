//! `SQLite` backend for `tabula-orm`.
//!
//! [`SqlDefault`] executes generated statements against a rusqlite
//! connection; [`KvStore`] is a small settings store built on a single
//! `kv` table.

mod default_impl;
mod kv;

pub use default_impl::{ConnectOptions, DRIVER, SqlDefault};
pub use kv::{Clock, KvStore, SystemClock};
