//! Column metadata and table name resolution through the derive.

#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use chrono::{DateTime, Utc};
use common::{Membership, Post, UserProfile};
use tabula_orm::{ColumnMetadata, Kind, Record, TableNaming, table_name};

static NAMING_CALLS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Default, Record)]
#[record(naming)]
struct Shard {
    #[record(primary_key)]
    id: i64,
    region: String,
}

impl TableNaming for Shard {
    fn table_name(&self) -> String {
        NAMING_CALLS.fetch_add(1, Ordering::SeqCst);
        // called on a default instance
        format!("shard_{}", if self.region.is_empty() { "global" } else { self.region.as_str() })
    }
}

#[derive(Debug, Default, Record)]
struct Person {
    #[record(primary_key)]
    id: i64,
}

#[derive(Debug, Default, Record)]
struct Event {
    #[record(nullable)]
    at: DateTime<Utc>,
}

#[derive(Debug, Default, Record)]
struct Ticket {
    #[record(primary_key, auto_increment)]
    code: String,
}

#[derive(Debug, Default, Record)]
struct Pair {
    #[record(auto_increment)]
    a: i64,
    #[record(auto_increment)]
    b: i64,
}

#[test]
fn default_table_names() {
    assert_eq!(table_name::<Post>(), "posts");
    assert_eq!(table_name::<UserProfile>(), "user_profiles");
    assert_eq!(table_name::<Person>(), "people");
    assert_eq!(table_name::<Membership>(), "memberships");
}

#[test]
fn naming_capability_resolved_once() {
    let handles: Vec<_> = (0..4).map(|_| thread::spawn(table_name::<Shard>)).collect();
    for handle in handles {
        assert_eq!(handle.join().expect("thread"), "shard_global");
    }
    assert_eq!(table_name::<Shard>(), "shard_global");

    // racing first uses may each resolve, later calls hit the cache
    let resolved = NAMING_CALLS.load(Ordering::SeqCst);
    assert!((1..=4).contains(&resolved));
    let _ = table_name::<Shard>();
    assert_eq!(NAMING_CALLS.load(Ordering::SeqCst), resolved);
}

#[test]
fn metadata_is_shared() {
    let first = ColumnMetadata::of::<Post>();
    let second = ColumnMetadata::of::<Post>();
    assert!(Arc::ptr_eq(&first, &second));

    assert_eq!(first.auto_increment(), Some("id"));
    assert_eq!(first.primary_keys(), &["id"]);
    assert_eq!(first.not_auto_increment(), &["name", "tags"]);
    assert_eq!(first.field("tags").map(|spec| spec.kind), Some(Kind::Json));
    assert_eq!(first.field("id").map(|spec| spec.kind), Some(Kind::Integer));
}

#[test]
fn composite_keys() {
    let metadata = ColumnMetadata::of::<Membership>();
    assert_eq!(metadata.primary_keys(), &["user_id", "group_id"]);
    assert_eq!(metadata.not_primary_key(), &["role", "note"]);
    assert_eq!(metadata.auto_increment(), None);
    assert!(metadata.is_nullable("note"));
}

#[test]
#[should_panic(expected = "invalid nullable type")]
fn nullable_timestamp_rejected() {
    let _ = ColumnMetadata::of::<Event>();
}

#[test]
#[should_panic(expected = "must be an integer")]
fn text_auto_increment_rejected() {
    let _ = ColumnMetadata::of::<Ticket>();
}

#[test]
#[should_panic(expected = "more than one auto-increment column")]
fn second_auto_increment_rejected() {
    let _ = ColumnMetadata::of::<Pair>();
}
