//! Value conversion between records and rows.

#![allow(missing_docs)]

mod common;

use std::collections::BTreeMap;

use chrono::DateTime;
use common::{Audit, MockExecutor, Settings, UserProfile, row, shared};
use tabula_orm::{
    ColumnMetadata, DataType, Error, Field, Json, Record, Row, Table, decode_row, encode_field,
};

#[derive(Debug, Default, Record)]
struct Grid {
    #[record(primary_key)]
    id: i64,
    #[record(json)]
    cells: BTreeMap<(i32, i32), String>,
}

#[derive(Debug, Default, Record)]
struct Board {
    #[record(primary_key)]
    id: i64,
    cells: Json<BTreeMap<(i32, i32), String>>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Record)]
struct Document {
    #[record(primary_key)]
    id: i64,
    body: Json<Option<Vec<String>>>,
}

fn profile() -> UserProfile {
    UserProfile {
        id: 11,
        name: "Ada".to_string(),
        age: 36,
        score: 9.5,
        verified: true,
        settings: Settings {
            theme: "dark".to_string(),
            font_size: 14,
        },
        labels: BTreeMap::from([("team".to_string(), "core".to_string())]),
        nickname: Some("countess".to_string()),
        joined_at: DateTime::from_timestamp(1_700_000_000, 250_000_000).unwrap_or_default(),
        audit: Audit {
            created_by: "admin".to_string(),
            revision: 3,
        },
        session: String::new(),
    }
}

// Encode every persisted column of `record` into a row, as a driver would return it.
fn encode_row<R: Record>(record: &R) -> Row {
    let metadata = ColumnMetadata::of::<R>();
    let fields = metadata
        .names()
        .iter()
        .map(|column| Field {
            name: (*column).to_string(),
            value: encode_field(record, &metadata, column).expect("encode"),
        })
        .collect();

    Row {
        index: "0".to_string(),
        fields,
    }
}

#[test]
fn flattened_columns() {
    let metadata = ColumnMetadata::of::<UserProfile>();

    assert_eq!(
        metadata.names(),
        &[
            "id",
            "display_name",
            "age",
            "score",
            "verified",
            "settings",
            "labels",
            "nickname",
            "joined_at",
            "created_by",
            "revision",
        ]
    );
    assert_eq!(metadata.path("revision"), Some(&["audit", "revision"][..]));
    assert_eq!(metadata.path("display_name"), Some(&["name"][..]));
    assert_eq!(metadata.json(), &["settings", "labels"]);
    assert_eq!(metadata.nullable(), &["age", "score", "verified", "labels"]);
    assert!(metadata.field("session").is_none());
}

#[test]
fn round_trip() {
    let original = profile();
    let metadata = ColumnMetadata::of::<UserProfile>();

    let decoded: UserProfile = decode_row(&encode_row(&original), &metadata).expect("decode");
    assert_eq!(decoded, original);
}

#[test]
fn nullable_zero_values() {
    let original = UserProfile {
        name: "Zero".to_string(),
        ..UserProfile::default()
    };
    let metadata = ColumnMetadata::of::<UserProfile>();
    let encoded = encode_row(&original);

    assert_eq!(encoded.get("age"), Some(&DataType::Int64(None)));
    assert_eq!(encoded.get("score"), Some(&DataType::Double(None)));
    assert_eq!(encoded.get("verified"), Some(&DataType::Boolean(None)));
    assert_eq!(encoded.get("labels"), Some(&DataType::Binary(None)));
    assert_eq!(encoded.get("nickname"), Some(&DataType::Str(None)));

    // not nullable, so written as the literal document
    assert_eq!(
        encoded.get("settings"),
        Some(&DataType::Binary(Some(br#"{"theme":"","font_size":0}"#.to_vec())))
    );

    let decoded: UserProfile = decode_row(&encoded, &metadata).expect("decode");
    assert_eq!(decoded, original);
}

#[test]
fn null_json_reads_as_default() {
    let metadata = ColumnMetadata::of::<UserProfile>();
    let mut encoded = encode_row(&profile());
    for field in &mut encoded.fields {
        if field.name == "settings" {
            field.value = DataType::Str(None);
        }
        if field.name == "labels" {
            field.value = DataType::Binary(Some(Vec::new()));
        }
    }

    let decoded: UserProfile = decode_row(&encoded, &metadata).expect("decode");
    assert_eq!(decoded.settings, Settings::default());
    assert!(decoded.labels.is_empty());
}

#[test]
fn decode_errors() {
    let metadata = ColumnMetadata::of::<UserProfile>();

    let mut encoded = encode_row(&profile());
    encoded.fields.retain(|field| field.name != "revision");
    let err = decode_row::<UserProfile>(&encoded, &metadata).unwrap_err();
    assert!(matches!(err, Error::Decode { ref column, .. } if column == "revision"));

    let mut encoded = encode_row(&profile());
    for field in &mut encoded.fields {
        if field.name == "settings" {
            field.value = DataType::Str(Some("{\"theme\":".to_string()));
        }
    }
    let err = decode_row::<UserProfile>(&encoded, &metadata).unwrap_err();
    assert!(err.to_string().starts_with("decode column `settings`"));
}

#[test]
fn encode_failure_issues_no_sql() {
    let mock = MockExecutor::new();
    let grids: Table<Grid> = Table::new(shared(&mock), "sqlite3");

    let mut grid = Grid {
        id: 1,
        cells: BTreeMap::from([((0, 0), "x".to_string())]),
    };
    let err = grids.insert(&mut grid).unwrap_err();

    assert!(matches!(err, Error::Encode { ref column, .. } if column == "cells"));
    assert!(mock.calls().is_empty());
}

#[test]
fn json_wrapper_encode_failure_issues_no_sql() {
    let mock = MockExecutor::new();
    let boards: Table<Board> = Table::new(shared(&mock), "sqlite3");

    let mut board = Board {
        id: 1,
        cells: Json(BTreeMap::from([((0, 0), "x".to_string())])),
    };

    let err = boards.insert(&mut board).unwrap_err();
    assert!(matches!(err, Error::Encode { ref column, .. } if column == "cells"));
    let err = boards.save(&mut board).unwrap_err();
    assert!(matches!(err, Error::Encode { ref column, .. } if column == "cells"));
    let err = boards.update(&board).unwrap_err();
    assert!(matches!(err, Error::Encode { ref column, .. } if column == "cells"));

    assert!(mock.calls().is_empty());
}

#[test]
fn json_wrapper_column() {
    let mock = MockExecutor::with_rows(vec![row(&[
        ("id", DataType::Int64(Some(1))),
        ("body", DataType::Binary(Some(br#"["a"]"#.to_vec()))),
    ])]);
    let documents: Table<Document> = Table::new(shared(&mock), "sqlite3");

    let mut document = Document {
        id: 1,
        body: Json(None),
    };
    documents.save(&mut document).expect("save");
    assert_eq!(mock.last().params[1], DataType::Binary(None));

    documents.select_one(&mut document, "id = ?", &[1_i64.into()]).expect("select one");
    assert_eq!(document.body.into_inner(), Some(vec!["a".to_string()]));
    assert!(ColumnMetadata::of::<Document>().json().is_empty());
}
