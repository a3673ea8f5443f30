//! Common test helpers shared across integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Once};

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tabula_orm::{DataType, ExecResult, Executor, Field, Record, Row};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

// Common test records used across multiple test files

#[derive(Debug, Default, Clone, PartialEq, Eq, Record)]
pub struct Post {
    #[record(primary_key, auto_increment)]
    pub id: i64,
    pub name: String,
    #[record(json, nullable)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Record)]
#[record(table = "memberships")]
pub struct Membership {
    #[record(primary_key)]
    pub user_id: i64,
    #[record(primary_key)]
    pub group_id: i64,
    pub role: String,
    #[record(nullable)]
    pub note: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: String,
    pub font_size: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Record)]
pub struct Audit {
    pub created_by: String,
    pub revision: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct UserProfile {
    #[record(primary_key, auto_increment)]
    pub id: i64,
    #[record(name = "display_name")]
    pub name: String,
    #[record(nullable)]
    pub age: i32,
    #[record(nullable)]
    pub score: f64,
    #[record(nullable)]
    pub verified: bool,
    #[record(json)]
    pub settings: Settings,
    #[record(json, nullable)]
    pub labels: BTreeMap<String, String>,
    pub nickname: Option<String>,
    pub joined_at: DateTime<Utc>,
    #[record(flatten)]
    pub audit: Audit,
    #[record(skip)]
    pub session: String,
}

/// A statement received by [`MockExecutor`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub params: Vec<DataType>,
}

/// Executor that records statements and replays canned results.
#[derive(Debug, Default)]
pub struct MockExecutor {
    calls: Mutex<Vec<Call>>,
    rows: Mutex<Vec<Row>>,
    result: Mutex<ExecResult>,
    failure: Mutex<Option<String>>,
}

impl MockExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every query returns `rows`.
    pub fn with_rows(rows: Vec<Row>) -> Arc<Self> {
        let mock = Self::default();
        *mock.rows.lock() = rows;
        Arc::new(mock)
    }

    /// Every statement returns `result`.
    pub fn returning(result: ExecResult) -> Arc<Self> {
        let mock = Self::default();
        *mock.result.lock() = result;
        Arc::new(mock)
    }

    /// Every statement and query fails with `message`.
    pub fn failing(message: &str) -> Arc<Self> {
        let mock = Self::default();
        *mock.failure.lock() = Some(message.to_string());
        Arc::new(mock)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    #[allow(clippy::missing_panics_doc)]
    pub fn last(&self) -> Call {
        self.calls.lock().last().cloned().expect("no statement issued")
    }

    fn record(&self, sql: &str, params: &[DataType]) -> Result<()> {
        self.calls.lock().push(Call {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        match &*self.failure.lock() {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(()),
        }
    }
}

impl Executor for MockExecutor {
    fn exec(&self, query: &str, params: &[DataType]) -> Result<ExecResult> {
        self.record(query, params)?;
        Ok(*self.result.lock())
    }

    fn query(&self, query: &str, params: &[DataType]) -> Result<Vec<Row>> {
        self.record(query, params)?;
        Ok(self.rows.lock().clone())
    }
}

/// The mock as a shared executor, keeping `mock` for inspection.
pub fn shared(mock: &Arc<MockExecutor>) -> Arc<dyn Executor> {
    let executor: Arc<MockExecutor> = Arc::clone(mock);
    executor
}

/// Build a result row from `(column, value)` pairs.
pub fn row(fields: &[(&str, DataType)]) -> Row {
    Row {
        index: "0".to_string(),
        fields: fields
            .iter()
            .map(|(name, value)| Field {
                name: (*name).to_string(),
                value: value.clone(),
            })
            .collect(),
    }
}

/// Install a debug-level subscriber once per test binary.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = Registry::default()
            .with(EnvFilter::new("debug"))
            .with(fmt::layer().with_test_writer())
            .try_init();
    });
}
