//! Common test helpers shared across integration tests.
#![allow(dead_code)]

use std::sync::Once;

use tabula_orm::Backend;
use tabula_sqlite::{ConnectOptions, SqlDefault};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// A private in-memory database.
#[allow(clippy::missing_panics_doc)]
pub fn connect() -> SqlDefault {
    init_tracing();
    SqlDefault::connect_with(ConnectOptions {
        database: ":memory:".to_string(),
    })
    .expect("connect")
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
