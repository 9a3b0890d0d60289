// Shared builders so suites can `use crate::helpers::*;`
#![allow(dead_code)]

use ratesync::{CurrentView, NaiveDate, Row, SqlValue, SyncConfig, Synchronizer};
use ratesync_mock::MockStore;

pub use ratesync_mock::fixtures::{date, dec, fx, treasury};

/// Query used as the treasury current view in reconcile suites.
pub const TREASURY_VIEW: &str = "SELECT * FROM Investing.v_treasury_current;";

/// Pinned "today" for every suite.
pub fn today() -> NaiveDate {
    date(2020, 6, 23)
}

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Synchronizer over `store` with `cfg` and the pinned date.
pub fn synchronizer(store: MockStore, cfg: SyncConfig) -> Synchronizer<MockStore> {
    init_tracing();
    Synchronizer::builder(store)
        .config(cfg)
        .today(today())
        .build()
        .unwrap()
}

/// Treasury configuration reading its extent and snapshot from `TREASURY_VIEW`.
pub fn treasury_with_view() -> SyncConfig {
    SyncConfig {
        current_view: Some(CurrentView::Query {
            query: TREASURY_VIEW.to_string(),
            location: None,
        }),
        ..treasury::config()
    }
}

/// Store answering `TREASURY_VIEW` with the persisted treasury rows.
pub fn treasury_store() -> MockStore {
    MockStore::new().with_query(TREASURY_VIEW, treasury::snapshot())
}

/// Positional row shorthand.
pub fn positional<const N: usize>(values: [SqlValue; N]) -> Row {
    Row::Positional(values.to_vec())
}

/// Decimal parameter shorthand.
pub fn num(s: &str) -> SqlValue {
    SqlValue::Decimal(dec(s))
}
