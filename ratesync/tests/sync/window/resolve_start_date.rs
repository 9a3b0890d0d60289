use ratesync::{Row, SqlValue, SyncConfig, SyncError};
use ratesync_mock::MockStore;

use crate::helpers::{date, synchronizer, treasury};

const MAX_QUERY: &str = "SELECT MAX(DATE) AS DATE FROM Investing.daily_rate_treasury_data;";

#[test]
fn past_start_is_used_unchanged() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let window = sync.resolve_start_date("2020-06-01").unwrap();

    assert_eq!(window.resolved_start, date(2020, 6, 1));
    assert!(!window.is_resumed());
    assert!(sync.store().queries().is_empty());
}

#[test]
fn today_is_not_a_placeholder() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let window = sync.resolve_start_date("2020-06-23").unwrap();
    assert_eq!(window.resolved_start, date(2020, 6, 23));
    assert!(sync.store().queries().is_empty());
}

#[test]
fn future_start_resumes_day_after_persisted_max() {
    let store = MockStore::new().with_query(MAX_QUERY, treasury::max_date(date(2020, 6, 15)));
    let mut sync = synchronizer(store, treasury::config());

    let window = sync.resolve_start_date("2099-01-01").unwrap();

    assert_eq!(window.requested_start, date(2099, 1, 1));
    assert_eq!(window.resolved_start, date(2020, 6, 16));
    assert!(window.is_resumed());
    assert_eq!(sync.store().queries(), vec![MAX_QUERY]);
}

#[test]
fn text_max_date_is_parsed() {
    let store = MockStore::new().with_query(
        MAX_QUERY,
        vec![Row::named([("DATE", SqlValue::Text("2021-03-01 00:00:00".into()))])],
    );
    let mut sync = synchronizer(store, treasury::config());
    let window = sync.resolve_start_date("2099-01-01").unwrap();
    assert_eq!(window.resolved_start, date(2021, 3, 2));
}

#[test]
fn placeholder_on_empty_table_is_data_error() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let err = sync.resolve_start_date("2099-01-01").unwrap_err();
    assert!(matches!(err, SyncError::Data(ref msg) if msg.contains("no persisted rows")));
}

#[test]
fn placeholder_with_null_max_is_data_error() {
    let store =
        MockStore::new().with_query(MAX_QUERY, vec![Row::named([("DATE", SqlValue::Null)])]);
    let mut sync = synchronizer(store, treasury::config());
    let err = sync.resolve_start_date("2099-01-01").unwrap_err();
    assert!(matches!(err, SyncError::Data(_)));
}

#[test]
fn malformed_start_is_data_error() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let err = sync.resolve_start_date("06/01/2020").unwrap_err();
    assert!(matches!(err, SyncError::Data(_)));
}

#[test]
fn configured_end_date_bounds_the_window() {
    let cfg = SyncConfig {
        end_date: Some("2020-06-19".to_string()),
        ..treasury::config()
    };
    let mut sync = synchronizer(MockStore::new(), cfg);
    let window = sync.resolve_start_date("2020-06-01").unwrap();

    assert_eq!(window.end, Some(date(2020, 6, 19)));
    assert!(window.contains(date(2020, 6, 19)));
    assert!(!window.contains(date(2020, 6, 22)));
}
