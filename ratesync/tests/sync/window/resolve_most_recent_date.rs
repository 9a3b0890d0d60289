use ratesync::{CurrentView, Locator, Row, SqlValue, SyncConfig, SyncError};
use ratesync_mock::MockStore;

use crate::helpers::{
    TREASURY_VIEW, date, positional, synchronizer, treasury, treasury_store, treasury_with_view,
};

fn procedure_view() -> SyncConfig {
    SyncConfig {
        current_view: Some(CurrentView::Procedure {
            name: "sp_series_extent".to_string(),
            args: vec!["GDP".to_string()],
            location: None,
        }),
        ..treasury::config()
    }
}

#[test]
fn without_view_the_candidate_is_returned() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    assert_eq!(
        sync.resolve_most_recent_date(Some("2020-06-01")).unwrap(),
        "2020-06-01"
    );
}

#[test]
fn without_view_or_candidate_is_configuration_error() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let err = sync.resolve_most_recent_date(None).unwrap_err();
    assert!(err.is_structural());
}

#[test]
fn without_candidate_the_extent_is_returned() {
    let mut sync = synchronizer(treasury_store(), treasury_with_view());
    assert_eq!(sync.resolve_most_recent_date(None).unwrap(), "2020-06-15");
    assert_eq!(sync.store().queries(), vec![TREASURY_VIEW]);
}

#[test]
fn extent_at_or_after_candidate_advances_one_day() {
    let mut sync = synchronizer(treasury_store(), treasury_with_view());
    assert_eq!(
        sync.resolve_most_recent_date(Some("2020-06-01")).unwrap(),
        "2020-06-16"
    );
    assert_eq!(
        sync.resolve_most_recent_date(Some("2020-06-15")).unwrap(),
        "2020-06-16"
    );
}

#[test]
fn extent_before_candidate_keeps_candidate() {
    let mut sync = synchronizer(treasury_store(), treasury_with_view());
    assert_eq!(
        sync.resolve_most_recent_date(Some("2020-07-01")).unwrap(),
        "2020-07-01"
    );
}

#[test]
fn located_column_is_read_from_first_row() {
    let cfg = SyncConfig {
        current_view: Some(CurrentView::Query {
            query: "SELECT last_update FROM meta;".to_string(),
            location: Some(Locator::Column("last_update".to_string())),
        }),
        ..treasury::config()
    };
    let store = MockStore::new().with_query(
        "FROM meta",
        vec![Row::named([("last_update", SqlValue::Date(date(2021, 1, 29)))])],
    );
    let mut sync = synchronizer(store, cfg);
    assert_eq!(
        sync.resolve_most_recent_date(Some("2021-01-01")).unwrap(),
        "2021-01-30"
    );
}

#[test]
fn earliest_candidate_column_wins() {
    let cfg = SyncConfig {
        current_view: Some(CurrentView::Table {
            name: "meta.extents".to_string(),
            location: Some(Locator::Candidates(vec![
                "max_rates".to_string(),
                "max_fx".to_string(),
            ])),
        }),
        ..treasury::config()
    };
    let store = MockStore::new().with_query(
        "SELECT * FROM meta.extents;",
        vec![Row::named([
            ("max_rates", SqlValue::Date(date(2021, 2, 3))),
            ("max_fx", SqlValue::Date(date(2021, 1, 29))),
        ])],
    );
    let mut sync = synchronizer(store, cfg);
    assert_eq!(sync.resolve_most_recent_date(None).unwrap(), "2021-01-29");
}

#[test]
fn procedure_reported_quarterly_advances_three_months_of_days() {
    let store = MockStore::new().with_procedure(
        "sp_series_extent",
        vec![positional([
            SqlValue::Date(date(2021, 3, 31)),
            SqlValue::Text("Quarterly".into()),
        ])],
    );
    let mut sync = synchronizer(store, procedure_view());

    // March, April and May: 92 days.
    assert_eq!(
        sync.resolve_most_recent_date(Some("2021-01-01")).unwrap(),
        "2021-07-01"
    );
    assert_eq!(
        sync.store().log(),
        [ratesync_mock::Recorded::Procedure {
            name: "sp_series_extent".to_string(),
            args: vec![SqlValue::Text("GDP".into())],
        }]
    );
}

#[test]
fn procedure_reported_monthly() {
    let store = MockStore::new().with_procedure(
        "sp_series_extent",
        vec![positional([
            SqlValue::Date(date(2021, 2, 1)),
            SqlValue::Text("M".into()),
        ])],
    );
    let mut sync = synchronizer(store, procedure_view());
    assert_eq!(
        sync.resolve_most_recent_date(Some("2021-02-01")).unwrap(),
        "2021-03-01"
    );
}

#[test]
fn unknown_periodicity_label_falls_back_to_daily() {
    let store = MockStore::new().with_procedure(
        "sp_series_extent",
        vec![positional([
            SqlValue::Date(date(2021, 3, 31)),
            SqlValue::Text("fortnightly".into()),
        ])],
    );
    let mut sync = synchronizer(store, procedure_view());
    assert_eq!(
        sync.resolve_most_recent_date(Some("2021-01-01")).unwrap(),
        "2021-04-01"
    );
}

#[test]
fn empty_view_keeps_candidate() {
    let mut sync = synchronizer(MockStore::new(), treasury_with_view());
    assert_eq!(
        sync.resolve_most_recent_date(Some("2020-06-01")).unwrap(),
        "2020-06-01"
    );
}

#[test]
fn empty_view_without_candidate_is_data_error() {
    let mut sync = synchronizer(MockStore::new(), treasury_with_view());
    let err = sync.resolve_most_recent_date(None).unwrap_err();
    assert!(matches!(err, SyncError::Data(_)));
}

#[test]
fn failing_view_propagates_store_error() {
    let store =
        MockStore::new().with_query_failure(TREASURY_VIEW, SyncError::store("connection reset"));
    let mut sync = synchronizer(store, treasury_with_view());
    let err = sync.resolve_most_recent_date(Some("2020-06-01")).unwrap_err();
    assert_eq!(err, SyncError::store("connection reset"));
}
