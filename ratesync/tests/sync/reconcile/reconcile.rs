use ratesync::{
    CurrentView, Locator, Phase, Row, SqlValue, SyncConfig, SyncError, TimeSeriesBatch, WriteStatus,
};
use ratesync_mock::MockStore;

use crate::helpers::{
    TREASURY_VIEW, date, dec, fx, num, synchronizer, treasury, treasury_store, treasury_with_view,
};

fn gap_fill(column: &str) -> String {
    format!("UPDATE Investing.daily_rate_treasury_data SET {column} = %(result)s WHERE DATE = %(date)s;")
}

#[test]
fn old_rows_fill_gaps_and_new_rows_are_inserted() {
    let mut sync = synchronizer(treasury_store(), treasury_with_view());
    let outcome = sync.reconcile_and_write(&treasury::batch()).unwrap();

    assert_eq!(outcome.max_date, date(2020, 6, 15));
    assert_eq!(outcome.old_rows, 4);
    let new: Vec<_> = outcome.new_rows.dates().collect();
    assert_eq!(new, vec![date(2020, 6, 17), date(2020, 6, 19), date(2020, 6, 22)]);

    // 2020-06-08 has no persisted row; 2020-06-10 only lacks three_month.
    let updates = sync.store().updates();
    let cells: Vec<(String, SqlValue, SqlValue)> = updates
        .iter()
        .map(|(t, p)| (t.to_string(), p["date"].clone(), p["result"].clone()))
        .collect();
    assert_eq!(
        cells,
        vec![
            (gap_fill("DGS1MO"), SqlValue::Date(date(2020, 6, 8)), num("0.14")),
            (gap_fill("three_month"), SqlValue::Date(date(2020, 6, 8)), num("0.16")),
            (gap_fill("DGS1"), SqlValue::Date(date(2020, 6, 8)), num("0.18")),
            (gap_fill("three_month"), SqlValue::Date(date(2020, 6, 10)), num("0.17")),
        ]
    );
    assert_eq!(outcome.updates.rows_considered, 4);
    assert_eq!(outcome.updates.succeeded, 4);
    assert_eq!(outcome.updates.aggregate(), 4);

    assert_eq!(
        sync.store().executed(),
        vec!["INSERT INTO Investing.daily_rate_treasury_data (DATE, DGS1MO, three_month, DGS1) VALUES ('2020-06-19', 0.14, 0.16, 0.18), \n('2020-06-22', 0.13, 0.16, 0.17);"]
    );
    assert_eq!(outcome.inserts.rows_written, 2);
    assert_eq!(outcome.inserts.rows_excluded, 1);
    assert_eq!(outcome.phase, Phase::Done);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn failed_cell_does_not_stop_remaining_cells() {
    let store = treasury_store().fail_binding(num("0.17"));
    let mut sync = synchronizer(store, treasury_with_view());
    let outcome = sync.reconcile_and_write(&treasury::batch()).unwrap();

    assert_eq!(outcome.updates.attempted, 4);
    assert_eq!(outcome.updates.succeeded, 3);
    assert_eq!(
        outcome.updates.failures,
        vec![SyncError::write_failure(
            "cell three_month@2020-06-10",
            "forced failure: binds 0.17"
        )]
    );
    assert_eq!(outcome.inserts.status(), WriteStatus::Written);
    assert!(outcome.phase.is_done());
}

#[test]
fn floor_drops_old_rows_outside_the_window() {
    let mut sync = synchronizer(treasury_store(), treasury_with_view());
    let outcome = sync
        .reconcile_and_write_from(&treasury::batch(), Some(date(2020, 6, 10)))
        .unwrap();

    assert_eq!(outcome.old_rows, 2);
    assert!(sync.store().updates().is_empty());
    assert_eq!(outcome.updates.attempted, 0);
    assert_eq!(outcome.inserts.rows_written, 2);
}

#[test]
fn nothing_new_still_completes() {
    let batch = TimeSeriesBatch::with_rows(
        treasury::SERIES,
        [(date(2020, 6, 10), vec![Some(dec("0.13")), Some(dec("0.17")), Some(dec("0.19"))])],
    )
    .unwrap();
    let mut sync = synchronizer(treasury_store(), treasury_with_view());
    let outcome = sync.reconcile_and_write(&batch).unwrap();

    assert!(outcome.new_rows.is_empty());
    assert_eq!(outcome.inserts.status(), WriteStatus::NothingWritten);
    assert_eq!(outcome.updates.succeeded, 1);
    assert!(sync.store().executed().is_empty());
    assert_eq!(outcome.phase, Phase::Done);
}

#[test]
fn missing_view_extent_falls_back_to_snapshot() {
    let cfg = SyncConfig {
        current_view: Some(CurrentView::Query {
            query: TREASURY_VIEW.to_string(),
            location: Some(Locator::Column("last_update".to_string())),
        }),
        ..treasury::config()
    };
    let mut sync = synchronizer(treasury_store(), cfg);
    let outcome = sync.reconcile_and_write(&treasury::batch()).unwrap();

    assert_eq!(outcome.max_date, date(2020, 6, 15));
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("2020-06-15"));
}

#[test]
fn empty_snapshot_without_extent_is_data_error() {
    let mut sync = synchronizer(MockStore::new(), treasury_with_view());
    let err = sync.reconcile_and_write(&treasury::batch()).unwrap_err();
    assert!(matches!(err, SyncError::Data(_)));
    assert!(sync.store().executed().is_empty());
}

#[test]
fn extent_only_view_without_extent_is_data_error() {
    let store = MockStore::new().with_procedure(
        "sp_treasury_extent",
        vec![Row::named([("frequency", SqlValue::Text("daily".into()))])],
    );
    let cfg = SyncConfig {
        current_view: Some(CurrentView::Procedure {
            name: "sp_treasury_extent".to_string(),
            args: Vec::new(),
            location: Some(Locator::Column("max_date".to_string())),
        }),
        ..treasury::config()
    };
    let mut sync = synchronizer(store, cfg);
    let err = sync.reconcile_and_write(&treasury::batch()).unwrap_err();
    assert!(matches!(err, SyncError::Data(ref msg) if msg.contains("max_date")));
    assert!(sync.store().executed().is_empty());
    assert!(sync.store().updates().is_empty());
}

#[test]
fn missing_view_is_configuration_error() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let err = sync.reconcile_and_write(&treasury::batch()).unwrap_err();
    assert!(err.is_structural());
}

#[test]
fn vertical_table_is_rejected() {
    let cfg = SyncConfig {
        current_view: Some(CurrentView::Table {
            name: "macro.observations".to_string(),
            location: None,
        }),
        ..fx::config()
    };
    let mut sync = synchronizer(MockStore::new(), cfg);
    let err = sync.reconcile_and_write(&fx::batch()).unwrap_err();
    assert!(err.is_structural());
    assert!(sync.store().log().is_empty());
}
