use ratesync::{ExclusionReason, SyncConfig, SyncError, TimeSeriesBatch, WriteStatus};
use ratesync_mock::MockStore;

use crate::helpers::{date, dec, fx, synchronizer, treasury};

const BULK: &str = "INSERT INTO Investing.daily_rate_treasury_data (DATE, DGS1MO, three_month, DGS1) VALUES \
('2020-06-08', 0.14, 0.16, 0.18), \n\
('2020-06-10', 0.13, 0.17, 0.19), \n\
('2020-06-15', 0.12, 0.15, 0.18), \n\
('2020-06-19', 0.14, 0.16, 0.18), \n\
('2020-06-22', 0.13, 0.16, 0.17);";

#[test]
fn bulk_insert_writes_admitted_rows() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let report = sync.write_wide(&treasury::batch()).unwrap();

    assert_eq!(sync.store().executed(), vec![BULK]);
    assert_eq!(report.rows_written, 5);
    assert_eq!(report.rows_excluded, 2);
    assert_eq!(report.status(), WriteStatus::Written);
    assert_eq!(report.exclusions[0].key, "2020-06-12");
    assert_eq!(report.exclusions[0].reason, ExclusionReason::AllAbsent);
    assert_eq!(report.exclusions[1].key, "2020-06-17");
    assert!(matches!(
        report.exclusions[1].reason,
        ExclusionReason::Sparse { .. }
    ));
}

#[test]
fn failed_bulk_insert_is_retried_row_by_row() {
    let store = MockStore::new().fail_sql_containing("'2020-06-15'");
    let mut sync = synchronizer(store, treasury::config());
    let report = sync.write_wide(&treasury::batch()).unwrap();

    let executed = sync.store().executed();
    assert_eq!(executed.len(), 6);
    assert_eq!(executed[0], BULK);
    assert_eq!(
        executed[1],
        "INSERT INTO Investing.daily_rate_treasury_data (DATE, DGS1MO, three_month, DGS1) VALUES ('2020-06-08', 0.14, 0.16, 0.18);"
    );

    assert_eq!(report.rows_written, 4);
    assert_eq!(report.rows_failed, 1);
    assert_eq!(report.status(), WriteStatus::Partial);
    assert_eq!(
        report.failures,
        vec![SyncError::write_failure(
            "row 2020-06-15",
            "forced failure: statement contains '2020-06-15'"
        )]
    );
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn without_row_fallback_the_whole_bulk_fails() {
    let store = MockStore::new().fail_sql_containing("'2020-06-15'");
    let cfg = SyncConfig {
        row_fallback: false,
        ..treasury::config()
    };
    let mut sync = synchronizer(store, cfg);
    let report = sync.write_wide(&treasury::batch()).unwrap();

    assert_eq!(sync.store().executed().len(), 1);
    assert_eq!(report.rows_written, 0);
    assert_eq!(report.rows_failed, 5);
    assert_eq!(report.status(), WriteStatus::Failed);
    assert!(matches!(
        &report.failures[0],
        SyncError::WriteFailure { unit, .. } if unit == "bulk insert into Investing.daily_rate_treasury_data"
    ));
}

#[test]
fn only_fetched_series_are_declared() {
    let batch = TimeSeriesBatch::with_rows(
        ["DGS3MO"],
        [(date(2020, 6, 8), vec![Some(dec("0.16"))])],
    )
    .unwrap();
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let report = sync.write_wide(&batch).unwrap();

    assert_eq!(
        sync.store().executed(),
        vec!["INSERT INTO Investing.daily_rate_treasury_data (DATE, three_month) VALUES ('2020-06-08', 0.16);"]
    );
    assert_eq!(report.rows_written, 1);
}

#[test]
fn batch_without_declared_series_writes_nothing_and_warns() {
    let batch = TimeSeriesBatch::with_rows(
        ["DGS30"],
        [(date(2020, 6, 8), vec![Some(dec("1.4"))])],
    )
    .unwrap();
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let report = sync.write_wide(&batch).unwrap();

    assert!(sync.store().executed().is_empty());
    assert_eq!(report.status(), WriteStatus::NothingWritten);
    assert!(report.warnings[0].contains("DGS1MO"));
}

#[test]
fn every_row_excluded_writes_nothing() {
    let batch = TimeSeriesBatch::with_rows(
        treasury::SERIES,
        [(date(2020, 6, 12), vec![None, None, None])],
    )
    .unwrap();
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let report = sync.write_wide(&batch).unwrap();

    assert!(sync.store().executed().is_empty());
    assert_eq!(report.rows_excluded, 1);
    assert!(!report.warnings.is_empty());
}

#[test]
fn vertical_table_is_rejected() {
    let mut sync = synchronizer(MockStore::new(), fx::config());
    let err = sync.write_wide(&fx::batch()).unwrap_err();
    assert!(err.is_structural());
    assert!(sync.store().log().is_empty());
}
