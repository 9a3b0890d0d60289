use ratesync::{SqlValue, WriteStatus};
use ratesync_mock::MockStore;

use crate::helpers::{date, num, synchronizer, treasury};

fn record() -> Vec<(String, SqlValue)> {
    vec![
        ("DATE".to_string(), SqlValue::Date(date(2020, 6, 24))),
        ("DGS1MO".to_string(), num("0.15")),
        ("three_month".to_string(), SqlValue::Null),
    ]
}

#[test]
fn record_is_inserted_as_one_literal_row() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let report = sync.write_record(&record()).unwrap();

    assert_eq!(
        sync.store().executed(),
        vec!["INSERT INTO Investing.daily_rate_treasury_data (DATE, DGS1MO, three_month) VALUES ('2020-06-24', 0.15, NULL);"]
    );
    assert_eq!(report.rows_written, 1);
    assert_eq!(report.status(), WriteStatus::Written);
}

#[test]
fn record_without_key_is_configuration_error() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let err = sync.write_record(&record()[1..]).unwrap_err();
    assert!(err.is_structural());
    assert!(sync.store().executed().is_empty());
}

#[test]
fn failed_record_is_reported_by_date() {
    let store = MockStore::new().fail_sql_containing("INSERT INTO");
    let mut sync = synchronizer(store, treasury::config());
    let report = sync.write_record(&record()).unwrap();

    assert_eq!(report.rows_failed, 1);
    assert_eq!(report.status(), WriteStatus::Failed);
    assert!(matches!(
        &report.failures[0],
        ratesync::SyncError::WriteFailure { unit, .. } if unit == "record 2020-06-24"
    ));
}
