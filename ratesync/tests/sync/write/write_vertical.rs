use ratesync::{ExclusionReason, Items, SqlValue, SyncConfig, SyncError, WriteStatus};
use ratesync_mock::MockStore;

use crate::helpers::{date, fx, num, synchronizer, treasury};

const SQL: &str = "INSERT INTO macro.observations (date, series_id, value, source) VALUES (%s, %s, %s, %s);";

#[test]
fn observations_become_positional_rows() {
    let mut sync = synchronizer(MockStore::new(), fx::config());
    let report = sync.write_vertical(&fx::batch()).unwrap();

    let batches = sync.store().batches();
    assert_eq!(batches.len(), 1);
    let (sql, rows) = batches[0];
    assert_eq!(sql, SQL);
    assert_eq!(rows.len(), 8);
    assert_eq!(
        rows[0].values(),
        vec![
            &SqlValue::Date(date(2021, 1, 4)),
            &SqlValue::Text("DEXUSEU".into()),
            &num("1.2296"),
            &SqlValue::Text("FRED".into()),
        ]
    );

    assert_eq!(report.rows_written, 8);
    assert_eq!(report.rows_excluded, 1);
    assert_eq!(report.exclusions[0].key, "2021-01-05/DEXJPUS");
    assert_eq!(report.exclusions[0].reason, ExclusionReason::AbsentValue);
}

#[test]
fn failing_batch_does_not_stop_the_rest() {
    let store = MockStore::new().fail_binding(num("103.19"));
    let cfg = SyncConfig {
        batch_size: 3,
        ..fx::config()
    };
    let mut sync = synchronizer(store, cfg);
    let report = sync.write_vertical(&fx::batch()).unwrap();

    let sizes: Vec<usize> = sync.store().batches().iter().map(|(_, r)| r.len()).collect();
    assert_eq!(sizes, vec![3, 3, 2]);
    assert_eq!(report.rows_written, 5);
    assert_eq!(report.rows_failed, 3);
    assert_eq!(report.status(), WriteStatus::Partial);
    assert!(matches!(
        &report.failures[0],
        SyncError::WriteFailure { unit, .. }
            if unit == "parameter batch 0 (2021-01-04/DEXUSEU .. 2021-01-04/DEXCAUS)"
    ));
}

#[test]
fn wide_vertical_tables_bind_keyed_rows() {
    let cfg = SyncConfig {
        items: Items::List(vec![
            "series_id".to_string(),
            "value".to_string(),
            "source".to_string(),
            "units".to_string(),
        ]),
        ..fx::config()
    };
    let mut sync = synchronizer(MockStore::new(), cfg);
    sync.write_vertical(&fx::batch()).unwrap();

    let (sql, rows) = sync.store().batches()[0];
    assert_eq!(
        sql,
        "INSERT INTO macro.observations (date, series_id, value, source, units) VALUES \
         (%(date)s, %(series_id)s, %(value)s, %(source)s, %(units)s);"
    );
    assert_eq!(rows[0].get("series_id"), Some(&SqlValue::Text("DEXUSEU".into())));
    assert_eq!(rows[0].get("units"), Some(&SqlValue::Null));
}

#[test]
fn wide_table_is_rejected() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let err = sync.write_vertical(&treasury::batch()).unwrap_err();
    assert!(err.is_structural());
}
