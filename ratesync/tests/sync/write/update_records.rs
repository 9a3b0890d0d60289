use std::collections::BTreeMap;

use ratesync::{NamedParams, SqlValue, SyncConfig, SyncError};
use ratesync_mock::MockStore;

use crate::helpers::{date, num, synchronizer, treasury};

fn params<const N: usize>(pairs: [(&str, SqlValue); N]) -> NamedParams {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn records() -> BTreeMap<ratesync::NaiveDate, NamedParams> {
    BTreeMap::from([
        (date(2020, 6, 10), params([("three_month", num("0.17"))])),
        (
            date(2020, 6, 11),
            params([("DGS1MO", num("0.1")), ("DGS1", num("0.2"))]),
        ),
    ])
}

#[test]
fn each_record_gets_its_own_update() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let report = sync.update_records(&records()).unwrap();

    let updates = sync.store().updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(
        updates[0].0,
        "UPDATE Investing.daily_rate_treasury_data SET three_month = %(three_month)s WHERE DATE = %(index)s;"
    );
    assert_eq!(
        updates[0].1.get("index"),
        Some(&SqlValue::Date(date(2020, 6, 10)))
    );
    // Named parameters are ordered by name.
    assert_eq!(
        updates[1].0,
        "UPDATE Investing.daily_rate_treasury_data SET DGS1 = %(DGS1)s, DGS1MO = %(DGS1MO)s WHERE DATE = %(index)s;"
    );

    assert_eq!(report.attempted, 2);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.aggregate(), 2);
}

#[test]
fn failed_record_does_not_stop_the_next() {
    let store = MockStore::new().fail_binding(num("0.17"));
    let mut sync = synchronizer(store, treasury::config());
    let report = sync.update_records(&records()).unwrap();

    assert_eq!(report.attempted, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        &report.failures[0],
        SyncError::WriteFailure { unit, .. } if unit == "row 2020-06-10"
    ));
}

#[test]
fn configured_template_is_used_verbatim() {
    let template = "UPDATE Investing.daily_rate_treasury_data SET DGS1 = %(DGS1)s WHERE DATE = %(index)s AND DGS1 IS NULL;";
    let cfg = SyncConfig {
        update_template: Some(template.to_string()),
        ..treasury::config()
    };
    let mut sync = synchronizer(MockStore::new(), cfg);
    sync.update_records(&records()).unwrap();

    assert!(sync.store().updates().iter().all(|(t, _)| *t == template));
}

#[test]
fn nothing_to_update_aggregates_to_minus_one() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let report = sync.update_records(&BTreeMap::new()).unwrap();
    assert_eq!(report.aggregate(), -1);
    assert!(sync.store().log().is_empty());
}

#[test]
fn invalid_column_name_is_configuration_error() {
    let mut sync = synchronizer(MockStore::new(), treasury::config());
    let bad = BTreeMap::from([(
        date(2020, 6, 10),
        params([("DGS1; DROP TABLE x", num("1"))]),
    )]);
    let err = sync.update_records(&bad).unwrap_err();
    assert!(err.is_structural());
}
