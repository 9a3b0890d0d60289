//! Daily treasury constant-maturity yields in a wide table.

use ratesync_core::{Items, KeyColumns, Row, SqlValue, SyncConfig, TimeSeriesBatch};

use super::{date, dec, values};

/// Target table used by treasury fixtures.
pub const TABLE: &str = "Investing.daily_rate_treasury_data";

/// Series fetched from the source; `DGS3MO` lands in column `three_month`.
pub const SERIES: [&str; 3] = ["DGS1MO", "DGS3MO", "DGS1"];

/// Configuration for the treasury table with no current view.
#[must_use]
pub fn config() -> SyncConfig {
    SyncConfig {
        table: TABLE.to_string(),
        index_name: KeyColumns::Single("DATE".to_string()),
        items: Items::Map(vec![
            ("DGS1MO".to_string(), String::new()),
            ("DGS3MO".to_string(), "three_month".to_string()),
            ("DGS1".to_string(), String::new()),
        ]),
        start_date: Some("2020-06-01".to_string()),
        ..SyncConfig::default()
    }
}

/// Fetched yields for 2020-06-08 through 2020-06-22.
///
/// 2020-06-12 is all absent and 2020-06-17 only has one of three series, so
/// both are excluded by the default policy.
#[must_use]
pub fn batch() -> TimeSeriesBatch {
    let rows = [
        (date(2020, 6, 8), ["0.14", "0.16", "0.18"]),
        (date(2020, 6, 10), ["0.13", "0.17", "0.19"]),
        (date(2020, 6, 12), ["", "", ""]),
        (date(2020, 6, 15), ["0.12", "0.15", "0.18"]),
        (date(2020, 6, 17), ["0.13", "", ""]),
        (date(2020, 6, 19), ["0.14", "0.16", "0.18"]),
        (date(2020, 6, 22), ["0.13", "0.16", "0.17"]),
    ];
    TimeSeriesBatch::with_rows(
        SERIES,
        rows.iter().map(|(d, row)| (*d, values(row))),
    )
    .unwrap()
}

/// Rows persisted through 2020-06-15.
///
/// 2020-06-10 is missing its `three_month` value and 2020-06-08 has no row at
/// all, so a reconcile fills both from fetched data.
#[must_use]
pub fn snapshot() -> Vec<Row> {
    let row = |d, one_month: Option<&str>, three_month: Option<&str>, one_year: Option<&str>| {
        let value = |v: Option<&str>| v.map_or(SqlValue::Null, |v| SqlValue::Decimal(dec(v)));
        Row::named([
            ("DATE", SqlValue::Date(d)),
            ("DGS1MO", value(one_month)),
            ("three_month", value(three_month)),
            ("DGS1", value(one_year)),
        ])
    };
    vec![
        row(date(2020, 6, 9), Some("0.14"), Some("0.17"), Some("0.18")),
        row(date(2020, 6, 10), Some("0.13"), None, Some("0.19")),
        row(date(2020, 6, 11), Some("0.13"), Some("0.16"), Some("0.18")),
        row(date(2020, 6, 15), Some("0.12"), Some("0.15"), Some("0.18")),
    ]
}

/// Result of `SELECT MAX(DATE) AS DATE ...` for the persisted rows.
#[must_use]
pub fn max_date(d: chrono::NaiveDate) -> Vec<Row> {
    vec![Row::named([("DATE", SqlValue::Date(d))])]
}
