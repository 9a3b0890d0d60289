//! Daily FX rates written to a vertical observations table.

use ratesync_core::{Items, KeyColumns, Layout, SyncConfig, TimeSeriesBatch};

use super::{date, values};

/// Target table used by FX fixtures.
pub const TABLE: &str = "macro.observations";

/// Configuration for the vertical observations table, tagged `FRED`.
#[must_use]
pub fn config() -> SyncConfig {
    SyncConfig {
        table: TABLE.to_string(),
        index_name: KeyColumns::Single("date".to_string()),
        items: Items::List(vec![
            "series_id".to_string(),
            "value".to_string(),
            "source".to_string(),
        ]),
        layout: Layout::Vertical,
        source: Some("FRED".to_string()),
        start_date: Some("2021-01-04".to_string()),
        ..SyncConfig::default()
    }
}

/// Three days of EUR, JPY and CAD rates; JPY is missing on 2021-01-05.
#[must_use]
pub fn batch() -> TimeSeriesBatch {
    let rows = [
        (date(2021, 1, 4), ["1.2296", "103.19", "1.2790"]),
        (date(2021, 1, 5), ["1.2271", "", "1.2723"]),
        (date(2021, 1, 6), ["1.2338", "102.71", "1.2664"]),
    ];
    TimeSeriesBatch::with_rows(
        ["DEXUSEU", "DEXJPUS", "DEXCAUS"],
        rows.iter().map(|(d, row)| (*d, values(row))),
    )
    .unwrap()
}
