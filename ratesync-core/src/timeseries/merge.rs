use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::batch::TimeSeriesBatch;
use crate::SyncError;
use crate::sql::value::{Row, SqlValue};

/// Rows currently persisted in the target table, keyed by date.
///
/// Built once from a view result and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    key: String,
    columns: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<SqlValue>>,
}

impl Snapshot {
    /// Snapshot with no rows and no known columns.
    #[must_use]
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            columns: Vec::new(),
            rows: BTreeMap::new(),
        }
    }

    /// Build from named result rows, keying each row by its `key` column.
    ///
    /// Columns are taken from the first row. Rows whose key is null are skipped;
    /// a repeated date keeps the first row.
    ///
    /// # Errors
    /// Returns `SyncError::Data` for positional rows, rows without the key
    /// column, or keys that are not dates.
    pub fn from_rows(rows: &[Row], key: &str) -> Result<Self, SyncError> {
        let mut snapshot = Self::empty(key);
        let Some(first) = rows.first() else {
            return Ok(snapshot);
        };
        let names = first
            .column_names()
            .ok_or_else(|| SyncError::data("snapshot rows must carry column names"))?;
        snapshot.columns = names
            .into_iter()
            .filter(|n| !n.eq_ignore_ascii_case(key))
            .map(str::to_string)
            .collect();

        for row in rows {
            let value = row
                .get(key)
                .ok_or_else(|| SyncError::data(format!("snapshot row has no '{key}' column")))?;
            if value.is_null() {
                continue;
            }
            let date = value.as_date().ok_or_else(|| {
                SyncError::data(format!("snapshot key '{key}' holds {value}, not a date"))
            })?;
            let values = snapshot
                .columns
                .iter()
                .map(|c| row.get(c).cloned().unwrap_or_default())
                .collect();
            snapshot.rows.entry(date).or_insert(values);
        }
        Ok(snapshot)
    }

    /// Key column name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Non-key columns.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of persisted rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if nothing is persisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True if the snapshot knows `column`.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }

    /// Persisted value at `(date, column)`.
    #[must_use]
    pub fn get(&self, date: NaiveDate, column: &str) -> Option<&SqlValue> {
        let index = self
            .columns
            .iter()
            .position(|c| c == column)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(column)))?;
        self.rows.get(&date)?.get(index)
    }

    /// True if no value is persisted at `(date, column)`.
    #[must_use]
    pub fn is_absent(&self, date: NaiveDate, column: &str) -> bool {
        self.get(date, column).is_none_or(SqlValue::is_null)
    }

    /// Latest persisted date.
    #[must_use]
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next_back().copied()
    }
}

/// Old-partition rows paired with what is persisted for the same dates.
///
/// A left join on date: every fetched row appears once; dates missing from
/// the snapshot read as entirely absent. Neither input is modified.
#[derive(Debug, Clone, Copy)]
pub struct MergedView<'a> {
    fetched: &'a TimeSeriesBatch,
    snapshot: &'a Snapshot,
}

/// One fetched row of a `MergedView`.
#[derive(Debug, Clone, Copy)]
pub struct MergedRow<'a> {
    view: MergedView<'a>,
    date: NaiveDate,
}

impl<'a> MergedView<'a> {
    /// Left-merge `fetched` onto `snapshot` by date.
    #[must_use]
    pub const fn left_merge(fetched: &'a TimeSeriesBatch, snapshot: &'a Snapshot) -> Self {
        Self { fetched, snapshot }
    }

    /// Number of fetched rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fetched.len()
    }

    /// True if there are no fetched rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fetched.is_empty()
    }

    /// Fetched side.
    #[must_use]
    pub const fn fetched(&self) -> &'a TimeSeriesBatch {
        self.fetched
    }

    /// Persisted side.
    #[must_use]
    pub const fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    /// True if persisted values for `column` can be read.
    ///
    /// An empty snapshot knows every column (all of them read as absent); a
    /// populated one only knows the columns its rows carried.
    #[must_use]
    pub fn knows_target(&self, column: &str) -> bool {
        self.snapshot.is_empty() || self.snapshot.has_column(column)
    }

    /// Rows in ascending date order.
    pub fn rows(&self) -> impl Iterator<Item = MergedRow<'a>> + 'a {
        let view = *self;
        let fetched = self.fetched;
        fetched.dates().map(move |date| MergedRow { view, date })
    }
}

impl MergedRow<'_> {
    /// Row date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Fetched value of `source`.
    #[must_use]
    pub fn fetched(&self, source: &str) -> Option<Decimal> {
        self.view.fetched.value(self.date, source)
    }

    /// Persisted value of `target` (`Null` when absent or the date is missing).
    #[must_use]
    pub fn persisted(&self, target: &str) -> SqlValue {
        self.view
            .snapshot
            .get(self.date, target)
            .cloned()
            .unwrap_or_default()
    }

    /// True if nothing is persisted for `target` on this date.
    #[must_use]
    pub fn persisted_is_absent(&self, target: &str) -> bool {
        self.view.snapshot.is_absent(self.date, target)
    }
}
