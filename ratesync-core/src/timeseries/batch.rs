use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::SyncError;

/// Date-indexed table of fetched observations.
///
/// Each row holds one value slot per column, in column order; `None` marks an
/// absent observation. Dates are unique and iterate in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeSeriesBatch {
    columns: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<Option<Decimal>>>,
}

impl TimeSeriesBatch {
    /// Empty batch with the given columns.
    ///
    /// # Errors
    /// Returns `SyncError::Data` if a column name repeats.
    pub fn new<I, S>(columns: I) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(SyncError::data(format!("column '{column}' appears twice")));
            }
        }
        Ok(Self {
            columns,
            rows: BTreeMap::new(),
        })
    }

    /// Batch built from `(date, values)` rows.
    ///
    /// # Errors
    /// Returns `SyncError::Data` on repeated columns, repeated dates, or rows
    /// whose width differs from the column count.
    pub fn with_rows<I, S, R>(columns: I, rows: R) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = (NaiveDate, Vec<Option<Decimal>>)>,
    {
        let mut batch = Self::new(columns)?;
        for (date, values) in rows {
            batch.push(date, values)?;
        }
        Ok(batch)
    }

    /// Batch built from floating-point rows where `NaN` (or any non-finite
    /// value) marks an absent observation.
    ///
    /// # Errors
    /// Same as [`TimeSeriesBatch::with_rows`], plus `SyncError::Data` for a
    /// finite value outside the decimal range.
    pub fn from_f64_rows<I, S, R>(columns: I, rows: R) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = (NaiveDate, Vec<f64>)>,
    {
        let mut batch = Self::new(columns)?;
        for (date, values) in rows {
            let values = values
                .into_iter()
                .map(|v| decimal_from_f64(date, v))
                .collect::<Result<Vec<_>, _>>()?;
            batch.push(date, values)?;
        }
        Ok(batch)
    }

    /// Add a row.
    ///
    /// # Errors
    /// Returns `SyncError::Data` if `date` is already present or `values` has
    /// the wrong width.
    pub fn push(&mut self, date: NaiveDate, values: Vec<Option<Decimal>>) -> Result<(), SyncError> {
        if values.len() != self.columns.len() {
            return Err(SyncError::data(format!(
                "row {date} has {} values for {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        match self.rows.entry(date) {
            Entry::Vacant(v) => {
                v.insert(values);
                Ok(())
            }
            Entry::Occupied(_) => Err(SyncError::data(format!("date {date} appears twice"))),
        }
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of `column`.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// True if `column` is present.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    /// Earliest date.
    #[must_use]
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next().copied()
    }

    /// Latest date.
    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next_back().copied()
    }

    /// Values of the row at `date`.
    #[must_use]
    pub fn row(&self, date: NaiveDate) -> Option<&[Option<Decimal>]> {
        self.rows.get(&date).map(Vec::as_slice)
    }

    /// Value of `column` at `date`; `None` when absent or unknown.
    #[must_use]
    pub fn value(&self, date: NaiveDate, column: &str) -> Option<Decimal> {
        let index = self.column_index(column)?;
        self.rows.get(&date)?.get(index).copied().flatten()
    }

    /// Rows in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[Option<Decimal>])> + '_ {
        self.rows.iter().map(|(d, v)| (*d, v.as_slice()))
    }

    /// New batch holding the rows for which `keep` returns true.
    #[must_use]
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(NaiveDate, &[Option<Decimal>]) -> bool,
    {
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|(d, v)| keep(**d, v))
                .map(|(d, v)| (*d, v.clone()))
                .collect(),
        }
    }
}

fn decimal_from_f64(date: NaiveDate, value: f64) -> Result<Option<Decimal>, SyncError> {
    if !value.is_finite() {
        return Ok(None);
    }
    Decimal::from_f64(value)
        .map(Some)
        .ok_or_else(|| SyncError::data(format!("row {date} holds {value}, outside the decimal range")))
}
