//! Reading a single scalar out of a result set.

use core::cmp::Ordering;

use chrono::NaiveDate;
use ratesync_types::Locator;

use super::value::{Row, SqlValue};
use crate::SyncError;

/// Where a scalar lives within the first row of a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// A named column.
    Name(String),
    /// A zero-based field index.
    Index(usize),
    /// The earliest non-null value among candidate columns.
    Earliest(Vec<String>),
}

impl From<&Locator> for Position {
    fn from(locator: &Locator) -> Self {
        match locator {
            Locator::Column(name) => Self::Name(name.clone()),
            Locator::Candidates(names) => Self::Earliest(names.clone()),
        }
    }
}

/// Extract a scalar from the first row of `rows`.
///
/// # Errors
/// Returns `SyncError::Data` if the result is empty, the position does not
/// exist, a named position is used on positional rows, or no candidate column
/// holds a non-null value.
pub fn extract_scalar(rows: &[Row], position: &Position) -> Result<SqlValue, SyncError> {
    let first = rows
        .first()
        .ok_or_else(|| SyncError::data("result set is empty"))?;
    match position {
        Position::Index(index) => first.get_index(*index).cloned().ok_or_else(|| {
            SyncError::data(format!(
                "result row has {} fields, index {index} requested",
                first.len()
            ))
        }),
        Position::Name(name) => {
            ensure_named(first)?;
            first
                .get(name)
                .cloned()
                .ok_or_else(|| SyncError::data(format!("result has no column '{name}'")))
        }
        Position::Earliest(candidates) => {
            ensure_named(first)?;
            let mut earliest: Option<&SqlValue> = None;
            for value in candidates
                .iter()
                .filter_map(|c| first.get(c))
                .filter(|v| !v.is_null())
            {
                earliest = match earliest {
                    Some(current) if value.compare(current) != Some(Ordering::Less) => {
                        Some(current)
                    }
                    _ => Some(value),
                };
            }
            earliest.cloned().ok_or_else(|| {
                SyncError::data(format!(
                    "none of the columns [{}] holds a value",
                    candidates.join(", ")
                ))
            })
        }
    }
}

/// Extract a date from the first row of `rows`.
///
/// # Errors
/// Returns `SyncError::Data` when extraction fails or the value is null or not a date.
pub fn extract_date(rows: &[Row], position: &Position) -> Result<NaiveDate, SyncError> {
    let value = extract_scalar(rows, position)?;
    value
        .as_date()
        .ok_or_else(|| SyncError::data(format!("expected a date, found {value}")))
}

/// Value of the last field of the first row.
///
/// # Errors
/// Returns `SyncError::Data` if the result is empty or its first row has no fields.
pub fn last_field(rows: &[Row]) -> Result<SqlValue, SyncError> {
    let first = rows
        .first()
        .ok_or_else(|| SyncError::data("result set is empty"))?;
    let last = first
        .len()
        .checked_sub(1)
        .ok_or_else(|| SyncError::data("result row has no fields"))?;
    extract_scalar(rows, &Position::Index(last))
}

fn ensure_named(row: &Row) -> Result<(), SyncError> {
    if row.is_named() {
        Ok(())
    } else {
        Err(SyncError::data(
            "positional result rows cannot be addressed by column name",
        ))
    }
}
