use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta};
use ratesync_types::Periodicity;

use crate::SyncError;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, and timestamps whose date part uses
/// either form (`2021-03-01 00:00:00`, `2021-03-01T00:00:00`).
///
/// # Errors
/// Returns `SyncError::Data` if the text is not a date in one of these forms.
pub fn parse_date(text: &str) -> Result<NaiveDate, SyncError> {
    let text = text.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt.date());
        }
    }
    // Timestamps with fractional seconds or offsets: fall back to the leading date.
    if let Some(head) = text.get(..10)
        && text.len() > 10
    {
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(head, format) {
                return Ok(date);
            }
        }
    }
    Err(SyncError::data(format!("'{text}' is not a date")))
}

/// Format a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Advance applied to a persisted extent to get the next expected observation.
///
/// Daily cadence advances one day. Monthly, quarterly and annual cadences
/// advance by the number of days in the 1, 3 or 12 calendar months starting
/// with the extent's month, so an extent of `2021-01-15` with monthly cadence
/// advances 31 days.
#[must_use]
pub fn period_advance(extent: NaiveDate, periodicity: Periodicity) -> TimeDelta {
    let Some(months) = periodicity.months() else {
        return TimeDelta::days(1);
    };
    let Some(start) = extent.with_day(1) else {
        return TimeDelta::days(1);
    };
    start
        .checked_add_months(Months::new(months))
        .map_or_else(|| TimeDelta::days(1), |end| end.signed_duration_since(start))
}

/// The extent advanced by one period.
///
/// # Errors
/// Returns `SyncError::Data` if the result falls outside the supported date range.
pub fn advance_extent(extent: NaiveDate, periodicity: Periodicity) -> Result<NaiveDate, SyncError> {
    extent
        .checked_add_signed(period_advance(extent, periodicity))
        .ok_or_else(|| SyncError::data(format!("cannot advance {extent} by one period")))
}
