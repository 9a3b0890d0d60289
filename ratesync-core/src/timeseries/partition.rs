use chrono::{Datelike, NaiveDate};

use super::batch::TimeSeriesBatch;

/// Fetched rows split around the persisted extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Rows after the extent; candidates for INSERT.
    pub new: TimeSeriesBatch,
    /// Rows at or before the extent (and after the floor); candidates for gap-fill.
    pub old: TimeSeriesBatch,
}

/// True if `date` falls after `extent` on the calendar.
///
/// Compares `(year, month)` first and the day within the month second.
#[must_use]
pub fn is_newer_than(date: NaiveDate, extent: NaiveDate) -> bool {
    let (ym, extent_ym) = ((date.year(), date.month()), (extent.year(), extent.month()));
    ym > extent_ym || (ym == extent_ym && date.day() > extent.day())
}

/// Split `batch` into rows after `extent` and rows at or before it.
///
/// With a `floor`, rows at or before the floor are dropped from the old side
/// (they are outside the requested window). The new side is never floored.
/// Without a floor every row lands in exactly one side.
#[must_use]
pub fn partition_by_extent(
    batch: &TimeSeriesBatch,
    extent: NaiveDate,
    floor: Option<NaiveDate>,
) -> Partition {
    Partition {
        new: batch.filter(|date, _| is_newer_than(date, extent)),
        old: batch.filter(|date, _| {
            !is_newer_than(date, extent) && floor.is_none_or(|floor| date > floor)
        }),
    }
}
