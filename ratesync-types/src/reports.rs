//! Report envelopes produced by write, update, and reconcile operations.

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::operation::Operation;

/// Why a fetched row (or observation) was not admitted into a write.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Every value in the row is absent.
    AllAbsent,
    /// The absent fraction exceeds the configured threshold.
    Sparse {
        /// Fraction of absent values in the row.
        absent_fraction: f64,
    },
    /// Mean and variance across the row fall below the placeholder epsilon.
    Flat,
    /// A single vertical observation has no value.
    AbsentValue,
}

/// A row excluded by the exclusion policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    /// Row identity, e.g. `2020-06-10` or `2020-06-10/DGS1`.
    pub key: String,
    /// Why the row was excluded.
    pub reason: ExclusionReason,
}

/// Overall outcome of a write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    /// Every admitted row was written.
    Written,
    /// Some rows were written and some failed.
    Partial,
    /// No row survived exclusion (or the input was empty).
    NothingWritten,
    /// Every admitted row failed.
    Failed,
}

/// Summary of an insert operation.
///
/// Carries the counts a run reports to its caller together with the
/// excluded rows, per-unit failures, and non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteReport {
    /// Operation that produced this report.
    pub operation: Operation,
    /// Rows (or observations) persisted.
    pub rows_written: usize,
    /// Rows (or observations) rejected by the exclusion policy.
    pub rows_excluded: usize,
    /// Rows (or observations) whose write failed.
    pub rows_failed: usize,
    /// Details for each excluded row.
    pub exclusions: Vec<Exclusion>,
    /// Per-unit write failures.
    pub failures: Vec<SyncError>,
    /// Non-fatal issues encountered while building the report.
    pub warnings: Vec<String>,
}

impl WriteReport {
    /// Empty report for `operation`.
    #[must_use]
    pub const fn new(operation: Operation) -> Self {
        Self {
            operation,
            rows_written: 0,
            rows_excluded: 0,
            rows_failed: 0,
            exclusions: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record an excluded row.
    pub fn exclude(&mut self, key: impl Into<String>, reason: ExclusionReason) {
        self.rows_excluded += 1;
        self.exclusions.push(Exclusion {
            key: key.into(),
            reason,
        });
    }

    /// Record `rows` failed rows caused by `error`.
    pub fn fail(&mut self, rows: usize, error: SyncError) {
        self.rows_failed += rows;
        self.failures.push(error);
    }

    /// Overall outcome derived from the counts.
    #[must_use]
    pub const fn status(&self) -> WriteStatus {
        match (self.rows_written, self.rows_failed) {
            (0, 0) => WriteStatus::NothingWritten,
            (0, _) => WriteStatus::Failed,
            (_, 0) => WriteStatus::Written,
            _ => WriteStatus::Partial,
        }
    }

    /// True if no admitted row failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.rows_failed == 0
    }
}

/// Summary of a batch of independent UPDATE statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    /// Operation that produced this report.
    pub operation: Operation,
    /// Rows inspected for updates.
    pub rows_considered: usize,
    /// UPDATE statements issued.
    pub attempted: usize,
    /// UPDATE statements that succeeded.
    pub succeeded: usize,
    /// Column pairs skipped because either side was unknown.
    pub skipped: usize,
    /// Per-cell (or per-row) failures.
    pub failures: Vec<SyncError>,
}

impl UpdateReport {
    /// Empty report for `operation`.
    #[must_use]
    pub const fn new(operation: Operation) -> Self {
        Self {
            operation,
            rows_considered: 0,
            attempted: 0,
            succeeded: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }

    /// Number of failed statements.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Aggregate success count.
    ///
    /// `-1` when there was nothing to update, otherwise the number of
    /// successful statements. Zero with `attempted > 0` means every statement failed.
    #[must_use]
    pub fn aggregate(&self) -> i64 {
        if self.rows_considered == 0 {
            -1
        } else {
            i64::try_from(self.succeeded).unwrap_or(i64::MAX)
        }
    }
}
