use chrono::NaiveDate;
use ratesync_core::{ResumeWindow, TimeSeriesBatch, UpdateReport, WriteReport};

use crate::phase::Phase;

/// Result of reconciling a fetched batch against the persisted snapshot.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Persisted extent the batch was partitioned around.
    pub max_date: NaiveDate,
    /// Rows after the extent, as handed to the wide insert.
    pub new_rows: TimeSeriesBatch,
    /// Number of rows at or before the extent that were considered for gap-fill.
    pub old_rows: usize,
    /// Gap-fill outcome.
    pub updates: UpdateReport,
    /// Insert outcome for the new rows.
    pub inserts: WriteReport,
    /// Final phase reached.
    pub phase: Phase,
    /// Non-fatal issues (e.g. extent taken from the snapshot).
    pub warnings: Vec<String>,
}

/// What a `sync` run did after fetching.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// The source returned no rows; nothing was written.
    Empty,
    /// Wide insert without reconciliation.
    Wide(WriteReport),
    /// Vertical insert.
    Vertical(WriteReport),
    /// Reconcile against the current view.
    Reconciled(Box<ReconcileOutcome>),
}

/// Summary of one end-to-end `sync` run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Window the data was fetched for.
    pub window: ResumeWindow,
    /// Rows returned by the fetcher.
    pub fetched_rows: usize,
    /// What happened to them.
    pub outcome: SyncOutcome,
    /// Non-fatal issues encountered along the way.
    pub warnings: Vec<String>,
}

impl SyncReport {
    /// Rows (or observations) inserted.
    #[must_use]
    pub fn rows_written(&self) -> usize {
        match &self.outcome {
            SyncOutcome::Empty => 0,
            SyncOutcome::Wide(r) | SyncOutcome::Vertical(r) => r.rows_written,
            SyncOutcome::Reconciled(o) => o.inserts.rows_written,
        }
    }

    /// Persisted cells filled by gap-fill.
    #[must_use]
    pub fn cells_updated(&self) -> usize {
        match &self.outcome {
            SyncOutcome::Reconciled(o) => o.updates.succeeded,
            _ => 0,
        }
    }

    /// Rows (or observations) excluded by the exclusion policy.
    #[must_use]
    pub fn rows_excluded(&self) -> usize {
        match &self.outcome {
            SyncOutcome::Empty => 0,
            SyncOutcome::Wide(r) | SyncOutcome::Vertical(r) => r.rows_excluded,
            SyncOutcome::Reconciled(o) => o.inserts.rows_excluded,
        }
    }

    /// Failed units across inserts and updates.
    #[must_use]
    pub fn failures(&self) -> usize {
        match &self.outcome {
            SyncOutcome::Empty => 0,
            SyncOutcome::Wide(r) | SyncOutcome::Vertical(r) => r.failures.len(),
            SyncOutcome::Reconciled(o) => o.inserts.failures.len() + o.updates.failed(),
        }
    }
}
