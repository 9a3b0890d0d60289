use ratesync_core::{
    MergedView, NaiveDate, Snapshot, Store, SyncError, TimeSeriesBatch, format_date,
    parse_date, partition_by_extent,
};

use crate::Synchronizer;
use crate::phase::{Phase, PhaseEvent};
use crate::report::ReconcileOutcome;

impl<S: Store> Synchronizer<S> {
    /// Reconcile `batch` against the current view, floored at the configured start date.
    ///
    /// See [`Synchronizer::reconcile_and_write_from`].
    ///
    /// # Errors
    /// As for `reconcile_and_write_from`, plus `SyncError::Configuration` when
    /// the configured start date cannot be parsed.
    pub fn reconcile_and_write(
        &mut self,
        batch: &TimeSeriesBatch,
    ) -> Result<ReconcileOutcome, SyncError> {
        let floor = self
            .cfg
            .start_date
            .as_deref()
            .map(parse_date)
            .transpose()
            .map_err(|e| SyncError::config(format!("start_date: {e}")))?;
        self.reconcile_and_write_from(batch, floor)
    }

    /// Split `batch` around the persisted extent, fill gaps in the old rows and
    /// insert the new ones.
    ///
    /// Rows strictly after the extent are inserted through `write_wide`. Rows
    /// at or before it (and after `floor`) are merged with the persisted
    /// snapshot and only cells that are absent in the table but present in
    /// the batch are updated. Existing values are never overwritten.
    ///
    /// The extent comes from the current view. If the view yields none, the
    /// latest snapshot date is used and a warning is recorded. A view whose
    /// rows carry no key column (such as an extent procedure) only supplies
    /// the extent: old rows cannot be compared against persisted values, so
    /// they are left untouched and counted as skipped.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` for vertical tables or when no
    /// current view is configured, and `SyncError::Data` when neither the
    /// view nor the snapshot yields an extent. Structural errors raised while
    /// reading the extent propagate. Per-cell and per-row write failures are
    /// reported in the outcome.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ratesync::sync::reconcile",
            skip(self, batch),
            fields(table = %self.spec.table(), rows = batch.len()),
        )
    )]
    pub fn reconcile_and_write_from(
        &mut self,
        batch: &TimeSeriesBatch,
        floor: Option<NaiveDate>,
    ) -> Result<ReconcileOutcome, SyncError> {
        self.spec.wide_mappings()?;
        let view = self.cfg.current_view.clone().ok_or_else(|| {
            SyncError::config(format!(
                "reconciling '{}' requires a current view",
                self.spec.table()
            ))
        })?;
        let mut warnings = Vec::new();
        let mut phase = Phase::Fetched;

        let rows = self.read_view(&view)?;
        let key = self.spec.date_column()?;
        let carries_snapshot = rows.first().is_none_or(|r| r.get(key).is_some());
        let snapshot = if carries_snapshot {
            Snapshot::from_rows(&rows, key)?
        } else {
            Snapshot::empty(key)
        };
        let max_date = match self.view_extent(&view, &rows) {
            Ok(date) => date,
            Err(e @ SyncError::Data(_)) if carries_snapshot => {
                let date = snapshot.max_date().ok_or_else(|| {
                    SyncError::data(format!(
                        "no persisted extent for '{}': {e}",
                        self.spec.table()
                    ))
                })?;
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, max_date = %date, "view yielded no extent; using snapshot");
                warnings.push(format!(
                    "view yielded no extent ({e}); using latest snapshot date {}",
                    format_date(date)
                ));
                date
            }
            Err(e) => return Err(e),
        };

        let partition = partition_by_extent(batch, max_date, floor);
        phase = phase.on(PhaseEvent::Partitioned)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            max_date = %max_date,
            new = partition.new.len(),
            old = partition.old.len(),
            "partitioned around persisted extent"
        );

        let merged = MergedView::left_merge(&partition.old, &snapshot);
        phase = phase.on(PhaseEvent::Merged)?;

        let updates = if carries_snapshot {
            self.fill_gaps(&merged)?
        } else {
            self.skip_gap_fill(&merged, &view, &mut warnings)?
        };
        phase = phase.on(PhaseEvent::UpdatesApplied)?;

        let inserts = self.write_wide(&partition.new)?;
        phase = phase.on(PhaseEvent::InsertsApplied)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            inserted = inserts.rows_written,
            updated = updates.succeeded,
            excluded = inserts.rows_excluded,
            "reconcile finished"
        );
        Ok(ReconcileOutcome {
            max_date,
            old_rows: partition.old.len(),
            new_rows: partition.new,
            updates,
            inserts,
            phase,
            warnings,
        })
    }
}
