use ratesync_core::{Fetcher, Layout, Store, SyncError, format_date, parse_date};

use crate::Synchronizer;
use crate::report::{SyncOutcome, SyncReport};

impl<S: Store> Synchronizer<S> {
    /// Run one complete synchronization.
    ///
    /// Resolves the start date, fetches, and when appending against a
    /// current view resolves the most recent persisted date and fetches again
    /// if the resume point moved. The batch is then written according to the
    /// table layout: vertical tables through `write_vertical`, wide tables
    /// with a current view through `reconcile_and_write_from`, other wide
    /// tables through `write_wide`.
    ///
    /// An empty fetch writes nothing and is reported with a warning.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if no start date is configured, and
    /// any structural or data error raised while resolving dates, fetching or
    /// reading the current view.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ratesync::sync::pipeline",
            skip(self, fetcher),
            fields(table = %self.spec.table(), dry_run = self.cfg.dry_run),
        )
    )]
    pub fn sync<F: Fetcher>(&mut self, fetcher: &mut F) -> Result<SyncReport, SyncError> {
        let requested = self.cfg.start_date.clone().ok_or_else(|| {
            SyncError::config(format!("syncing '{}' requires a start_date", self.spec.table()))
        })?;
        let mut warnings = Vec::new();

        let mut window = self.resolve_start_date(&requested)?;
        let mut batch = fetcher.fetch(&window)?;

        if self.cfg.append && self.cfg.current_view.is_some() {
            let resolved = format_date(window.resolved_start);
            let recent = self.resolve_most_recent_date(Some(&resolved))?;
            if recent != resolved {
                let start = parse_date(&recent)?;
                #[cfg(feature = "tracing")]
                tracing::info!(from = %resolved, to = %recent, "resume point moved; fetching again");
                window = window.resumed_at(start);
                batch = fetcher.fetch(&window)?;
            }
        }

        if batch.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!(start = %window.resolved_start, "zero rows written: fetch returned no data");
            warnings.push("zero rows written: fetch returned no data".to_string());
            return Ok(SyncReport {
                window,
                fetched_rows: 0,
                outcome: SyncOutcome::Empty,
                warnings,
            });
        }

        let outcome = match self.spec.layout() {
            Layout::Vertical => {
                let report = self.write_vertical(&batch)?;
                warnings.extend(report.warnings.iter().cloned());
                SyncOutcome::Vertical(report)
            }
            Layout::Wide if self.cfg.current_view.is_some() => {
                let outcome =
                    self.reconcile_and_write_from(&batch, Some(window.resolved_start))?;
                warnings.extend(outcome.warnings.iter().cloned());
                warnings.extend(outcome.inserts.warnings.iter().cloned());
                SyncOutcome::Reconciled(Box::new(outcome))
            }
            Layout::Wide => {
                let report = self.write_wide(&batch)?;
                warnings.extend(report.warnings.iter().cloned());
                SyncOutcome::Wide(report)
            }
        };

        let mut report = SyncReport {
            window,
            fetched_rows: batch.len(),
            outcome,
            warnings,
        };
        if report.rows_written() == 0 && report.cells_updated() == 0 {
            #[cfg(feature = "tracing")]
            tracing::warn!(excluded = report.rows_excluded(), "zero rows written");
            report.warnings.push(format!(
                "zero rows written: {} fetched, {} excluded, {} failed",
                report.fetched_rows,
                report.rows_excluded(),
                report.failures()
            ));
        }
        #[cfg(feature = "tracing")]
        tracing::info!(
            fetched = report.fetched_rows,
            written = report.rows_written(),
            updated = report.cells_updated(),
            excluded = report.rows_excluded(),
            failed = report.failures(),
            "sync finished"
        );
        Ok(report)
    }
}
