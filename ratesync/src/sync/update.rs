use std::collections::BTreeMap;

use ratesync_core::write::{plan_gap_fill, record_update_template};
use ratesync_core::{
    CurrentView, MergedView, NaiveDate, NamedParams, Operation, SqlValue, Store, SyncError, UpdateReport,
    format_date,
};

use crate::Synchronizer;
use crate::core::view_name;

impl<S: Store> Synchronizer<S> {
    /// Fill persisted gaps from the merged old partition.
    ///
    /// One UPDATE is issued per cell whose fetched value is present and whose
    /// persisted value is absent. Each UPDATE stands alone: a failure is
    /// recorded and the next cell is still attempted.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ratesync::sync::fill_gaps",
            skip(self, view),
            fields(table = %self.spec.table(), rows = view.len()),
        )
    )]
    pub(crate) fn fill_gaps(&mut self, view: &MergedView<'_>) -> Result<UpdateReport, SyncError> {
        let plan = plan_gap_fill(&self.spec, view)?;
        let mut report = UpdateReport::new(Operation::GapFill);
        report.rows_considered = plan.rows_considered;
        report.skipped = plan.skipped;

        for cell in &plan.cells {
            let template = plan.statement.template_for(&cell.target)?;
            report.attempted += 1;
            match self.store.update(&template, &cell.params()) {
                Ok(_) => report.succeeded += 1,
                Err(e) if e.is_structural() => return Err(e),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %e, cell = %cell.unit(), "gap-fill update failed");
                    report.failures.push(e.into_write_failure(cell.unit()));
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            considered = report.rows_considered,
            attempted = report.attempted,
            succeeded = report.succeeded,
            skipped = report.skipped,
            "gap-fill finished"
        );
        Ok(report)
    }

    /// Account for an old partition that has no persisted snapshot to merge with.
    ///
    /// Nothing is written. Every declared column pair is counted as skipped
    /// and a warning names the view when there were rows to fill.
    pub(crate) fn skip_gap_fill(
        &self,
        view: &MergedView<'_>,
        current: &CurrentView,
        warnings: &mut Vec<String>,
    ) -> Result<UpdateReport, SyncError> {
        let mut report = UpdateReport::new(Operation::GapFill);
        report.rows_considered = view.len();
        report.skipped = self.spec.wide_mappings()?.len();
        if !view.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                view = %view_name(current),
                rows = view.len(),
                "current view carries no snapshot; gap-fill skipped"
            );
            warnings.push(format!(
                "current view '{}' carries no '{}' column; gap-fill skipped for {} rows",
                view_name(current),
                self.spec.date_column()?,
                view.len()
            ));
        }
        Ok(report)
    }

    /// Update persisted rows from named parameter records keyed by date.
    ///
    /// Each record's names become the SET columns (unless an update template
    /// is configured) and the date is bound as `index`. Records are updated
    /// independently; failures are collected in the report.
    ///
    /// The aggregate is `-1` when `records` is empty.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if a column name is invalid or the
    /// table key is unusable.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ratesync::sync::update_records",
            skip(self, records),
            fields(table = %self.spec.table(), records = records.len()),
        )
    )]
    pub fn update_records(
        &mut self,
        records: &BTreeMap<NaiveDate, NamedParams>,
    ) -> Result<UpdateReport, SyncError> {
        let mut report = UpdateReport::new(Operation::UpdateRecords);
        report.rows_considered = records.len();

        for (date, record) in records {
            if record.is_empty() {
                report.skipped += 1;
                continue;
            }
            let columns: Vec<&str> = record.keys().map(String::as_str).collect();
            let statement =
                record_update_template(&self.spec, &columns, self.cfg.update_template.as_deref())?;
            let mut params = record.clone();
            params.insert("index".to_string(), SqlValue::Date(*date));

            report.attempted += 1;
            match self.store.update(statement.text(), &params) {
                Ok(_) => report.succeeded += 1,
                Err(e) if e.is_structural() => return Err(e),
                Err(e) => {
                    let unit = format!("row {}", format_date(*date));
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %e, row = %unit, "record update failed");
                    report.failures.push(e.into_write_failure(unit));
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            aggregate = report.aggregate(),
            "record updates finished"
        );
        Ok(report)
    }
}
