use ratesync_core::write::{build_record_insert, build_vertical_insert, build_wide_insert};
use ratesync_core::{
    Operation, SqlValue, Store, SyncError, TimeSeriesBatch, WriteReport, format_date,
};

use crate::Synchronizer;

impl<S: Store> Synchronizer<S> {
    /// Insert `batch` into a wide table with one literal multi-row INSERT.
    ///
    /// Declared series missing from the batch are skipped; rows rejected by the
    /// exclusion policy are recorded in the report. If the bulk statement fails
    /// and row fallback is enabled, each row is retried on its own so one bad
    /// row does not lose the rest.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` for vertical tables or invalid key
    /// metadata. Store failures are reported, not returned.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ratesync::sync::write_wide",
            skip(self, batch),
            fields(table = %self.spec.table(), rows = batch.len()),
        )
    )]
    pub fn write_wide(&mut self, batch: &TimeSeriesBatch) -> Result<WriteReport, SyncError> {
        let insert = build_wide_insert(&self.spec, batch)?;
        let mut report = insert.report.clone();
        #[cfg(feature = "tracing")]
        for excluded in &report.exclusions {
            tracing::debug!(row = %excluded.key, reason = ?excluded.reason, "row excluded");
        }
        let Some(statement) = insert.statement() else {
            #[cfg(feature = "tracing")]
            tracing::warn!(excluded = report.rows_excluded, "zero rows written");
            return Ok(report);
        };

        let rows = insert.rows();
        match self.store.execute(statement.text()) {
            Ok(_) => report.rows_written = rows.len(),
            Err(e) if e.is_structural() => return Err(e),
            Err(e) if self.cfg.row_fallback && rows.len() > 1 => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, rows = rows.len(), "bulk insert failed; retrying row by row");
                report
                    .warnings
                    .push(format!("bulk insert failed ({e}); retried row by row"));
                for row in rows {
                    let sql = insert.single_row(row)?;
                    match self.store.execute(&sql) {
                        Ok(_) => report.rows_written += 1,
                        Err(e) if e.is_structural() => return Err(e),
                        Err(e) => {
                            let unit = format!("row {}", format_date(row.date));
                            report.fail(1, e.into_write_failure(unit));
                        }
                    }
                }
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, rows = rows.len(), "bulk insert failed");
                let unit = format!("bulk insert into {}", self.spec.table());
                report.fail(rows.len(), e.into_write_failure(unit));
            }
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            written = report.rows_written,
            excluded = report.rows_excluded,
            failed = report.rows_failed,
            "wide insert finished"
        );
        Ok(report)
    }

    /// Insert `batch` into a vertical table as parameterized rows.
    ///
    /// Each `(date, series)` observation with a value becomes one parameter
    /// row; absent observations are recorded as excluded. Rows are sent in
    /// batches of the configured size and a failing batch does not stop the
    /// batches after it.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` for wide tables or when the series
    /// and value columns cannot be identified.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ratesync::sync::write_vertical",
            skip(self, batch),
            fields(table = %self.spec.table(), rows = batch.len()),
        )
    )]
    pub fn write_vertical(&mut self, batch: &TimeSeriesBatch) -> Result<WriteReport, SyncError> {
        let insert = build_vertical_insert(&self.spec, batch)?;
        let mut report = insert.report.clone();
        if insert.rows().is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!(excluded = report.rows_excluded, "zero rows written");
            return Ok(report);
        }

        for (unit, rows) in insert.batches(self.cfg.batch_size) {
            match self.store.execute_many(insert.sql(), rows) {
                Ok(_) => report.rows_written += rows.len(),
                Err(e) if e.is_structural() => return Err(e),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %e, batch = %unit, "parameter batch failed");
                    report.fail(rows.len(), e.into_write_failure(unit));
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            written = report.rows_written,
            excluded = report.rows_excluded,
            failed = report.rows_failed,
            keyed = insert.is_keyed(),
            "vertical insert finished"
        );
        Ok(report)
    }

    /// Insert one record given as `(column, value)` pairs.
    ///
    /// The record must carry every key column.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if a key column is missing or a
    /// column name is invalid. A store failure is reported, not returned.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ratesync::sync::write_record",
            skip(self, record),
            fields(table = %self.spec.table(), columns = record.len()),
        )
    )]
    pub fn write_record(
        &mut self,
        record: &[(String, SqlValue)],
    ) -> Result<WriteReport, SyncError> {
        let statement = build_record_insert(&self.spec, record)?;
        let mut report = WriteReport::new(Operation::WriteRecord);
        match self.store.execute(statement.text()) {
            Ok(_) => report.rows_written = 1,
            Err(e) if e.is_structural() => return Err(e),
            Err(e) => {
                let key = self.spec.date_column()?;
                let date = record
                    .iter()
                    .find(|(c, _)| c == key)
                    .and_then(|(_, v)| v.as_date());
                let unit = match date {
                    Some(date) => format!("record {}", format_date(date)),
                    None => "record".to_string(),
                };
                report.fail(1, e.into_write_failure(unit));
            }
        }
        Ok(report)
    }
}
