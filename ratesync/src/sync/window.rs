use ratesync_core::sql::access::last_field;
use ratesync_core::{
    CurrentView, Periodicity, Position, ResumeWindow, Statement, Store, SyncError,
    advance_extent, extract_date, format_date, parse_date,
};

use crate::Synchronizer;
use crate::core::view_name;

impl<S: Store> Synchronizer<S> {
    /// Resolve the date a fetch should start from.
    ///
    /// A start date after today is a placeholder for "resume": the target's
    /// maximum persisted key date is queried and the fetch starts the day after
    /// it. Any other start date is used unchanged.
    ///
    /// # Errors
    /// Returns `SyncError::Data` if `requested` (or the configured end date) is
    /// not a date, or a placeholder is given and the table has no persisted
    /// rows. Store errors from the extent query are returned as-is.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ratesync::sync::resolve_start_date",
            skip(self),
            fields(table = %self.spec.table()),
        )
    )]
    pub fn resolve_start_date(&mut self, requested: &str) -> Result<ResumeWindow, SyncError> {
        let requested_start = parse_date(requested)?;
        let end = self.cfg.end_date.as_deref().map(parse_date).transpose()?;
        let window = ResumeWindow::new(requested_start, end);
        if requested_start <= self.today() {
            return Ok(window);
        }

        let stmt = Statement::select_max(self.spec.table(), self.spec.key())?;
        let rows = self.store.query(stmt.text())?;
        let key = self.spec.date_column()?.to_string();
        let extent = extract_date(&rows, &Position::Name(key)).map_err(|_| {
            SyncError::data(format!(
                "cannot resume '{}': no persisted rows",
                self.spec.table()
            ))
        })?;
        let resumed = extent
            .succ_opt()
            .ok_or_else(|| SyncError::data(format!("cannot resume after {extent}")))?;

        #[cfg(feature = "tracing")]
        tracing::info!(requested = %requested_start, %extent, %resumed, "placeholder start resolved");
        Ok(window.resumed_at(resumed))
    }

    /// Resolve where an append run should resume, honoring the source's periodicity.
    ///
    /// The current view's extent `E` is compared with `candidate` `C`:
    /// - no candidate: `E` itself;
    /// - `E >= C`: `E` advanced by one period (daily unless a procedure view
    ///   reports a periodicity in the last field of its first row);
    /// - otherwise `C` unchanged.
    ///
    /// An empty view result with a candidate yields the candidate.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if there is no current view and no
    /// candidate, and `SyncError::Data` for an empty view without a candidate
    /// or a malformed extent.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ratesync::sync::resolve_most_recent_date",
            skip(self),
            fields(table = %self.spec.table()),
        )
    )]
    pub fn resolve_most_recent_date(
        &mut self,
        candidate: Option<&str>,
    ) -> Result<String, SyncError> {
        let Some(view) = self.cfg.current_view.clone() else {
            return candidate.map(str::to_string).ok_or_else(|| {
                SyncError::config("no current view configured and no candidate date given")
            });
        };

        let rows = self.read_view(&view)?;
        if rows.is_empty() {
            return match candidate {
                Some(c) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(candidate = c, "current view returned no rows; keeping candidate");
                    Ok(c.to_string())
                }
                None => Err(SyncError::data(format!(
                    "current view '{}' returned no rows",
                    view_name(&view)
                ))),
            };
        }

        let extent = self.view_extent(&view, &rows)?;
        let Some(candidate) = candidate else {
            return Ok(format_date(extent));
        };
        if extent < parse_date(candidate)? {
            return Ok(candidate.to_string());
        }
        let periodicity = Self::reported_periodicity(&view, &rows);
        Ok(format_date(advance_extent(extent, periodicity)?))
    }

    fn reported_periodicity(view: &CurrentView, rows: &[ratesync_core::Row]) -> Periodicity {
        if !view.is_procedure() {
            return Periodicity::Daily;
        }
        let label = last_field(rows).ok();
        match label.as_ref().and_then(|v| v.as_text()).and_then(Periodicity::from_label) {
            Some(p) => p,
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(label = ?label, "unrecognized periodicity; assuming daily");
                Periodicity::Daily
            }
        }
    }
}
