use chrono::{NaiveDate, Utc};
use ratesync_core::sql::access::Position;
use ratesync_core::sql::naming::table_from_query;
use ratesync_core::{
    CurrentView, DryRun, ExclusionPolicy, Row, SqlValue, Statement, Store, SyncConfig, SyncError,
    TableSpec, extract_date, parse_date,
};

/// Synchronizes one target table with fetched time-series data.
pub struct Synchronizer<S: Store> {
    pub(crate) store: DryRun<S>,
    pub(crate) cfg: SyncConfig,
    pub(crate) spec: TableSpec,
    pub(crate) today: Option<NaiveDate>,
}

/// Builder for constructing a `Synchronizer` around a store.
pub struct SynchronizerBuilder<S: Store> {
    store: S,
    cfg: SyncConfig,
    today: Option<NaiveDate>,
}

impl<S: Store> SynchronizerBuilder<S> {
    /// Start from default settings; a configuration must still name the table,
    /// key and columns before `build` succeeds.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            cfg: SyncConfig::default(),
            today: None,
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: SyncConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Query describing the persisted extent and snapshot.
    #[must_use]
    pub fn current_view(mut self, view: CurrentView) -> Self {
        self.cfg.current_view = Some(view);
        self
    }

    /// Requested start date (`YYYY-MM-DD`); a future date means "resume".
    #[must_use]
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.cfg.start_date = Some(date.into());
        self
    }

    /// Inclusive end date (`YYYY-MM-DD`).
    #[must_use]
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.cfg.end_date = Some(date.into());
        self
    }

    /// Advance the start past the persisted extent before fetching.
    #[must_use]
    pub const fn append(mut self, yes: bool) -> Self {
        self.cfg.append = yes;
        self
    }

    /// Record writes instead of executing them.
    #[must_use]
    pub const fn dry_run(mut self, yes: bool) -> Self {
        self.cfg.dry_run = yes;
        self
    }

    /// Sparse-row and placeholder-row exclusion policy.
    #[must_use]
    pub const fn exclusion(mut self, policy: ExclusionPolicy) -> Self {
        self.cfg.exclusion = policy;
        self
    }

    /// Maximum parameter rows per vertical batch.
    #[must_use]
    pub const fn batch_size(mut self, size: usize) -> Self {
        self.cfg.batch_size = size;
        self
    }

    /// Retry a failed bulk wide INSERT one row at a time.
    #[must_use]
    pub const fn row_fallback(mut self, yes: bool) -> Self {
        self.cfg.row_fallback = yes;
        self
    }

    /// Timezone deciding what "today" is.
    #[must_use]
    pub const fn timezone(mut self, tz: chrono_tz::Tz) -> Self {
        self.cfg.timezone = tz;
        self
    }

    /// Pin "today" instead of reading the clock.
    #[must_use]
    pub const fn today(mut self, date: NaiveDate) -> Self {
        self.today = Some(date);
        self
    }

    /// Build the `Synchronizer`.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if the table spec is invalid or a
    /// configured date cannot be parsed.
    pub fn build(self) -> Result<Synchronizer<S>, SyncError> {
        let spec = TableSpec::from_config(&self.cfg)?;
        for (name, value) in [("start_date", &self.cfg.start_date), ("end_date", &self.cfg.end_date)] {
            if let Some(text) = value {
                parse_date(text).map_err(|e| SyncError::config(format!("{name}: {e}")))?;
            }
        }
        Ok(Synchronizer {
            store: DryRun::new(self.store, self.cfg.dry_run),
            cfg: self.cfg,
            spec,
            today: self.today,
        })
    }
}

impl<S: Store> Synchronizer<S> {
    /// Start building a `Synchronizer` around `store`.
    #[must_use]
    pub fn builder(store: S) -> SynchronizerBuilder<S> {
        SynchronizerBuilder::new(store)
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.cfg
    }

    /// Validated target table.
    #[must_use]
    pub const fn table(&self) -> &TableSpec {
        &self.spec
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        self.store.inner()
    }

    /// Mutably borrow the underlying store.
    pub const fn store_mut(&mut self) -> &mut S {
        self.store.inner_mut()
    }

    /// Unwrap into the underlying store.
    pub fn into_store(self) -> S {
        self.store.into_inner()
    }

    /// Statements recorded instead of executed in dry-run mode.
    #[must_use]
    pub fn dry_run_log(&self) -> &[String] {
        self.store.recorded()
    }

    /// Today's date in the configured timezone, or the pinned date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| Utc::now().with_timezone(&self.cfg.timezone).date_naive())
    }

    /// Run the current view and return its rows.
    pub(crate) fn read_view(&mut self, view: &CurrentView) -> Result<Vec<Row>, SyncError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(view = %view_name(view), "reading current view");
        match view {
            CurrentView::Table { name, .. } => {
                let stmt = Statement::select_all(name, self.spec.key())?;
                self.store.query(stmt.text())
            }
            CurrentView::Query { query, .. } => self.store.query(query),
            CurrentView::Procedure { name, args, .. } => {
                let args: Vec<SqlValue> = args.iter().map(|a| SqlValue::Text(a.clone())).collect();
                let stmt = Statement::procedure(name, args, true)?;
                self.store.call_procedure(stmt.table(), stmt.args())
            }
        }
    }

    /// Persisted extent described by a view result.
    ///
    /// With a configured location the first row is read there; otherwise the
    /// latest date in the key column across all rows is used.
    pub(crate) fn view_extent(
        &self,
        view: &CurrentView,
        rows: &[Row],
    ) -> Result<NaiveDate, SyncError> {
        if let Some(locator) = view.location() {
            return extract_date(rows, &Position::from(locator));
        }
        let key = self.spec.date_column()?;
        if rows.first().is_some_and(|r| !r.is_named()) {
            return extract_date(rows, &Position::Index(0));
        }
        rows.iter()
            .filter_map(|r| r.get(key).and_then(SqlValue::as_date))
            .max()
            .ok_or_else(|| {
                SyncError::data(format!(
                    "current view '{}' holds no date in '{key}'",
                    view_name(view)
                ))
            })
    }
}

/// Name of the relation or procedure behind a view, for messages.
pub(crate) fn view_name(view: &CurrentView) -> String {
    match view {
        CurrentView::Table { name, .. } | CurrentView::Procedure { name, .. } => name.clone(),
        CurrentView::Query { query, .. } => {
            table_from_query(query).unwrap_or_else(|| "query".to_string())
        }
    }
}
