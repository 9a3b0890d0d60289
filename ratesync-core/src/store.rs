use crate::SyncError;
use crate::sql::value::{NamedParams, Row, SqlValue};

/// Database adapter executing the statements synthesized by ratesync.
///
/// Implementations own connection handling and transaction policy. Every
/// method is synchronous; a call returning `Err` is treated as a failure of
/// that one unit of work unless the error is structural.
pub trait Store {
    /// A stable identifier used in logs (e.g., "mysql", "mock").
    fn name(&self) -> &'static str;

    /// Run a row-returning statement.
    ///
    /// # Errors
    /// Returns an error if the statement cannot be executed.
    fn query(&mut self, sql: &str) -> Result<Vec<Row>, SyncError>;

    /// Execute a statement and return the number of affected rows.
    ///
    /// # Errors
    /// Returns an error if the statement cannot be executed.
    fn execute(&mut self, sql: &str) -> Result<u64, SyncError>;

    /// Execute a placeholder statement once per parameter row.
    ///
    /// `%s` placeholders bind positional rows; `%(name)s` placeholders bind named rows.
    ///
    /// # Errors
    /// Returns an error if the batch cannot be executed.
    fn execute_many(&mut self, sql: &str, rows: &[Row]) -> Result<u64, SyncError>;

    /// Execute an UPDATE template with named parameters.
    ///
    /// Any `Ok` value, zero included, counts as success.
    ///
    /// # Errors
    /// Returns an error if the update cannot be executed.
    fn update(&mut self, template: &str, params: &NamedParams) -> Result<u64, SyncError>;

    /// Call a stored procedure and return its result set.
    ///
    /// # Errors
    /// Returns an error if the call fails.
    fn call_procedure(&mut self, name: &str, args: &[SqlValue]) -> Result<Vec<Row>, SyncError>;

    /// Call a stored procedure for its side effects.
    ///
    /// Default: delegates to `call_procedure` and discards the result set.
    ///
    /// # Errors
    /// Returns an error if the call fails.
    fn execute_procedure(&mut self, name: &str, args: &[SqlValue]) -> Result<(), SyncError> {
        self.call_procedure(name, args).map(|_| ())
    }
}

impl<S: Store + ?Sized> Store for &mut S {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>, SyncError> {
        (**self).query(sql)
    }

    fn execute(&mut self, sql: &str) -> Result<u64, SyncError> {
        (**self).execute(sql)
    }

    fn execute_many(&mut self, sql: &str, rows: &[Row]) -> Result<u64, SyncError> {
        (**self).execute_many(sql, rows)
    }

    fn update(&mut self, template: &str, params: &NamedParams) -> Result<u64, SyncError> {
        (**self).update(template, params)
    }

    fn call_procedure(&mut self, name: &str, args: &[SqlValue]) -> Result<Vec<Row>, SyncError> {
        (**self).call_procedure(name, args)
    }

    fn execute_procedure(&mut self, name: &str, args: &[SqlValue]) -> Result<(), SyncError> {
        (**self).execute_procedure(name, args)
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>, SyncError> {
        (**self).query(sql)
    }

    fn execute(&mut self, sql: &str) -> Result<u64, SyncError> {
        (**self).execute(sql)
    }

    fn execute_many(&mut self, sql: &str, rows: &[Row]) -> Result<u64, SyncError> {
        (**self).execute_many(sql, rows)
    }

    fn update(&mut self, template: &str, params: &NamedParams) -> Result<u64, SyncError> {
        (**self).update(template, params)
    }

    fn call_procedure(&mut self, name: &str, args: &[SqlValue]) -> Result<Vec<Row>, SyncError> {
        (**self).call_procedure(name, args)
    }

    fn execute_procedure(&mut self, name: &str, args: &[SqlValue]) -> Result<(), SyncError> {
        (**self).execute_procedure(name, args)
    }
}

/// Store wrapper that records writes instead of executing them when enabled.
///
/// Reads (`query`, `call_procedure`) always reach the wrapped store so that
/// windows and snapshots resolve against real data. Writes are logged and
/// reported as if every statement affected the expected number of rows.
/// When disabled the wrapper is transparent.
#[derive(Debug)]
pub struct DryRun<S> {
    inner: S,
    enabled: bool,
    recorded: Vec<String>,
}

impl<S: Store> DryRun<S> {
    /// Wrap `inner`; writes are suppressed when `enabled` is true.
    pub const fn new(inner: S, enabled: bool) -> Self {
        Self {
            inner,
            enabled,
            recorded: Vec::new(),
        }
    }

    /// True if writes are being suppressed.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Statements recorded instead of executed, in order.
    pub fn recorded(&self) -> &[String] {
        &self.recorded
    }

    /// Borrow the wrapped store.
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Mutably borrow the wrapped store.
    pub const fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwrap into the wrapped store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn record(&mut self, entry: String) {
        #[cfg(feature = "tracing")]
        tracing::info!(target: "ratesync::core::store", statement = %entry, "dry run: statement not executed");
        self.recorded.push(entry);
    }
}

impl<S: Store> Store for DryRun<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>, SyncError> {
        self.inner.query(sql)
    }

    fn execute(&mut self, sql: &str) -> Result<u64, SyncError> {
        if !self.enabled {
            return self.inner.execute(sql);
        }
        self.record(sql.to_string());
        Ok(0)
    }

    fn execute_many(&mut self, sql: &str, rows: &[Row]) -> Result<u64, SyncError> {
        if !self.enabled {
            return self.inner.execute_many(sql, rows);
        }
        self.record(format!("{sql} [{} parameter rows]", rows.len()));
        Ok(u64::try_from(rows.len()).unwrap_or(u64::MAX))
    }

    fn update(&mut self, template: &str, params: &NamedParams) -> Result<u64, SyncError> {
        if !self.enabled {
            return self.inner.update(template, params);
        }
        let rendered: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        self.record(format!("{template} [{}]", rendered.join(", ")));
        Ok(0)
    }

    fn call_procedure(&mut self, name: &str, args: &[SqlValue]) -> Result<Vec<Row>, SyncError> {
        self.inner.call_procedure(name, args)
    }

    fn execute_procedure(&mut self, name: &str, args: &[SqlValue]) -> Result<(), SyncError> {
        if !self.enabled {
            return self.inner.execute_procedure(name, args);
        }
        let rendered: Vec<String> = args.iter().map(SqlValue::to_literal).collect();
        self.record(format!("CALL {name}({});", rendered.join(", ")));
        Ok(())
    }
}
