//! In-memory `Store` for tests and demos.
//!
//! `MockStore` answers reads from scripted results, records every write, and
//! fails writes that match injected rules. `fixtures` holds deterministic
//! treasury and FX data.

use std::collections::HashMap;

use ratesync_core::{NamedParams, Row, SqlValue, Store, SyncError};

pub mod fixtures;

/// Instruction for how a read should behave.
#[derive(Debug, Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value.
    Return(T),
    /// Fail with the provided error.
    Fail(SyncError),
}

/// A call observed by the mock, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    /// `Store::query`.
    Query(String),
    /// `Store::execute`.
    Execute(String),
    /// `Store::execute_many`.
    ExecuteMany {
        /// Placeholder statement.
        sql: String,
        /// Parameter rows.
        rows: Vec<Row>,
    },
    /// `Store::update`.
    Update {
        /// UPDATE template.
        template: String,
        /// Bound parameters.
        params: NamedParams,
    },
    /// `Store::call_procedure` or `Store::execute_procedure`.
    Procedure {
        /// Procedure name.
        name: String,
        /// Arguments.
        args: Vec<SqlValue>,
    },
}

/// Scripted, recording store.
///
/// Queries are matched by substring against scripted rules (first match wins);
/// unmatched queries and procedures return no rows. Writes succeed unless the
/// statement contains an injected fragment or binds an injected value.
#[derive(Debug, Default)]
pub struct MockStore {
    query_rules: Vec<(String, MockBehavior<Vec<Row>>)>,
    procedure_rules: HashMap<String, MockBehavior<Vec<Row>>>,
    failing_sql: Vec<String>,
    failing_values: Vec<SqlValue>,
    log: Vec<Recorded>,
}

impl MockStore {
    /// Empty store: every read returns no rows, every write succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries containing `pattern` with `rows`.
    #[must_use]
    pub fn with_query(mut self, pattern: impl Into<String>, rows: Vec<Row>) -> Self {
        self.query_rules
            .push((pattern.into(), MockBehavior::Return(rows)));
        self
    }

    /// Fail queries containing `pattern` with `error`.
    #[must_use]
    pub fn with_query_failure(mut self, pattern: impl Into<String>, error: SyncError) -> Self {
        self.query_rules
            .push((pattern.into(), MockBehavior::Fail(error)));
        self
    }

    /// Answer calls of procedure `name` with `rows`.
    #[must_use]
    pub fn with_procedure(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.procedure_rules
            .insert(name.into(), MockBehavior::Return(rows));
        self
    }

    /// Fail calls of procedure `name` with `error`.
    #[must_use]
    pub fn with_procedure_failure(mut self, name: impl Into<String>, error: SyncError) -> Self {
        self.procedure_rules
            .insert(name.into(), MockBehavior::Fail(error));
        self
    }

    /// Fail any write whose statement text contains `fragment`.
    #[must_use]
    pub fn fail_sql_containing(mut self, fragment: impl Into<String>) -> Self {
        self.failing_sql.push(fragment.into());
        self
    }

    /// Fail any parameterized write that binds `value`.
    #[must_use]
    pub fn fail_binding(mut self, value: impl Into<SqlValue>) -> Self {
        self.failing_values.push(value.into());
        self
    }

    /// Every call observed so far.
    #[must_use]
    pub fn log(&self) -> &[Recorded] {
        &self.log
    }

    /// Forget observed calls.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Statements passed to `execute`, including failed ones.
    #[must_use]
    pub fn executed(&self) -> Vec<&str> {
        self.log
            .iter()
            .filter_map(|r| match r {
                Recorded::Execute(sql) => Some(sql.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Parameter batches passed to `execute_many`.
    #[must_use]
    pub fn batches(&self) -> Vec<(&str, &[Row])> {
        self.log
            .iter()
            .filter_map(|r| match r {
                Recorded::ExecuteMany { sql, rows } => Some((sql.as_str(), rows.as_slice())),
                _ => None,
            })
            .collect()
    }

    /// Templates and parameters passed to `update`.
    #[must_use]
    pub fn updates(&self) -> Vec<(&str, &NamedParams)> {
        self.log
            .iter()
            .filter_map(|r| match r {
                Recorded::Update { template, params } => Some((template.as_str(), params)),
                _ => None,
            })
            .collect()
    }

    /// Queries passed to `query`.
    #[must_use]
    pub fn queries(&self) -> Vec<&str> {
        self.log
            .iter()
            .filter_map(|r| match r {
                Recorded::Query(sql) => Some(sql.as_str()),
                _ => None,
            })
            .collect()
    }

    fn check_sql(&self, sql: &str) -> Result<(), SyncError> {
        match self.failing_sql.iter().find(|f| sql.contains(f.as_str())) {
            Some(fragment) => Err(SyncError::store(format!(
                "forced failure: statement contains {fragment}"
            ))),
            None => Ok(()),
        }
    }

    fn check_values<'a, I>(&self, values: I) -> Result<(), SyncError>
    where
        I: IntoIterator<Item = &'a SqlValue>,
    {
        for value in values {
            if self.failing_values.contains(value) {
                return Err(SyncError::store(format!("forced failure: binds {value}")));
            }
        }
        Ok(())
    }

    fn scripted(behavior: Option<&MockBehavior<Vec<Row>>>) -> Result<Vec<Row>, SyncError> {
        match behavior {
            Some(MockBehavior::Return(rows)) => Ok(rows.clone()),
            Some(MockBehavior::Fail(err)) => Err(err.clone()),
            None => Ok(Vec::new()),
        }
    }
}

impl Store for MockStore {
    fn name(&self) -> &'static str {
        "ratesync-mock"
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>, SyncError> {
        self.log.push(Recorded::Query(sql.to_string()));
        let rule = self
            .query_rules
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, b)| b);
        Self::scripted(rule)
    }

    fn execute(&mut self, sql: &str) -> Result<u64, SyncError> {
        self.log.push(Recorded::Execute(sql.to_string()));
        self.check_sql(sql)?;
        let tuples = sql.matches("), \n").count() + 1;
        Ok(u64::try_from(tuples).unwrap_or(u64::MAX))
    }

    fn execute_many(&mut self, sql: &str, rows: &[Row]) -> Result<u64, SyncError> {
        self.log.push(Recorded::ExecuteMany {
            sql: sql.to_string(),
            rows: rows.to_vec(),
        });
        self.check_sql(sql)?;
        self.check_values(rows.iter().flat_map(Row::values))?;
        Ok(u64::try_from(rows.len()).unwrap_or(u64::MAX))
    }

    fn update(&mut self, template: &str, params: &NamedParams) -> Result<u64, SyncError> {
        self.log.push(Recorded::Update {
            template: template.to_string(),
            params: params.clone(),
        });
        self.check_sql(template)?;
        self.check_values(params.values())?;
        Ok(1)
    }

    fn call_procedure(&mut self, name: &str, args: &[SqlValue]) -> Result<Vec<Row>, SyncError> {
        self.log.push(Recorded::Procedure {
            name: name.to_string(),
            args: args.to_vec(),
        });
        Self::scripted(self.procedure_rules.get(name))
    }
}
