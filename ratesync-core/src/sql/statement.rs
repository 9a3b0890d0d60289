//! Incremental SQL statement synthesis.
//!
//! A `Statement` is begun for one kind of operation, optionally given its
//! column list, then grown one fragment at a time. Multi-row INSERTs append
//! each value tuple followed by a row separator and finish by replacing the
//! dangling separator with the terminator.

use core::fmt;

use ratesync_types::KeyColumns;

use super::naming::validate_identifier;
use super::value::SqlValue;
use crate::SyncError;

/// Separator appended after each row tuple of a multi-row INSERT.
pub const ROW_SEPARATOR: &str = ", \n";
/// Trailing text left behind by the last row tuple.
pub const DANGLING_ROW: &str = "), \n";
/// Replacement that closes the last row tuple and terminates the statement.
pub const CLOSED_ROW: &str = ");";

/// Kind of statement being synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// `SELECT`.
    Select,
    /// `INSERT INTO ... VALUES`.
    Insert,
    /// `UPDATE ... SET ... WHERE`.
    Update,
    /// Stored procedure whose result set is consumed.
    StoredProcedureWithResult,
    /// Stored procedure executed for its side effects.
    StoredProcedureNoResult,
}

impl StatementKind {
    /// True if executing this kind of statement yields rows.
    #[must_use]
    pub const fn returns_rows(self) -> bool {
        matches!(self, Self::Select | Self::StoredProcedureWithResult)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::StoredProcedureWithResult => "procedure-with-result",
            Self::StoredProcedureNoResult => "procedure-no-result",
        })
    }
}

/// A statement under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    kind: StatementKind,
    table: String,
    key: KeyColumns,
    columns: Vec<String>,
    args: Vec<SqlValue>,
    template: Option<String>,
    text: String,
    begun: bool,
}

impl Statement {
    /// Start describing a statement of `kind` against `table`.
    ///
    /// For stored procedures `table` is the procedure name.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if the table name or any key column
    /// is empty or not a valid identifier.
    pub fn new(
        kind: StatementKind,
        table: impl Into<String>,
        key: KeyColumns,
    ) -> Result<Self, SyncError> {
        let table = table.into();
        if table.trim().is_empty() {
            return Err(SyncError::config(format!(
                "{kind} statement requires a table name"
            )));
        }
        validate_identifier(&table)?;
        if key.is_empty() {
            return Err(SyncError::config(format!(
                "{kind} statement on '{table}' requires key column metadata"
            )));
        }
        for name in key.names() {
            validate_identifier(name)?;
        }
        Ok(Self {
            kind,
            table,
            key,
            columns: Vec::new(),
            args: Vec::new(),
            template: None,
            text: String::new(),
            begun: false,
        })
    }

    /// `SELECT * FROM <table>;`
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` for an invalid table or key.
    pub fn select_all(table: &str, key: &KeyColumns) -> Result<Self, SyncError> {
        let mut stmt = Self::new(StatementKind::Select, table, key.clone())?;
        stmt.begin(false)?;
        Ok(stmt)
    }

    /// `SELECT MAX(<key>) AS <key> FROM <table>;`
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` for an invalid table or key.
    pub fn select_max(table: &str, key: &KeyColumns) -> Result<Self, SyncError> {
        let stmt = Self::new(StatementKind::Select, table, key.clone())?;
        let column = stmt.primary_key()?.to_string();
        Ok(Self {
            text: format!("SELECT MAX({column}) AS {column} FROM {};", stmt.table),
            begun: true,
            ..stmt
        })
    }

    /// `CALL <name>(<args>);` for a stored procedure.
    ///
    /// Procedures carry no key metadata.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if `name` is not a valid identifier.
    pub fn procedure(name: &str, args: Vec<SqlValue>, with_result: bool) -> Result<Self, SyncError> {
        validate_identifier(name)?;
        let kind = if with_result {
            StatementKind::StoredProcedureWithResult
        } else {
            StatementKind::StoredProcedureNoResult
        };
        let mut stmt = Self {
            kind,
            table: name.to_string(),
            key: KeyColumns::default(),
            columns: Vec::new(),
            args,
            template: None,
            text: String::new(),
            begun: false,
        };
        stmt.begin(false)?;
        Ok(stmt)
    }

    /// Attach the ordered value columns.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if a column name is not a valid identifier.
    pub fn with_columns<I, S>(mut self, columns: I) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        for column in &columns {
            validate_identifier(column)?;
        }
        self.columns = columns;
        Ok(self)
    }

    /// Attach literal procedure arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<SqlValue>) -> Self {
        self.args = args;
        self
    }

    /// Replace the generated UPDATE template with caller-supplied text.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Write the statement header.
    ///
    /// - `Insert`: `INSERT INTO <table> (` followed by the key columns and a
    ///   comma when `include_key` is set.
    /// - `Select`: `SELECT * FROM <table>;`
    /// - `Update`: the per-cell template
    ///   `UPDATE <table> SET %(field)s = %(result)s WHERE <key> = %(date)s;`
    ///   or the override supplied through `with_template`.
    /// - Procedures: `CALL <name>(<args>);`
    ///
    /// Calling `begin` again restarts the statement.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if the key metadata is unusable.
    pub fn begin(&mut self, include_key: bool) -> Result<(), SyncError> {
        self.text = match self.kind {
            StatementKind::Insert => {
                let mut text = format!("INSERT INTO {} (", self.table);
                if include_key {
                    text.push_str(&self.key.names().join(", "));
                    text.push_str(", ");
                }
                text
            }
            StatementKind::Select => format!("SELECT * FROM {};", self.table),
            StatementKind::Update => match &self.template {
                Some(template) => template.clone(),
                None => format!(
                    "UPDATE {} SET %(field)s = %(result)s WHERE {} = %(date)s;",
                    self.table,
                    self.primary_key()?
                ),
            },
            StatementKind::StoredProcedureWithResult | StatementKind::StoredProcedureNoResult => {
                let args: Vec<String> = self.args.iter().map(SqlValue::to_literal).collect();
                format!("CALL {}({});", self.table, args.join(", "))
            }
        };
        self.begun = true;
        Ok(())
    }

    /// Append the column list, skipping `excluding`, and close it with `) VALUES `.
    ///
    /// Returns the columns actually declared, in order.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if the statement is not a begun
    /// INSERT or no column remains after exclusion.
    pub fn declare_columns(&mut self, excluding: &[&str]) -> Result<Vec<String>, SyncError> {
        self.ensure_begun("declare columns")?;
        if self.kind != StatementKind::Insert {
            return Err(SyncError::config(format!(
                "columns can only be declared on an insert, not a {} statement",
                self.kind
            )));
        }
        let declared: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !excluding.contains(&c.as_str()))
            .cloned()
            .collect();
        if declared.is_empty() {
            return Err(SyncError::config(format!(
                "insert into '{}' declares no value columns",
                self.table
            )));
        }
        self.text.push_str(&declared.join(", "));
        self.text.push_str(") VALUES ");
        Ok(declared)
    }

    /// Append `fragment` followed by `separator`.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if `begin` has not been called.
    pub fn append_fragment(&mut self, fragment: &str, separator: &str) -> Result<(), SyncError> {
        self.ensure_begun("append a fragment")?;
        self.text.push_str(fragment);
        self.text.push_str(separator);
        Ok(())
    }

    /// Replace a trailing `trailing` with `replacement`.
    ///
    /// Returns false (leaving the text untouched) when the statement does not
    /// end with `trailing`.
    pub fn finalize(&mut self, trailing: &str, replacement: &str) -> bool {
        if trailing.is_empty() || !self.text.ends_with(trailing) {
            return false;
        }
        self.text.truncate(self.text.len() - trailing.len());
        self.text.push_str(replacement);
        true
    }

    /// Close a multi-row INSERT whose last tuple was appended with `ROW_SEPARATOR`.
    pub fn finalize_rows(&mut self) -> bool {
        self.finalize(DANGLING_ROW, CLOSED_ROW)
    }

    /// Per-cell UPDATE text for `field`.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if this is not a begun UPDATE or
    /// `field` is not a valid identifier.
    pub fn template_for(&self, field: &str) -> Result<String, SyncError> {
        self.ensure_begun("render an update template")?;
        if self.kind != StatementKind::Update {
            return Err(SyncError::config(format!(
                "only update statements have templates, not {}",
                self.kind
            )));
        }
        validate_identifier(field)?;
        Ok(self.text.replace("%(field)s", field))
    }

    /// Kind of statement.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Target table (or procedure name).
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Key column metadata.
    #[must_use]
    pub const fn key(&self) -> &KeyColumns {
        &self.key
    }

    /// Declared value columns.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Literal procedure arguments.
    #[must_use]
    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    /// Statement text so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the statement and return its text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// True if executing this statement yields rows.
    #[must_use]
    pub const fn returns_rows(&self) -> bool {
        self.kind.returns_rows()
    }

    fn primary_key(&self) -> Result<&str, SyncError> {
        self.key
            .primary()
            .ok_or_else(|| SyncError::config(format!("'{}' has no key column", self.table)))
    }

    fn ensure_begun(&self, action: &str) -> Result<(), SyncError> {
        if self.begun {
            Ok(())
        } else {
            Err(SyncError::config(format!(
                "cannot {action} before the {} statement on '{}' is begun",
                self.kind, self.table
            )))
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
