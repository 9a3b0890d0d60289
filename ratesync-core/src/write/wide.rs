use chrono::NaiveDate;
use ratesync_types::{Operation, WriteReport};

use crate::SyncError;
use crate::sql::statement::{ROW_SEPARATOR, Statement, StatementKind};
use crate::sql::value::SqlValue;
use crate::table::{ColumnMapping, TableSpec};
use crate::timeseries::exclusion::evaluate_row;
use crate::timeseries::batch::TimeSeriesBatch;
use crate::timeseries::period::format_date;

/// One admitted row of a wide INSERT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideRow {
    /// Row date.
    pub date: NaiveDate,
    /// Rendered value tuple, e.g. `('2020-06-10', 0.12, NULL)`.
    pub fragment: String,
}

/// A multi-row literal INSERT ready to execute.
#[derive(Debug, Clone)]
pub struct WideInsert {
    header: Statement,
    statement: Option<Statement>,
    rows: Vec<WideRow>,
    columns: Vec<String>,
    /// Report pre-filled with exclusions and warnings.
    pub report: WriteReport,
}

impl WideInsert {
    /// Complete statement, or `None` when no row survived.
    #[must_use]
    pub const fn statement(&self) -> Option<&Statement> {
        self.statement.as_ref()
    }

    /// Admitted rows in date order.
    #[must_use]
    pub fn rows(&self) -> &[WideRow] {
        &self.rows
    }

    /// Declared value columns.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Standalone INSERT for one admitted row.
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if the header was never begun.
    pub fn single_row(&self, row: &WideRow) -> Result<String, SyncError> {
        let mut stmt = self.header.clone();
        stmt.append_fragment(&row.fragment, ROW_SEPARATOR)?;
        stmt.finalize_rows();
        Ok(stmt.into_text())
    }
}

/// Render `batch` into one literal multi-row INSERT for a wide table.
///
/// Only declared columns whose source series is present in `batch` are
/// written, under their target names. Rows rejected by the table's exclusion
/// policy are recorded in the report. Extra key columns of a composite key
/// must be the source-tag column; they receive the tag.
///
/// # Errors
/// Returns `SyncError::Configuration` for vertical tables, composite keys
/// without a value source, or invalid identifiers.
pub fn build_wide_insert(
    spec: &TableSpec,
    batch: &TimeSeriesBatch,
) -> Result<WideInsert, SyncError> {
    let mappings = spec.wide_mappings()?;
    let mut report = WriteReport::new(Operation::WriteWide);

    let present: Vec<(usize, &ColumnMapping)> = mappings
        .iter()
        .filter_map(|m| batch.column_index(&m.source).map(|i| (i, m)))
        .collect();

    let key_tail = key_tail_literals(spec)?;
    let tag = spec
        .source()
        .filter(|s| !spec.key().contains(&s.column))
        .map(|s| (s.column.clone(), SqlValue::Text(s.tag.clone()).to_literal()));

    let mut columns: Vec<String> = present.iter().map(|(_, m)| m.target.clone()).collect();
    if let Some((column, _)) = &tag {
        columns.push(column.clone());
    }

    let mut header = Statement::new(StatementKind::Insert, spec.table(), spec.key().clone())?
        .with_columns(columns.clone())?;
    header.begin(true)?;

    if present.is_empty() {
        let declared: Vec<&str> = mappings.iter().map(|m| m.source.as_str()).collect();
        report.warnings.push(format!(
            "none of the declared series [{}] is present in the fetched batch",
            declared.join(", ")
        ));
        return Ok(WideInsert {
            header,
            statement: None,
            rows: Vec::new(),
            columns,
            report,
        });
    }
    header.declare_columns(&[])?;

    let mut statement = header.clone();
    let mut rows = Vec::new();
    for (date, values) in batch.iter() {
        let selected: Vec<_> = present.iter().map(|(i, _)| values[*i]).collect();
        if let Some(reason) = evaluate_row(&selected, spec.exclusion()) {
            report.exclude(format_date(date), reason);
            continue;
        }
        let mut literals = vec![SqlValue::Date(date).to_literal()];
        literals.extend(key_tail.iter().cloned());
        literals.extend(selected.into_iter().map(|v| SqlValue::from(v).to_literal()));
        if let Some((_, literal)) = &tag {
            literals.push(literal.clone());
        }
        let fragment = format!("({})", literals.join(", "));
        statement.append_fragment(&fragment, ROW_SEPARATOR)?;
        rows.push(WideRow { date, fragment });
    }

    let statement = if rows.is_empty() {
        report
            .warnings
            .push("no fetched row survived exclusion; nothing to insert".to_string());
        None
    } else {
        statement.finalize_rows();
        Some(statement)
    };

    Ok(WideInsert {
        header,
        statement,
        rows,
        columns,
        report,
    })
}

fn key_tail_literals(spec: &TableSpec) -> Result<Vec<String>, SyncError> {
    spec.key()
        .names()
        .into_iter()
        .skip(1)
        .map(|name| match spec.source() {
            Some(source) if source.column == name => {
                Ok(SqlValue::Text(source.tag.clone()).to_literal())
            }
            _ => Err(SyncError::config(format!(
                "composite key column '{name}' of '{}' has no value source",
                spec.table()
            ))),
        })
        .collect()
}
