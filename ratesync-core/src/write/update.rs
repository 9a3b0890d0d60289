use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::SyncError;
use crate::sql::naming::validate_identifier;
use crate::sql::statement::{Statement, StatementKind};
use crate::sql::value::{NamedParams, SqlValue};
use crate::table::TableSpec;
use crate::timeseries::merge::MergedView;
use crate::timeseries::period::format_date;

/// One persisted cell to fill from fetched data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapFillCell {
    /// Row date.
    pub date: NaiveDate,
    /// Fetched series supplying the value.
    pub source: String,
    /// Table column receiving it.
    pub target: String,
    /// Value to write.
    pub value: Decimal,
}

impl GapFillCell {
    /// Parameters for the per-cell UPDATE template.
    #[must_use]
    pub fn params(&self) -> NamedParams {
        NamedParams::from([
            ("result".to_string(), SqlValue::Decimal(self.value)),
            ("date".to_string(), SqlValue::Date(self.date)),
        ])
    }

    /// Label used in failures, e.g. `cell DGS1@2020-06-10`.
    #[must_use]
    pub fn unit(&self) -> String {
        format!("cell {}@{}", self.target, format_date(self.date))
    }
}

/// Gap-fill work for the old partition of a reconcile.
#[derive(Debug, Clone)]
pub struct GapFillPlan {
    /// Per-cell UPDATE template; render with `Statement::template_for`.
    pub statement: Statement,
    /// Cells whose fetched value is present and persisted value absent.
    pub cells: Vec<GapFillCell>,
    /// Declared pairs skipped because the fetched or persisted side is unknown.
    pub skipped: usize,
    /// Fetched rows inspected.
    pub rows_considered: usize,
}

/// Find every cell where fetched data can fill a persisted gap.
///
/// A cell qualifies when the fetched value is present and the persisted value
/// is absent. Persisted values are never overwritten. Declared pairs whose
/// source is missing from the batch, or whose target is unknown to a
/// non-empty snapshot, are skipped.
///
/// # Errors
/// Returns `SyncError::Configuration` for vertical tables or unusable key metadata.
pub fn plan_gap_fill(spec: &TableSpec, view: &MergedView<'_>) -> Result<GapFillPlan, SyncError> {
    let mappings = spec.wide_mappings()?;
    let mut statement = Statement::new(StatementKind::Update, spec.table(), spec.key().clone())?;
    statement.begin(false)?;

    let usable: Vec<_> = mappings
        .iter()
        .filter(|m| view.fetched().has_column(&m.source) && view.knows_target(&m.target))
        .collect();
    let skipped = mappings.len() - usable.len();

    let mut cells = Vec::new();
    for row in view.rows() {
        for m in &usable {
            if let Some(value) = row.fetched(&m.source)
                && row.persisted_is_absent(&m.target)
            {
                cells.push(GapFillCell {
                    date: row.date(),
                    source: m.source.clone(),
                    target: m.target.clone(),
                    value,
                });
            }
        }
    }

    Ok(GapFillPlan {
        statement,
        cells,
        skipped,
        rows_considered: view.len(),
    })
}

/// UPDATE template for a record keyed by date.
///
/// With `override_template` the caller's text is used verbatim. Otherwise the
/// template sets every name in `columns` from a same-named parameter and
/// matches the key column against `%(index)s`.
///
/// # Errors
/// Returns `SyncError::Configuration` if no column is given or a name is invalid.
pub fn record_update_template(
    spec: &TableSpec,
    columns: &[&str],
    override_template: Option<&str>,
) -> Result<Statement, SyncError> {
    let mut statement = Statement::new(StatementKind::Update, spec.table(), spec.key().clone())?;
    let template = match override_template {
        Some(text) => text.to_string(),
        None => {
            if columns.is_empty() {
                return Err(SyncError::config(format!(
                    "update of '{}' sets no columns",
                    spec.table()
                )));
            }
            let mut assignments = Vec::with_capacity(columns.len());
            for column in columns {
                validate_identifier(column)?;
                assignments.push(format!("{column} = %({column})s"));
            }
            format!(
                "UPDATE {} SET {} WHERE {} = %(index)s;",
                spec.table(),
                assignments.join(", "),
                spec.date_column()?
            )
        }
    };
    statement = statement.with_template(template);
    statement.begin(false)?;
    Ok(statement)
}
