use ratesync_types::{ExclusionReason, Operation, WriteReport};

use crate::SyncError;
use crate::sql::statement::{Statement, StatementKind};
use crate::sql::value::{Row, SqlValue};
use crate::table::TableSpec;
use crate::timeseries::batch::TimeSeriesBatch;
use crate::timeseries::period::format_date;

/// Widest insert that still binds positional `%s` parameters.
///
/// Wider inserts bind keyed `%(column)s` parameters through the table's
/// vertical mapping.
pub const POSITIONAL_LIMIT: usize = 4;

/// What an insert column of a vertical table receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalRole {
    /// Observation date.
    Date,
    /// Series identifier.
    Series,
    /// Observed value.
    Value,
    /// Source tag.
    Source,
    /// Nothing; bound as `NULL`.
    Null,
}

/// A parameterized INSERT plus its parameter rows.
#[derive(Debug, Clone)]
pub struct VerticalInsert {
    statement: Statement,
    columns: Vec<String>,
    roles: Vec<VerticalRole>,
    keyed: bool,
    rows: Vec<Row>,
    units: Vec<String>,
    /// Report pre-filled with exclusions and warnings.
    pub report: WriteReport,
}

impl VerticalInsert {
    /// Placeholder statement text.
    #[must_use]
    pub fn sql(&self) -> &str {
        self.statement.text()
    }

    /// True if rows bind by column name.
    #[must_use]
    pub const fn is_keyed(&self) -> bool {
        self.keyed
    }

    /// Insert columns, key columns first.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Role of each insert column.
    #[must_use]
    pub fn roles(&self) -> &[VerticalRole] {
        &self.roles
    }

    /// Parameter rows, one per admitted observation.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Parameter rows grouped into batches of at most `size`, each with a label
    /// naming its first and last observation.
    pub fn batches(&self, size: usize) -> impl Iterator<Item = (String, &[Row])> + '_ {
        let size = size.max(1);
        self.rows
            .chunks(size)
            .zip(self.units.chunks(size))
            .enumerate()
            .map(|(i, (rows, units))| {
                let first = units.first().map_or("", String::as_str);
                let last = units.last().map_or("", String::as_str);
                (format!("parameter batch {i} ({first} .. {last})"), rows)
            })
    }
}

/// Render `batch` into parameter rows for a vertical table.
///
/// Every `(date, series)` cell with a value becomes one row; absent cells are
/// recorded as excluded. Inserts up to `POSITIONAL_LIMIT` columns wide bind
/// positional parameters, wider ones bind keyed parameters.
///
/// # Errors
/// Returns `SyncError::Configuration` for wide tables or when no series and
/// value columns can be identified.
pub fn build_vertical_insert(
    spec: &TableSpec,
    batch: &TimeSeriesBatch,
) -> Result<VerticalInsert, SyncError> {
    let vertical = spec.vertical_columns()?;
    let mut columns: Vec<String> = spec.key().names().into_iter().map(str::to_string).collect();
    columns.extend(vertical.columns.iter().cloned());
    let keyed = columns.len() > POSITIONAL_LIMIT;
    let roles = assign_roles(spec, &columns)?;

    let mut statement = Statement::new(StatementKind::Insert, spec.table(), spec.key().clone())?
        .with_columns(vertical.columns.clone())?;
    statement.begin(true)?;
    statement.declare_columns(&[])?;
    let placeholders: Vec<String> = if keyed {
        columns.iter().map(|c| format!("%({c})s")).collect()
    } else {
        vec!["%s".to_string(); columns.len()]
    };
    statement.append_fragment(&format!("({})", placeholders.join(", ")), ";")?;

    let tag = spec
        .source()
        .map_or(SqlValue::Null, |s| SqlValue::Text(s.tag.clone()));
    let mut report = WriteReport::new(Operation::WriteVertical);
    let mut rows = Vec::new();
    let mut units = Vec::new();
    for (date, values) in batch.iter() {
        for (series, value) in batch.columns().iter().zip(values) {
            let unit = format!("{}/{series}", format_date(date));
            let Some(value) = value else {
                report.exclude(unit, ExclusionReason::AbsentValue);
                continue;
            };
            let params = roles.iter().map(|role| match role {
                VerticalRole::Date => SqlValue::Date(date),
                VerticalRole::Series => SqlValue::Text(series.clone()),
                VerticalRole::Value => SqlValue::Decimal(*value),
                VerticalRole::Source => tag.clone(),
                VerticalRole::Null => SqlValue::Null,
            });
            rows.push(if keyed {
                Row::Named(columns.iter().cloned().zip(params).collect())
            } else {
                Row::Positional(params.collect())
            });
            units.push(unit);
        }
    }
    if rows.is_empty() {
        report
            .warnings
            .push("no observation carries a value; nothing to insert".to_string());
    }

    Ok(VerticalInsert {
        statement,
        columns,
        roles,
        keyed,
        rows,
        units,
        report,
    })
}

fn assign_roles(spec: &TableSpec, columns: &[String]) -> Result<Vec<VerticalRole>, SyncError> {
    let vertical = spec.vertical_columns()?;
    let date_column = spec.date_column()?;
    let source_column = spec.source().map(|s| s.column.as_str());

    let mut roles: Vec<Option<VerticalRole>> = columns
        .iter()
        .map(|c| {
            if c == date_column || *c == vertical.mapping.date {
                Some(VerticalRole::Date)
            } else if Some(c.as_str()) == source_column {
                Some(VerticalRole::Source)
            } else if *c == vertical.mapping.id {
                Some(VerticalRole::Series)
            } else if *c == vertical.mapping.value {
                Some(VerticalRole::Value)
            } else {
                None
            }
        })
        .collect();

    // Unmapped non-key columns take the series, value and source slots in order.
    for wanted in [VerticalRole::Series, VerticalRole::Value, VerticalRole::Source] {
        if roles.contains(&Some(wanted)) {
            continue;
        }
        if wanted == VerticalRole::Source && source_column.is_some() {
            continue;
        }
        let free = roles
            .iter()
            .enumerate()
            .position(|(i, r)| r.is_none() && !spec.key().contains(&columns[i]));
        if let Some(i) = free {
            roles[i] = Some(wanted);
        }
    }

    let roles: Vec<VerticalRole> = roles
        .into_iter()
        .map(|r| r.unwrap_or(VerticalRole::Null))
        .collect();
    for needed in [VerticalRole::Series, VerticalRole::Value] {
        if !roles.contains(&needed) {
            return Err(SyncError::config(format!(
                "vertical insert into '{}' has no column for the {}",
                spec.table(),
                if needed == VerticalRole::Series {
                    "series identifier"
                } else {
                    "observed value"
                }
            )));
        }
    }
    Ok(roles)
}
