use crate::SyncError;
use crate::sql::statement::{ROW_SEPARATOR, Statement, StatementKind};
use crate::sql::value::SqlValue;
use crate::table::TableSpec;

/// Literal INSERT of a single record.
///
/// `record` holds `(column, value)` pairs and must include every key column;
/// the remaining pairs become value columns in the order given.
///
/// # Errors
/// Returns `SyncError::Configuration` when a key column is missing, no value
/// column remains, or a column name is invalid.
pub fn build_record_insert(
    spec: &TableSpec,
    record: &[(String, SqlValue)],
) -> Result<Statement, SyncError> {
    let lookup = |name: &str| record.iter().find(|(c, _)| c == name).map(|(_, v)| v);

    let mut literals = Vec::with_capacity(record.len());
    for name in spec.key().names() {
        let value = lookup(name).ok_or_else(|| {
            SyncError::config(format!(
                "record for '{}' has no value for key column '{name}'",
                spec.table()
            ))
        })?;
        literals.push(value.to_literal());
    }

    let values: Vec<&(String, SqlValue)> = record
        .iter()
        .filter(|(c, _)| !spec.key().contains(c))
        .collect();
    literals.extend(values.iter().map(|(_, v)| v.to_literal()));

    let mut stmt = Statement::new(StatementKind::Insert, spec.table(), spec.key().clone())?
        .with_columns(values.iter().map(|(c, _)| c.clone()))?;
    stmt.begin(true)?;
    stmt.declare_columns(&[])?;
    stmt.append_fragment(&format!("({})", literals.join(", ")), ROW_SEPARATOR)?;
    stmt.finalize_rows();
    Ok(stmt)
}
