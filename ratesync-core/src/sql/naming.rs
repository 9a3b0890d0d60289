//! Identifier validation and literal escaping for synthesized SQL.
//!
//! Wide inserts embed values as literals, so every table and column name that
//! reaches a statement is checked here first and text values are escaped.

use crate::SyncError;

/// Validate a table or column name.
///
/// Accepts dotted names (`schema.table`) where every segment starts with an
/// ASCII letter or underscore and continues with ASCII alphanumerics or
/// underscores. Segments are limited to 64 characters.
///
/// # Errors
/// Returns `SyncError::Configuration` when the name is empty or contains
/// anything other than the characters above.
pub fn validate_identifier(name: &str) -> Result<(), SyncError> {
    if name.is_empty() {
        return Err(SyncError::config("SQL identifier cannot be empty"));
    }
    for segment in name.split('.') {
        if segment.len() > 64 {
            return Err(SyncError::config(format!(
                "SQL identifier segment too long in '{name}' (max 64)"
            )));
        }
        let mut chars = segment.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => {
                return Err(SyncError::config(format!(
                    "invalid SQL identifier '{name}': each segment must start with a letter or underscore"
                )));
            }
        }
        if let Some(bad) = chars.find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
            return Err(SyncError::config(format!(
                "invalid SQL identifier '{name}': contains '{bad}'"
            )));
        }
    }
    Ok(())
}

/// Escape text for a single-quoted SQL literal by doubling quotes.
#[must_use]
pub fn escape_literal(value: &str) -> String {
    if !value.contains('\'') {
        return value.to_string();
    }
    value.replace('\'', "''")
}

/// Table name referenced by a `SELECT ... FROM <table>` query.
///
/// Returns the first token after the first `FROM` keyword with any trailing
/// semicolon stripped, or `None` when the query has no `FROM` clause.
#[must_use]
pub fn table_from_query(query: &str) -> Option<String> {
    let mut tokens = query.split_whitespace();
    tokens.find(|t| t.eq_ignore_ascii_case("from"))?;
    let table = tokens.next()?.trim_end_matches(';');
    (!table.is_empty()).then(|| table.to_string())
}
