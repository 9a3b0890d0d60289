/// Reading scalars out of result sets.
pub mod access;
/// Identifier validation and literal escaping.
pub mod naming;
/// Incremental statement synthesis.
pub mod statement;
/// SQL values and result rows.
pub mod value;
