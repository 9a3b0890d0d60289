//! Pure builders that turn fetched batches into INSERT and UPDATE work.
//!
//! Builders never touch a store. They return statement text, parameter rows
//! and a report pre-filled with exclusions; the caller executes the work and
//! records successes and failures.

/// Single-record INSERT.
pub mod record;
/// Gap-fill and record UPDATEs.
pub mod update;
/// Parameterized vertical INSERT.
pub mod vertical;
/// Literal multi-row wide INSERT.
pub mod wide;

pub use record::build_record_insert;
pub use update::{GapFillCell, GapFillPlan, plan_gap_fill, record_update_template};
pub use vertical::{POSITIONAL_LIMIT, VerticalInsert, VerticalRole, build_vertical_insert};
pub use wide::{WideInsert, WideRow, build_wide_insert};
