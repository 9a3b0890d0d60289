//! ratesync-core
//!
//! Building blocks shared by the ratesync synchronizer.
//!
//! - `types`: configuration, errors and reports re-exported from `ratesync-types`.
//! - `sql`: SQL values, result rows, statement synthesis and result access.
//! - `store`: the `Store` trait implemented by database adapters, plus a dry-run wrapper.
//! - `table`: validated description of a target table.
//! - `timeseries`: fetched batches, exclusion policy, calendar partitioning and snapshot merging.
//! - `write`: pure builders turning batches into INSERT and UPDATE work.
//!
//! Nothing in this crate talks to a database directly. Builders return SQL text
//! and parameter rows; the orchestrator in the `ratesync` crate hands them to a
//! `Store` and folds the outcomes into reports.
#![warn(missing_docs)]

/// Source collaborator trait that produces fetched batches.
pub mod fetch;
/// SQL values, rows, statement synthesis and result access.
pub mod sql;
/// The `Store` trait and dry-run wrapper.
pub mod store;
/// Validated target-table description.
pub mod table;
/// Fetched batches, exclusion, partitioning and merging.
pub mod timeseries;
pub mod types;
/// Pure INSERT/UPDATE builders.
pub mod write;

pub use fetch::Fetcher;
pub use sql::access::{Position, extract_date, extract_scalar};
pub use sql::statement::{Statement, StatementKind};
pub use sql::value::{NamedParams, Row, SqlValue};
pub use store::{DryRun, Store};
pub use table::{ColumnMapping, ColumnSpec, SourceTag, TableSpec, VerticalColumns};
pub use timeseries::batch::TimeSeriesBatch;
pub use timeseries::exclusion::evaluate_row;
pub use timeseries::merge::{MergedView, Snapshot};
pub use timeseries::partition::{Partition, is_newer_than, partition_by_extent};
pub use timeseries::period::{advance_extent, format_date, parse_date, period_advance};
pub use timeseries::window::ResumeWindow;
pub use types::*;
