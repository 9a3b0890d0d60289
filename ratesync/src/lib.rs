//! ratesync keeps SQL time-series tables in step with an external data source.
//!
//! Overview
//! - Resolves the fetch window: a far-future start date is a placeholder for
//!   "resume after the last persisted row", and append mode advances past the
//!   persisted extent by the source's reporting periodicity.
//! - Filters sparse and placeholder rows with a configurable exclusion policy.
//! - Writes wide tables (one column per series) with a literal multi-row INSERT,
//!   falling back to one statement per row when the bulk insert fails.
//! - Writes vertical tables (one row per observation) with batched parameterized INSERTs.
//! - Reconciles against a current-view snapshot: rows after the persisted extent are
//!   inserted, rows at or before it only fill cells that are still empty.
//!
//! Key behaviors
//! - Per-unit write failures (a row, a cell, a parameter batch) are collected
//!   into reports; the run continues with the next unit.
//! - Configuration errors (missing table or key metadata) abort the operation
//!   before any statement is executed.
//! - Persisted values are never overwritten by gap-fill.
//!
//! Example
//! ```rust,ignore
//! use ratesync::{SyncConfig, Synchronizer};
//!
//! let cfg = SyncConfig::from_json_reader(std::fs::File::open("treasury.json")?)?;
//! let mut sync = Synchronizer::builder(store).config(cfg).build()?;
//! let report = sync.sync(&mut fetcher)?;
//! println!("{} rows written", report.rows_written());
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod phase;
mod report;
mod sync;

pub use core::{Synchronizer, SynchronizerBuilder};
pub use phase::{Phase, PhaseEvent};
pub use report::{ReconcileOutcome, SyncOutcome, SyncReport};

pub use ratesync_core::{
    CurrentView, Decimal, DryRun, ExclusionPolicy, ExclusionReason, Fetcher, Items, KeyColumns,
    Layout, Locator, NaiveDate, NamedParams, Operation, Periodicity, ResumeWindow, Row, SqlValue,
    Store, SyncConfig, SyncError, TableSpec, TimeSeriesBatch, UpdateReport, VerticalMapping,
    WriteReport, WriteStatus,
};
