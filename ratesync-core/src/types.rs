//! Re-export of configuration, error and report types from `ratesync-types`.
// Consolidated re-exports so downstream crates can depend on `ratesync-core` only

pub use ratesync_types::{
    CurrentView, ExclusionPolicy, Items, KeyColumns, Layout, Locator, Periodicity, SyncConfig,
    VerticalMapping,
};
pub use ratesync_types::{Exclusion, ExclusionReason, UpdateReport, WriteReport, WriteStatus};
pub use ratesync_types::{Operation, SyncError};

pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
