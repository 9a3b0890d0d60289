//! Ratesync data transfer objects, configuration primitives, and the shared error type.
#![warn(missing_docs)]

mod config;
mod error;
mod operation;
mod reports;

pub use config::{
    CurrentView, ExclusionPolicy, Items, KeyColumns, Layout, Locator, Periodicity, SyncConfig,
    VerticalMapping,
};
pub use error::SyncError;
pub use operation::Operation;
pub use reports::{Exclusion, ExclusionReason, UpdateReport, WriteReport, WriteStatus};
