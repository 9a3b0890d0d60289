use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the ratesync workspace.
///
/// Structural problems (`Configuration`) abort a run and surface to the caller.
/// Data problems (`Data`) abort the current operation only. Per-unit write
/// failures (`WriteFailure`) are normally collected into reports instead of
/// being returned as `Err`.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyncError {
    /// Missing table/key metadata or an otherwise malformed table specification.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Issues with returned or expected data (empty results, malformed dates, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// A single row, cell, or parameter batch failed to persist.
    #[error("write failed for {unit}: {msg}")]
    WriteFailure {
        /// Description of the unit of work, e.g. "row 2020-06-10" or "cell DGS1@2020-06-10".
        unit: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The external store adapter reported an error.
    #[error("store error: {0}")]
    Store(String),
}

impl SyncError {
    /// Helper: build a `Configuration` error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Helper: build a `Data` error.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Helper: build a `Store` error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Helper: build a `WriteFailure` for a unit of work.
    pub fn write_failure(unit: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::WriteFailure {
            unit: unit.into(),
            msg: msg.into(),
        }
    }

    /// Convert any error raised while writing `unit` into a `WriteFailure`.
    ///
    /// Structural errors are returned unchanged so callers can still propagate them.
    #[must_use]
    pub fn into_write_failure(self, unit: impl Into<String>) -> Self {
        match self {
            e @ (Self::Configuration(_) | Self::WriteFailure { .. }) => e,
            Self::Data(msg) | Self::Store(msg) => Self::write_failure(unit, msg),
        }
    }

    /// Returns true if this error invalidates the whole run rather than one unit of work.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
