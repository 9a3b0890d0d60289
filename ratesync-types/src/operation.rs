use core::fmt;
use serde::{Deserialize, Serialize};

/// Labels for the write and update operations of a synchronization run.
///
/// Used in reports, errors, and tracing fields so that every log line and
/// report can be traced back to the step that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Operation {
    /// Literal multi-row INSERT into a wide table.
    WriteWide,
    /// Parameterized batched INSERT into a vertical table.
    WriteVertical,
    /// Single record INSERT.
    WriteRecord,
    /// Per-cell gap-fill UPDATEs of the old partition.
    GapFill,
    /// Per-row UPDATEs from named parameter records.
    UpdateRecords,
}

impl Operation {
    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WriteWide => "write-wide",
            Self::WriteVertical => "write-vertical",
            Self::WriteRecord => "write-record",
            Self::GapFill => "gap-fill",
            Self::UpdateRecords => "update-records",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
