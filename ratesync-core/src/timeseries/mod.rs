/// Fetched time-series batches.
pub mod batch;
/// Sparse and placeholder row exclusion.
pub mod exclusion;
/// Left-merge of fetched rows against a persisted snapshot.
pub mod merge;
/// Calendar partitioning around a persisted extent.
pub mod partition;
/// Date parsing, formatting and periodicity-aware advances.
pub mod period;
/// Resolved fetch window.
pub mod window;
