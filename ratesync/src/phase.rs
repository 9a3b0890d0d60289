//! Reconcile progress as a small state machine.
//!
//! `Fetched -> Partitioned -> Merged -> Writing -> Done`. Updates and inserts
//! may finish in either order; the run is done once both have.

use ratesync_core::SyncError;

/// Where a reconcile run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Data fetched, nothing derived yet.
    Fetched,
    /// Rows split into new and old partitions.
    Partitioned,
    /// Old partition merged with the persisted snapshot.
    Merged,
    /// One of the two write steps has completed.
    Writing {
        /// Gap-fill updates applied.
        updated: bool,
        /// New rows inserted.
        inserted: bool,
    },
    /// Both write steps completed.
    Done,
}

/// Progress signals fed to `Phase::on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// Rows were split around the persisted extent.
    Partitioned,
    /// The old partition was merged with the snapshot.
    Merged,
    /// Gap-fill updates finished.
    UpdatesApplied,
    /// New-row inserts finished.
    InsertsApplied,
}

impl Phase {
    /// Next phase after `event`.
    ///
    /// # Errors
    /// Returns `SyncError::Data` for an event that is out of order.
    pub fn on(self, event: PhaseEvent) -> Result<Self, SyncError> {
        let next = match (self, event) {
            (Self::Fetched, PhaseEvent::Partitioned) => Self::Partitioned,
            (Self::Partitioned, PhaseEvent::Merged) => Self::Merged,
            (Self::Merged, PhaseEvent::UpdatesApplied) => Self::Writing {
                updated: true,
                inserted: false,
            },
            (Self::Merged, PhaseEvent::InsertsApplied) => Self::Writing {
                updated: false,
                inserted: true,
            },
            (
                Self::Writing {
                    updated: false,
                    inserted: true,
                },
                PhaseEvent::UpdatesApplied,
            )
            | (
                Self::Writing {
                    updated: true,
                    inserted: false,
                },
                PhaseEvent::InsertsApplied,
            ) => Self::Done,
            (state, event) => {
                return Err(SyncError::data(format!(
                    "reconcile received {event:?} while {state:?}"
                )));
            }
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(from = ?self, to = ?next, "reconcile phase transition");
        Ok(next)
    }

    /// True once both write steps are complete.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}
