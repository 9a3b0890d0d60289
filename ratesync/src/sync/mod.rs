//! Public operations of `Synchronizer`, one file per concern.

mod pipeline;
mod reconcile;
mod update;
mod window;
mod write;
