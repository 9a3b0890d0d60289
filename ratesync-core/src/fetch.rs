use crate::SyncError;
use crate::timeseries::batch::TimeSeriesBatch;
use crate::timeseries::window::ResumeWindow;

/// Source of time-series data (an HTTP API, a file, a fixture).
///
/// The synchronizer asks for the window it resolved; implementations return
/// whatever rows the source has for it, possibly none.
pub trait Fetcher {
    /// Fetch observations for `window`.
    ///
    /// # Errors
    /// Returns an error if the source cannot be read.
    fn fetch(&mut self, window: &ResumeWindow) -> Result<TimeSeriesBatch, SyncError>;
}

impl<F> Fetcher for F
where
    F: FnMut(&ResumeWindow) -> Result<TimeSeriesBatch, SyncError>,
{
    fn fetch(&mut self, window: &ResumeWindow) -> Result<TimeSeriesBatch, SyncError> {
        self(window)
    }
}
