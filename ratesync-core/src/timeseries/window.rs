use chrono::NaiveDate;

/// Date range a run fetches, after placeholder and resume resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeWindow {
    /// Start date as configured (possibly a far-future placeholder).
    pub requested_start: NaiveDate,
    /// Start date actually used for fetching.
    pub resolved_start: NaiveDate,
    /// Optional inclusive end date.
    pub end: Option<NaiveDate>,
}

impl ResumeWindow {
    /// Window whose resolved start equals the requested start.
    #[must_use]
    pub const fn new(requested_start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self {
            requested_start,
            resolved_start: requested_start,
            end,
        }
    }

    /// Same window resumed from `start`.
    #[must_use]
    pub const fn resumed_at(self, start: NaiveDate) -> Self {
        Self {
            resolved_start: start,
            ..self
        }
    }

    /// True if resolution moved the start away from the request.
    #[must_use]
    pub fn is_resumed(&self) -> bool {
        self.resolved_start != self.requested_start
    }

    /// True if `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.resolved_start && self.end.is_none_or(|end| date <= end)
    }
}
