use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Half-open time interval [start, end). Used both for reservation
/// occupancy periods and for a location's daily operating hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window; end must not precede start.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if end < start {
            None
        } else {
            Some(Self { start, end })
        }
    }

    /// Window starting at `start` and lasting a whole number of hours.
    pub fn from_hours(start: DateTime<Utc>, hours: u32) -> Self {
        Self {
            start,
            end: start + Duration::hours(hours as i64),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Same start, end pushed out by `buffer`. Models the turnaround
    /// period during which a unit is still unavailable.
    pub fn extended_by(&self, buffer: Duration) -> TimeWindow {
        TimeWindow {
            start: self.start,
            end: self.end + buffer,
        }
    }
}
