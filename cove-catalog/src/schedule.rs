use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opening and closing time for one day. Closing is exclusive: an
/// occupancy (plus its turnaround buffer) must end at or before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenHours {
    pub opens: NaiveTime,
    pub closes: NaiveTime,
}

/// Per-location operating hours by day of week. A missing entry means
/// the location is closed that day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSchedule {
    pub location_id: Uuid,
    pub monday: Option<OpenHours>,
    pub tuesday: Option<OpenHours>,
    pub wednesday: Option<OpenHours>,
    pub thursday: Option<OpenHours>,
    pub friday: Option<OpenHours>,
    pub saturday: Option<OpenHours>,
    pub sunday: Option<OpenHours>,
}

impl LocationSchedule {
    /// Schedule with the same hours every day of the week.
    pub fn uniform(location_id: Uuid, opens: NaiveTime, closes: NaiveTime) -> Self {
        let hours = Some(OpenHours { opens, closes });
        Self {
            location_id,
            monday: hours,
            tuesday: hours,
            wednesday: hours,
            thursday: hours,
            friday: hours,
            saturday: hours,
            sunday: hours,
        }
    }

    pub fn hours_on(&self, day: Weekday) -> Option<OpenHours> {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    /// Closing instant for the calendar day of `instant`, if open that day.
    pub fn closing_at(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let hours = self.hours_on(instant.weekday())?;
        Some(
            instant
                .date_naive()
                .and_time(hours.closes)
                .and_utc(),
        )
    }

    /// Opening instant for the calendar day of `instant`, if open that day.
    pub fn opening_at(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let hours = self.hours_on(instant.weekday())?;
        Some(
            instant
                .date_naive()
                .and_time(hours.opens)
                .and_utc(),
        )
    }
}
