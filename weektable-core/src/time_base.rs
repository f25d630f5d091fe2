//! Target-timezone clock and weekday indexing.
//!
//! Everything in weektable is expressed in one fixed IANA timezone, never in
//! the viewer's local zone. `TimeBase` is also the only place that converts
//! between chrono's weekday numbering and the Monday-based `DayIndex` used by
//! events and agendas.

use std::fmt;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{TimetableError, TimetableResult, ValidationError};

pub const DEFAULT_TIMEZONE: &str = "Pacific/Auckland";

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Weekday index, 0 = Monday through 6 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct DayIndex(u8);

impl DayIndex {
    pub const MONDAY: DayIndex = DayIndex(0);
    pub const SUNDAY: DayIndex = DayIndex(6);

    pub const ALL: [DayIndex; 7] = [
        DayIndex(0),
        DayIndex(1),
        DayIndex(2),
        DayIndex(3),
        DayIndex(4),
        DayIndex(5),
        DayIndex(6),
    ];

    pub fn new(index: u8) -> Option<Self> {
        (index < 7).then_some(DayIndex(index))
    }

    /// Rotate a Sunday = 0 day-of-week value into the Monday = 0 convention.
    pub fn from_sunday_based(raw: u32) -> Self {
        DayIndex(((raw + 6) % 7) as u8)
    }

    /// Monday-based index of a calendar date.
    pub fn of_date(date: NaiveDate) -> Self {
        Self::from_sunday_based(date.weekday().num_days_from_sunday())
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        DAY_NAMES[self.0 as usize]
    }

    pub fn short_name(self) -> &'static str {
        &DAY_NAMES[self.0 as usize][..3]
    }
}

impl TryFrom<i64> for DayIndex {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(DayIndex::new)
            .ok_or(ValidationError::InvalidDay(value))
    }
}

impl From<DayIndex> for u8 {
    fn from(day: DayIndex) -> Self {
        day.0
    }
}

impl fmt::Display for DayIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The Monday of the week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let offset = DayIndex::of_date(date).get() as u64;
    // A Monday always exists within six days before any representable date
    // except at the very start of chrono's range.
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Resolves instants into the fixed target timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBase {
    tz: Tz,
}

impl TimeBase {
    pub fn new(tz: Tz) -> Self {
        TimeBase { tz }
    }

    /// Parse an IANA timezone name. An unknown zone is a configuration error.
    pub fn from_name(name: &str) -> TimetableResult<Self> {
        let tz: Tz = name
            .trim()
            .parse()
            .map_err(|_| TimetableError::Config(format!("Unknown timezone '{}'", name)))?;
        Ok(TimeBase { tz })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// The current instant in the target timezone.
    pub fn now(&self) -> DateTime<Tz> {
        self.localize(Utc::now())
    }

    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.localize(instant).date_naive()
    }

    pub fn time_of(&self, instant: DateTime<Utc>) -> NaiveTime {
        self.localize(instant).time()
    }

    pub fn weekday_index(&self, instant: DateTime<Utc>) -> DayIndex {
        DayIndex::of_date(self.date_of(instant))
    }

    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        TimeBase {
            tz: chrono_tz::Pacific::Auckland,
        }
    }
}
