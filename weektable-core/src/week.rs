//! The currently displayed week.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::event::Event;
use crate::projection::{self, WeekAgenda};
use crate::time_base::{TimeBase, monday_of};

const WEEK: Days = Days::new(7);

/// Holds the week anchor and moves it a week at a time.
///
/// Shifting is calendar-date arithmetic on the target timezone's dates, so
/// DST transitions never drift the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekNavigator {
    anchor: NaiveDate,
}

impl WeekNavigator {
    /// Start on today's week in the target timezone.
    pub fn new(time_base: &TimeBase, now: DateTime<Utc>) -> Self {
        WeekNavigator {
            anchor: time_base.date_of(now),
        }
    }

    pub fn starting_at(anchor: NaiveDate) -> Self {
        WeekNavigator { anchor }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn monday(&self) -> NaiveDate {
        monday_of(self.anchor)
    }

    pub fn next(&mut self) {
        // Out of chrono's date range the anchor stays put.
        if let Some(anchor) = self.anchor.checked_add_days(WEEK) {
            self.anchor = anchor;
        }
    }

    pub fn previous(&mut self) {
        if let Some(anchor) = self.anchor.checked_sub_days(WEEK) {
            self.anchor = anchor;
        }
    }

    /// Move `weeks` forward (positive) or backward (negative).
    pub fn shift(&mut self, weeks: i64) {
        for _ in 0..weeks.unsigned_abs() {
            if weeks > 0 {
                self.next();
            } else {
                self.previous();
            }
        }
    }

    /// Jump back to the week containing `now`.
    pub fn today(&mut self, time_base: &TimeBase, now: DateTime<Utc>) {
        self.anchor = time_base.date_of(now);
    }

    pub fn current_week_label(&self) -> String {
        projection::week_label(self.monday())
    }

    /// Project `events` onto the displayed week, marking today in the
    /// time base's zone.
    pub fn project(
        &self,
        events: &[Event],
        time_base: &TimeBase,
        now: DateTime<Utc>,
    ) -> WeekAgenda {
        projection::project(events, self.anchor, now, time_base)
    }
}
