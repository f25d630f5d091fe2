//! Weekly recurrence projection.
//!
//! Projects a set of weekly recurring events onto one concrete week,
//! producing a Monday-to-Sunday agenda with each day's events in start-time
//! order. Projection is a pure function of its inputs.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::event::Event;
use crate::time_base::{DayIndex, TimeBase, monday_of};

/// One day of a projected week.
#[derive(Debug, Clone, PartialEq)]
pub struct DayAgenda {
    pub day: DayIndex,
    pub date: NaiveDate,
    pub is_today: bool,
    pub events: Vec<Event>,
}

/// A projected week, always seven days starting on Monday.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekAgenda {
    monday: NaiveDate,
    days: Vec<DayAgenda>,
}

/// Project `events` onto the week containing `anchor`.
///
/// Within a day, events are ordered by `start_time`; events starting at the
/// same time keep their input order. A day is marked as today only if it is
/// the date of `now` in the target timezone, so a different week never
/// carries a today marker.
pub fn project(
    events: &[Event],
    anchor: NaiveDate,
    now: DateTime<Utc>,
    time_base: &TimeBase,
) -> WeekAgenda {
    let monday = monday_of(anchor);
    let today = time_base.date_of(now);

    let days = DayIndex::ALL
        .into_iter()
        .map(|day| {
            let date = date_in_week(monday, day);
            let mut selected: Vec<Event> = events
                .iter()
                .filter(|event| event.recurs_on(day))
                .cloned()
                .collect();
            // sort_by is stable, which is the tie-break
            selected.sort_by(|a, b| a.start_time.cmp(&b.start_time));

            DayAgenda {
                day,
                date,
                is_today: date == today,
                events: selected,
            }
        })
        .collect();

    WeekAgenda { monday, days }
}

fn date_in_week(monday: NaiveDate, day: DayIndex) -> NaiveDate {
    monday
        .checked_add_days(Days::new(day.get() as u64))
        .unwrap_or(monday)
}

/// "Mar 3 - Mar 9, 2025"
pub fn week_label(monday: NaiveDate) -> String {
    let sunday = date_in_week(monday, DayIndex::SUNDAY);
    format!(
        "{} - {}",
        monday.format("%b %-d"),
        sunday.format("%b %-d, %Y")
    )
}

impl WeekAgenda {
    pub fn monday(&self) -> NaiveDate {
        self.monday
    }

    pub fn sunday(&self) -> NaiveDate {
        date_in_week(self.monday, DayIndex::SUNDAY)
    }

    pub fn days(&self) -> &[DayAgenda] {
        &self.days
    }

    pub fn day(&self, day: DayIndex) -> &DayAgenda {
        &self.days[day.get() as usize]
    }

    pub fn agenda_for_day(&self, day: DayIndex) -> &[Event] {
        &self.day(day).events
    }

    pub fn is_today(&self, day: DayIndex) -> bool {
        self.day(day).is_today
    }

    /// The index marked as today, if this is the current week.
    pub fn today(&self) -> Option<DayIndex> {
        self.days.iter().find(|d| d.is_today).map(|d| d.day)
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|d| d.events.is_empty())
    }

    pub fn label(&self) -> String {
        week_label(self.monday)
    }

    /// "Week of March"
    pub fn subtitle(&self) -> String {
        format!("Week of {}", self.monday.format("%B"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DaySet, EventId, TimeOfDay};
    use chrono::TimeZone;
    use chrono_tz::Tz;

    fn event(id: i64, days: &[u8], start: &str) -> Event {
        Event {
            id: EventId(id),
            title: format!("{} event", start),
            description: None,
            start_time: TimeOfDay::parse(start).unwrap(),
            end_time: None,
            days: days.iter().map(|d| DayIndex::new(*d).unwrap()).collect::<DaySet>(),
            color: "#3B82F6".to_string(),
            icon: "📚".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn auckland(y: i32, m: u32, d: u32, h: u32) -> DateTime<Tz> {
        chrono_tz::Pacific::Auckland
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
    }

    fn week_of(events: &[Event], anchor: NaiveDate, now: DateTime<Tz>) -> WeekAgenda {
        project(events, anchor, now.with_timezone(&Utc), &TimeBase::default())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn titles(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn events_land_on_their_days_in_time_order() {
        let events = vec![event(1, &[0, 2], "09:00"), event(2, &[0], "08:00")];
        let week = week_of(&events, date(2025, 3, 5), auckland(2025, 3, 5, 12));

        assert_eq!(
            titles(week.agenda_for_day(DayIndex::MONDAY)),
            vec!["08:00 event", "09:00 event"]
        );
        assert_eq!(
            titles(week.agenda_for_day(DayIndex::new(2).unwrap())),
            vec!["09:00 event"]
        );
        assert!(week.agenda_for_day(DayIndex::new(1).unwrap()).is_empty());
    }

    #[test]
    fn membership_matches_day_sets() {
        let events = vec![
            event(1, &[0, 1, 2, 3, 4], "07:30"),
            event(2, &[5, 6], "10:00"),
            event(3, &[3], "15:00"),
        ];
        let week = week_of(&events, date(2025, 3, 5), auckland(2025, 3, 5, 12));

        for day in DayIndex::ALL {
            for e in &events {
                let listed = week.agenda_for_day(day).iter().any(|x| x.id == e.id);
                assert_eq!(listed, e.days.contains(day), "event {} on {}", e.id, day);
            }
        }
    }

    #[test]
    fn equal_start_times_keep_input_order() {
        let mut a = event(1, &[4], "10:00");
        a.title = "first".to_string();
        let mut b = event(2, &[4], "10:00");
        b.title = "second".to_string();
        let c = event(3, &[4], "09:00");

        let week = week_of(&[a, b, c], date(2025, 3, 5), auckland(2025, 3, 5, 12));
        assert_eq!(
            titles(week.agenda_for_day(DayIndex::new(4).unwrap())),
            vec!["09:00 event", "first", "second"]
        );
    }

    #[test]
    fn anchor_is_normalized_to_monday() {
        let week = week_of(&[], date(2025, 3, 9), auckland(2025, 3, 5, 12));
        assert_eq!(week.monday(), date(2025, 3, 3));
        assert_eq!(week.sunday(), date(2025, 3, 9));
        assert_eq!(week.day(DayIndex::new(2).unwrap()).date, date(2025, 3, 5));
    }

    #[test]
    fn exactly_one_today_in_current_week() {
        // Wednesday 2025-03-05
        let now = auckland(2025, 3, 5, 8);
        let week = week_of(&[], date(2025, 3, 3), now);

        let todays: Vec<_> = DayIndex::ALL.into_iter().filter(|d| week.is_today(*d)).collect();
        assert_eq!(todays, vec![DayIndex::new(2).unwrap()]);
        assert_eq!(week.today(), Some(DayIndex::new(2).unwrap()));
    }

    #[test]
    fn no_today_in_other_weeks() {
        let now = auckland(2025, 3, 5, 8);
        let next = week_of(&[], date(2025, 3, 12), now);
        let prev = week_of(&[], date(2025, 2, 26), now);

        assert_eq!(next.today(), None);
        assert_eq!(prev.today(), None);
        assert!(!next.is_today(DayIndex::new(2).unwrap()));
    }

    #[test]
    fn today_follows_target_timezone() {
        // Tuesday 23:30 in Auckland is still Tuesday there, whatever the
        // UTC date is (Tuesday 10:30 UTC).
        let now = auckland(2025, 3, 4, 23);
        let week = week_of(&[], date(2025, 3, 4), now);
        assert_eq!(week.today(), Some(DayIndex::new(1).unwrap()));
    }

    #[test]
    fn labels() {
        let week = week_of(&[], date(2024, 12, 31), auckland(2025, 3, 5, 8));
        assert_eq!(week.label(), "Dec 30 - Jan 5, 2025");
        assert_eq!(week.subtitle(), "Week of December");
    }

    #[test]
    fn projection_leaves_input_untouched() {
        let events = vec![event(2, &[0], "11:00"), event(1, &[0], "08:00")];
        let before = events.clone();
        let _ = week_of(&events, date(2025, 3, 3), auckland(2025, 3, 5, 8));
        assert_eq!(events, before);
    }

    #[test]
    fn today_is_resolved_in_the_time_base_zone() {
        // Tuesday 14:00 UTC is already Wednesday 03:00 in Auckland
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 14, 0, 0).unwrap();

        let week = project(&[], date(2025, 3, 3), now, &TimeBase::default());
        assert_eq!(week.today(), Some(DayIndex::new(2).unwrap()));

        let berlin = TimeBase::new(chrono_tz::Europe::Berlin);
        let week = project(&[], date(2025, 3, 3), now, &berlin);
        assert_eq!(week.today(), Some(DayIndex::new(1).unwrap()));
    }
}
