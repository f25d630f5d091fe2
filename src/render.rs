//! TUI rendering for weektable types.
//!
//! Extension traits adding colored terminal rendering to weektable-core
//! types using owo_colors.

use chrono::DateTime;
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use weektable_core::settings::Settings;
use weektable_core::{DayAgenda, Event, WeekAgenda};

pub trait Render {
    fn render(&self) -> String;
}

/// "#3B82F6" -> (59, 130, 246). Malformed hex renders white.
fn rgb(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(255)
    };
    (channel(0), channel(2), channel(4))
}

fn time_range(event: &Event) -> String {
    match &event.end_time {
        Some(end) => format!("{} - {}", event.start_time.to_12h(), end.to_12h()),
        None => event.start_time.to_12h(),
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let (r, g, b) = rgb(self.color().hex());
        let mut line = format!(
            "{} {} {}",
            "▌".truecolor(r, g, b),
            self.icon().glyph(),
            self.title.bold()
        );
        line.push_str(&format!("  {}", time_range(self).dimmed()));
        line.push_str(&format!("  {}", format!("#{}", self.id).dimmed()));
        if let Some(description) = &self.description {
            line.push_str(&format!("\n       {}", description.dimmed()));
        }
        line
    }
}

impl Render for DayAgenda {
    fn render(&self) -> String {
        let header = format!("{} {}", self.day.name(), self.date.format("%-d %b"));
        let header = if self.is_today {
            format!("{} {}", header.green().bold(), "• Today".green())
        } else {
            header.bold().to_string()
        };

        let mut lines = vec![header];
        if self.events.is_empty() {
            lines.push(format!("   {}", "No events".dimmed()));
        }
        for event in &self.events {
            lines.push(format!("   {}", event.render()));
        }
        lines.join("\n")
    }
}

impl Render for WeekAgenda {
    fn render(&self) -> String {
        let mut lines = vec![
            format!("📅 {}", self.label().bold()),
            format!("   {}", self.subtitle().dimmed()),
        ];
        for day in self.days() {
            lines.push(String::new());
            lines.push(day.render());
        }
        lines.join("\n")
    }
}

impl Render for Settings {
    fn render(&self) -> String {
        let notifications = if self.notifications_enabled { "on" } else { "off" };
        format!(
            "{}\n   Timezone: {}\n   Notifications: {}",
            self.title.bold(),
            self.timezone,
            notifications
        )
    }
}

/// "Now: 2:05 PM NZDT"
pub fn render_now(now: &DateTime<Tz>) -> String {
    format!("Now: {}", now.format("%-I:%M %p %Z")).dimmed().to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use weektable_core::{DayIndex, EventId, TimeOfDay};

    use super::*;

    fn event(title: &str, start: &str, end: Option<&str>) -> Event {
        Event {
            id: EventId(1),
            title: title.to_string(),
            description: None,
            start_time: TimeOfDay::parse(start).unwrap(),
            end_time: end.map(|e| TimeOfDay::parse(e).unwrap()),
            days: [DayIndex::MONDAY].into_iter().collect(),
            color: "#10B981".to_string(),
            icon: "⚽".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(rgb("#3B82F6"), (59, 130, 246));
        assert_eq!(rgb("nonsense"), (255, 255, 255));
    }

    #[test]
    fn event_shows_twelve_hour_times() {
        let rendered = event("Football", "15:30", Some("17:00")).render();
        assert!(rendered.contains("Football"));
        assert!(rendered.contains("3:30 PM - 5:00 PM"));
        assert!(rendered.contains("⚽"));
    }

    #[test]
    fn today_is_marked() {
        let tz = chrono_tz::Pacific::Auckland;
        let now = tz.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap();
        let week = weektable_core::projection::project(
            &[event("Football", "15:30", None)],
            now.date_naive(),
            now.with_timezone(&chrono::Utc),
            &weektable_core::TimeBase::default(),
        );

        let rendered = week.render();
        assert_eq!(rendered.matches("Today").count(), 1);
        assert!(rendered.contains("Mar 3 - Mar 9, 2025"));
        assert!(render_now(&now).contains("NZDT"));
    }
}
