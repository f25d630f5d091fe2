//! Weekly recurring event types.
//!
//! An `Event` recurs every week on a set of weekdays at a wall-clock time in
//! the target timezone. Drafts and patches are the shapes sent to the
//! persistence service; both are validated locally first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time_base::DayIndex;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Opaque event identifier assigned by the persistence service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(EventId)
    }
}

/// Zero-padded 24-hour `HH:MM` wall-clock time.
///
/// Ordering is plain string ordering, which matches chronological order for
/// this format.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(String);

impl TimeOfDay {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
        if !well_formed {
            return Err(ValidationError::InvalidTime(s.to_string()));
        }

        let hour: u32 = s[..2].parse().map_err(|_| ValidationError::InvalidTime(s.to_string()))?;
        let minute: u32 = s[3..].parse().map_err(|_| ValidationError::InvalidTime(s.to_string()))?;
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidTime(s.to_string()));
        }

        Ok(TimeOfDay(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn hour(&self) -> u32 {
        self.0[..2].parse().unwrap_or(0)
    }

    pub fn minute(&self) -> u32 {
        self.0[3..].parse().unwrap_or(0)
    }

    /// 12-hour clock rendering, e.g. "9:05 AM" or "12:30 PM".
    pub fn to_12h(&self) -> String {
        let hour = self.hour();
        let suffix = if hour >= 12 { "PM" } else { "AM" };
        let display_hour = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", display_hour, self.minute(), suffix)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TimeOfDay::parse(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.0
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeOfDay::parse(s)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of weekdays an event recurs on. Duplicates collapse and iteration is
/// always Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<u8>")]
pub struct DaySet(u8);

impl DaySet {
    pub fn empty() -> Self {
        DaySet(0)
    }

    pub fn single(day: DayIndex) -> Self {
        DaySet(1 << day.get())
    }

    pub fn contains(&self, day: DayIndex) -> bool {
        self.0 & (1 << day.get()) != 0
    }

    pub fn insert(&mut self, day: DayIndex) {
        self.0 |= 1 << day.get();
    }

    pub fn remove(&mut self, day: DayIndex) {
        self.0 &= !(1 << day.get());
    }

    pub fn toggle(&mut self, day: DayIndex) {
        self.0 ^= 1 << day.get();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = DayIndex> + '_ {
        DayIndex::ALL.into_iter().filter(|d| self.contains(*d))
    }
}

impl FromIterator<DayIndex> for DaySet {
    fn from_iter<I: IntoIterator<Item = DayIndex>>(iter: I) -> Self {
        let mut set = DaySet::empty();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl TryFrom<Vec<i64>> for DaySet {
    type Error = ValidationError;

    fn try_from(values: Vec<i64>) -> Result<Self, Self::Error> {
        values
            .into_iter()
            .map(DayIndex::try_from)
            .collect::<Result<DaySet, _>>()
    }
}

impl From<DaySet> for Vec<u8> {
    fn from(set: DaySet) -> Self {
        set.iter().map(DayIndex::get).collect()
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<_> = self.iter().map(DayIndex::short_name).collect();
        f.write_str(&names.join(", "))
    }
}

/// Colour category of an event. Unknown tags render as `School`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventColor {
    #[default]
    School,
    Sport,
    Art,
    Music,
    Play,
    Important,
    Fun,
    Other,
}

impl EventColor {
    pub const ALL: [EventColor; 8] = [
        EventColor::School,
        EventColor::Sport,
        EventColor::Art,
        EventColor::Music,
        EventColor::Play,
        EventColor::Important,
        EventColor::Fun,
        EventColor::Other,
    ];

    pub fn hex(self) -> &'static str {
        match self {
            EventColor::School => "#3B82F6",
            EventColor::Sport => "#10B981",
            EventColor::Art => "#F59E0B",
            EventColor::Music => "#8B5CF6",
            EventColor::Play => "#EC4899",
            EventColor::Important => "#EF4444",
            EventColor::Fun => "#14B8A6",
            EventColor::Other => "#6B7280",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventColor::School => "School",
            EventColor::Sport => "Sport",
            EventColor::Art => "Art",
            EventColor::Music => "Music",
            EventColor::Play => "Play",
            EventColor::Important => "Important",
            EventColor::Fun => "Fun",
            EventColor::Other => "Other",
        }
    }

    /// Resolve a stored tag, falling back to the default for anything unknown.
    pub fn from_tag(tag: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.hex().eq_ignore_ascii_case(tag.trim()))
            .unwrap_or_default()
    }
}

/// Icon of an event. Unknown tags render as the first icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventIcon(usize);

impl EventIcon {
    pub const ALL: [&'static str; 15] = [
        "📚", "⚽", "🎨", "🎵", "🎮", "🏊", "🚴", "🍽️", "🛌", "🎒", "🏫", "🎬", "🎪", "⭐", "💡",
    ];

    pub fn from_tag(tag: &str) -> Self {
        Self::ALL
            .iter()
            .position(|icon| *icon == tag.trim())
            .map(EventIcon)
            .unwrap_or_default()
    }

    pub fn glyph(self) -> &'static str {
        Self::ALL[self.0]
    }

    /// Position in [`EventIcon::ALL`].
    pub fn index(self) -> usize {
        self.0
    }
}

fn default_color() -> String {
    EventColor::default().hex().to_string()
}

fn default_icon() -> String {
    EventIcon::default().glyph().to_string()
}

/// A weekly recurring event as held by the persistence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: TimeOfDay,
    #[serde(default)]
    pub end_time: Option<TimeOfDay>,
    pub days: DaySet,
    /// Raw colour tag; see [`Event::color`].
    #[serde(default = "default_color")]
    pub color: String,
    /// Raw icon tag; see [`Event::icon`].
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Event {
    pub fn recurs_on(&self, day: DayIndex) -> bool {
        self.days.contains(day)
    }

    pub fn color(&self) -> EventColor {
        EventColor::from_tag(&self.color)
    }

    pub fn icon(&self) -> EventIcon {
        EventIcon::from_tag(&self.icon)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.icon().glyph(), self.title)
    }
}

fn normalize_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong { max: MAX_TITLE_LEN });
    }
    Ok(title.to_string())
}

fn normalize_description(description: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong {
            max: MAX_DESCRIPTION_LEN,
        });
    }
    Ok(Some(description.to_string()))
}

/// Fields of a new event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: TimeOfDay,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<TimeOfDay>,
    pub days: DaySet,
    pub color: String,
    pub icon: String,
}

impl EventDraft {
    /// Blank form defaults: 09:00-10:00 on `day`.
    pub fn for_day(day: DayIndex) -> Self {
        EventDraft {
            title: String::new(),
            description: None,
            start_time: TimeOfDay("09:00".to_string()),
            end_time: Some(TimeOfDay("10:00".to_string())),
            days: DaySet::single(day),
            color: default_color(),
            icon: default_icon(),
        }
    }

    /// Prefill a form from an existing event.
    pub fn from_event(event: &Event) -> Self {
        EventDraft {
            title: event.title.clone(),
            description: event.description.clone(),
            start_time: event.start_time.clone(),
            end_time: event.end_time.clone(),
            days: event.days,
            color: event.color.clone(),
            icon: event.icon.clone(),
        }
    }

    /// Trim and check every field. `end_time` is not compared to `start_time`.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let title = normalize_title(&self.title)?;
        let description = normalize_description(self.description.as_deref())?;
        if self.days.is_empty() {
            return Err(ValidationError::NoDays);
        }

        Ok(EventDraft {
            title,
            description,
            ..self
        })
    }
}

/// Partial update of an event; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<DaySet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == EventPatch::default()
    }

    pub fn validated(self) -> Result<Self, ValidationError> {
        let title = self.title.as_deref().map(normalize_title).transpose()?;
        let description = match self.description.as_deref() {
            Some(d) => normalize_description(Some(d))?,
            None => None,
        };
        if self.days.is_some_and(|d| d.is_empty()) {
            return Err(ValidationError::NoDays);
        }

        Ok(EventPatch {
            title,
            description,
            ..self
        })
    }

    /// Apply this patch to a local copy (used by fakes and previews).
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = Some(description.clone());
        }
        if let Some(start) = &self.start_time {
            event.start_time = start.clone();
        }
        if let Some(end) = &self.end_time {
            event.end_time = Some(end.clone());
        }
        if let Some(days) = self.days {
            event.days = days;
        }
        if let Some(color) = &self.color {
            event.color = color.clone();
        }
        if let Some(icon) = &self.icon {
            event.icon = icon.clone();
        }
    }
}

impl From<EventDraft> for EventPatch {
    /// A full-form edit sends every field.
    fn from(draft: EventDraft) -> Self {
        EventPatch {
            title: Some(draft.title),
            description: draft.description,
            start_time: Some(draft.start_time),
            end_time: draft.end_time,
            days: Some(draft.days),
            color: Some(draft.color),
            icon: Some(draft.icon),
        }
    }
}
