//! Core of weektable, a weekly recurring-event timetable.
//!
//! - `time_base` resolves instants into the fixed target timezone
//! - `projection` and `week` turn recurrence rules into a concrete week
//! - `session` gates mutations behind a PIN challenge
//! - `store` wraps the persistence service behind `remote`

pub mod config;
pub mod error;
pub mod event;
pub mod projection;
pub mod remote;
pub mod session;
pub mod settings;
pub mod store;
pub mod time_base;
pub mod week;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{TimetableError, TimetableResult, ValidationError};
pub use event::{DaySet, Event, EventColor, EventDraft, EventIcon, EventId, EventPatch, TimeOfDay};
pub use projection::{DayAgenda, WeekAgenda};
pub use session::{GateDecision, PendingIntent, SessionGate, SessionState};
pub use store::EventStore;
pub use time_base::{DayIndex, TimeBase};
pub use week::WeekNavigator;
