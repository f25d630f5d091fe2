//! Client-side facade over the persistence service.
//!
//! The store never patches its snapshot locally. Every successful mutation
//! is followed by a full reload, so projections always see exactly what the
//! service holds.

use chrono::{DateTime, Utc};

use crate::error::{TimetableError, TimetableResult};
use crate::event::{Event, EventDraft, EventId, EventPatch};
use crate::projection::WeekAgenda;
use crate::remote::EventService;
use crate::session::SessionGate;
use crate::settings::{Settings, SettingsPatch};
use crate::time_base::TimeBase;
use crate::week::WeekNavigator;

pub struct EventStore<S> {
    service: S,
    events: Vec<Event>,
    settings: Settings,
}

impl<S: EventService> EventStore<S> {
    pub fn new(service: S) -> Self {
        EventStore {
            service,
            events: Vec::new(),
            settings: Settings::default(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Snapshot from the last successful reload.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Settings as of the last fetch.
    pub fn cached_settings(&self) -> &Settings {
        &self.settings
    }

    /// Reload every event. Always permitted; a failure keeps the previous
    /// snapshot.
    pub async fn list(&mut self) -> TimetableResult<&[Event]> {
        self.events = self.service.list_events().await?;
        tracing::debug!(count = self.events.len(), "reloaded events");
        Ok(&self.events)
    }

    pub async fn create(
        &mut self,
        session: &mut SessionGate,
        draft: EventDraft,
    ) -> TimetableResult<Event> {
        let draft = draft.validated()?;
        let result = {
            let credential = session.authorize()?;
            self.service.create_event(credential, &draft).await
        };
        let event = settle(session, result)?;
        tracing::info!(id = %event.id, title = %event.title, "created event");

        self.reload_after("create").await?;
        Ok(event)
    }

    pub async fn update(
        &mut self,
        session: &mut SessionGate,
        id: EventId,
        patch: EventPatch,
    ) -> TimetableResult<Event> {
        let patch = patch.validated()?;
        let result = {
            let credential = session.authorize()?;
            self.service.update_event(credential, id, &patch).await
        };
        let event = settle(session, result)?;
        tracing::info!(%id, "updated event");

        self.reload_after("update").await?;
        Ok(event)
    }

    pub async fn delete(&mut self, session: &mut SessionGate, id: EventId) -> TimetableResult<()> {
        let result = {
            let credential = session.authorize()?;
            self.service.delete_event(credential, id).await
        };
        settle(session, result)?;
        tracing::info!(%id, "deleted event");

        self.reload_after("delete").await
    }

    /// Fetch the current settings. Always permitted.
    pub async fn settings(&mut self) -> TimetableResult<&Settings> {
        self.settings = self.service.get_settings().await?;
        Ok(&self.settings)
    }

    pub async fn update_settings(
        &mut self,
        session: &mut SessionGate,
        patch: SettingsPatch,
    ) -> TimetableResult<&Settings> {
        let result = {
            let credential = session.authorize()?;
            self.service.update_settings(credential, &patch).await
        };
        self.settings = settle(session, result)?;
        tracing::info!(title = %self.settings.title, "updated settings");
        Ok(&self.settings)
    }

    /// Project the current snapshot onto the navigator's week.
    pub fn project(
        &self,
        navigator: &WeekNavigator,
        time_base: &TimeBase,
        now: DateTime<Utc>,
    ) -> WeekAgenda {
        navigator.project(&self.events, time_base, now)
    }

    async fn reload_after(&mut self, action: &str) -> TimetableResult<()> {
        if let Err(e) = self.list().await {
            tracing::warn!(error = %e, action, "reload after mutation failed");
            return Err(TimetableError::Remote(format!(
                "The {action} succeeded but reloading events failed: {e}"
            )));
        }
        Ok(())
    }
}

/// A rejected credential locks the session before the error is returned.
fn settle<T>(session: &mut SessionGate, result: TimetableResult<T>) -> TimetableResult<T> {
    if let Err(TimetableError::Unauthorized(_)) = &result {
        session.invalidate_credential();
    }
    result
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::event::TimeOfDay;
    use crate::remote::AuthService;
    use crate::session::{
        ChallengeMode, ChallengeOutcome, GateDecision, PendingIntent, PinField, SessionState,
    };
    use crate::testing::{FakeBackend, event};
    use crate::time_base::DayIndex;

    fn draft(title: &str, start: &str, days: &[u8]) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            start_time: TimeOfDay::parse(start).unwrap(),
            days: days.iter().map(|d| DayIndex::new(*d).unwrap()).collect(),
            ..EventDraft::for_day(DayIndex::MONDAY)
        }
    }

    async fn unlocked(backend: &FakeBackend) -> SessionGate {
        let credential = backend.verify_pin("1234").await.unwrap();
        SessionGate::new(true).with_credential(credential)
    }

    // --- reads ---

    #[tokio::test]
    async fn list_is_allowed_while_locked() {
        let backend = FakeBackend::with_pin("1234");
        let mut gate = unlocked(&backend).await;
        let mut store = EventStore::new(backend);
        store.create(&mut gate, draft("Swim", "16:00", &[2])).await.unwrap();

        gate.lock().unwrap();
        let events = store.list().await.unwrap();
        assert_eq!(events.len(), 1);
    }

    // --- mutations ---

    #[tokio::test]
    async fn mutations_require_unlocked_session() {
        let mut store = EventStore::new(FakeBackend::with_pin("1234"));
        let mut gate = SessionGate::new(true);

        let result = store.create(&mut gate, draft("Swim", "16:00", &[2])).await;
        assert!(matches!(result, Err(TimetableError::Locked)));
        assert!(matches!(
            store.delete(&mut gate, EventId(1)).await,
            Err(TimetableError::Locked)
        ));
        assert!(store.service().calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_service() {
        let backend = FakeBackend::with_pin("1234");
        let mut gate = unlocked(&backend).await;
        let mut store = EventStore::new(backend);

        let result = store.create(&mut gate, draft("Swim", "16:00", &[])).await;
        assert!(matches!(result, Err(TimetableError::Validation(_))));

        let result = store.create(&mut gate, draft("   ", "16:00", &[1])).await;
        assert!(matches!(result, Err(TimetableError::Validation(_))));
        assert_eq!(store.service().count("create_event"), 0);
    }

    #[tokio::test]
    async fn every_mutation_reloads() {
        let backend = FakeBackend::with_pin("1234");
        let mut gate = unlocked(&backend).await;
        let mut store = EventStore::new(backend);

        let created = store
            .create(&mut gate, draft("Piano", "15:30", &[0, 3]))
            .await
            .unwrap();
        assert_eq!(store.events().len(), 1);

        let patch = EventPatch {
            title: Some("Piano lesson".to_string()),
            ..EventPatch::default()
        };
        store.update(&mut gate, created.id, patch).await.unwrap();
        assert_eq!(store.get(created.id).unwrap().title, "Piano lesson");

        store.delete(&mut gate, created.id).await.unwrap();
        assert!(store.events().is_empty());

        assert_eq!(
            store.service().calls(),
            vec![
                "verify_pin",
                "create_event",
                "list_events",
                "update_event",
                "list_events",
                "delete_event",
                "list_events",
            ]
        );
    }

    #[tokio::test]
    async fn failed_mutation_keeps_snapshot() {
        let backend = FakeBackend::with_pin("1234");
        let mut gate = unlocked(&backend).await;
        let mut store = EventStore::new(backend);
        store.create(&mut gate, draft("Swim", "16:00", &[2])).await.unwrap();

        let result = store.delete(&mut gate, EventId(99)).await;
        assert!(matches!(result, Err(TimetableError::NotFound(_))));
        assert_eq!(store.events().len(), 1);
        assert_eq!(gate.state(), SessionState::Unlocked);
    }

    #[tokio::test]
    async fn failed_reload_is_reported() {
        let backend = FakeBackend::with_pin("1234");
        let mut gate = unlocked(&backend).await;
        let mut store = EventStore::new(backend);

        store.service().fail_on("list_events", "Network error");
        let result = store.create(&mut gate, draft("Swim", "16:00", &[2])).await;

        let Err(TimetableError::Remote(message)) = result else {
            panic!("expected a reload failure");
        };
        assert!(message.contains("Network error"));
        assert_eq!(store.service().stored().len(), 1);
    }

    #[tokio::test]
    async fn rejected_credential_locks_session() {
        let backend = FakeBackend::with_pin("1234");
        let mut gate = unlocked(&backend).await;
        let mut store = EventStore::new(backend);

        store.service().revoke_tokens();
        let result = store.create(&mut gate, draft("Swim", "16:00", &[2])).await;

        assert!(matches!(result, Err(TimetableError::Unauthorized(_))));
        assert_eq!(gate.state(), SessionState::Locked);
        assert_eq!(
            gate.request_mutating_action(PendingIntent::AddEvent),
            GateDecision::Challenged(ChallengeMode::Verify)
        );
    }

    // --- settings ---

    #[tokio::test]
    async fn settings_update_requires_unlock() {
        let backend = FakeBackend::with_pin("1234");
        let mut store = EventStore::new(backend);
        let mut locked = SessionGate::new(true);

        assert_eq!(store.settings().await.unwrap().title, "My Timetable");

        let patch = SettingsPatch {
            title: Some("Mia's Week".to_string()),
            ..SettingsPatch::default()
        };
        assert!(matches!(
            store.update_settings(&mut locked, patch.clone()).await,
            Err(TimetableError::Locked)
        ));

        let mut gate = unlocked(store.service()).await;
        let settings = store.update_settings(&mut gate, patch).await.unwrap();
        assert_eq!(settings.title, "Mia's Week");
    }

    // --- end to end ---

    #[tokio::test]
    async fn deferred_delete_runs_after_first_setup() {
        let backend = FakeBackend::new().with_events(vec![event(5, "Swim", "16:00", &[2])]);
        let mut gate = SessionGate::start(&backend, None).await.unwrap();
        let mut store = EventStore::new(backend);
        store.list().await.unwrap();

        let GateDecision::Challenged(ChallengeMode::Setup) =
            gate.request_mutating_action(PendingIntent::DeleteEvent(EventId(5)))
        else {
            panic!("expected a setup challenge");
        };

        gate.challenge_mut().unwrap().enter(PinField::Pin, "1234");
        gate.submit(store.service()).await.unwrap();
        gate.challenge_mut().unwrap().enter(PinField::Confirm, "1234");
        let outcome = gate.submit(store.service()).await.unwrap();

        let ChallengeOutcome::Completed {
            resume: Some(PendingIntent::DeleteEvent(id)),
            ..
        } = outcome
        else {
            panic!("expected the delete to resume");
        };
        store.delete(&mut gate, id).await.unwrap();

        assert!(store.events().is_empty());
        assert_eq!(gate.state(), SessionState::Unlocked);
        assert_eq!(store.service().count("delete_event"), 1);
    }

    #[tokio::test]
    async fn projection_sees_reloaded_events() {
        let backend = FakeBackend::with_pin("1234");
        let mut gate = unlocked(&backend).await;
        let mut store = EventStore::new(backend);

        store.create(&mut gate, draft("Late", "09:00", &[0, 2])).await.unwrap();
        store.create(&mut gate, draft("Early", "08:00", &[0])).await.unwrap();

        let tz = chrono_tz::Pacific::Auckland;
        let now = tz.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap();
        let navigator = WeekNavigator::starting_at(now.date_naive());
        let week = store.project(&navigator, &TimeBase::default(), now.with_timezone(&Utc));

        let titles: Vec<&str> = week
            .agenda_for_day(DayIndex::MONDAY)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Early", "Late"]);
        assert_eq!(week.today(), DayIndex::new(2));
    }
}
