//! In-memory collaborator used by the session and store tests.

use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{TimetableError, TimetableResult};
use crate::event::{Event, EventDraft, EventId, EventPatch, TimeOfDay};
use crate::remote::{AuthService, AuthStatus, EventService};
use crate::session::Credential;
use crate::settings::{Settings, SettingsPatch};
use crate::time_base::DayIndex;

/// An unsigned JWT whose `exp` claim is `exp`.
pub fn jwt_expiring_at(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"user","exp":{exp}}}"#));
    format!("{header}.{payload}.signature")
}

/// A stored event with default presentation tags.
pub fn event(id: i64, title: &str, start: &str, days: &[u8]) -> Event {
    Event {
        id: EventId(id),
        title: title.to_string(),
        description: None,
        start_time: TimeOfDay::parse(start).unwrap(),
        end_time: None,
        days: days.iter().map(|d| DayIndex::new(*d).unwrap()).collect(),
        color: "#3B82F6".to_string(),
        icon: "📚".to_string(),
        created_at: None,
        updated_at: None,
    }
}

#[derive(Default)]
struct FakeState {
    pin: Option<String>,
    events: Vec<Event>,
    next_id: i64,
    settings: Settings,
    tokens: Vec<String>,
    calls: Vec<String>,
    fail_next: Option<String>,
    fail_on: Option<(String, String)>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        FakeBackend::default()
    }

    pub fn with_pin(pin: &str) -> Self {
        let backend = FakeBackend::new();
        {
            let mut state = backend.state.lock().unwrap();
            state.pin = Some(pin.to_string());
            state.settings.pin_is_set = true;
        }
        backend
    }

    pub fn with_events(self, events: Vec<Event>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id = events.iter().map(|e| e.id.0).max().unwrap_or(0);
            state.events = events;
        }
        self
    }

    /// Make the next collaborator call fail with a transport error.
    pub fn fail_next(&self, message: &str) {
        self.state.lock().unwrap().fail_next = Some(message.to_string());
    }

    /// Make the next `call` fail with a transport error.
    pub fn fail_on(&self, call: &str, message: &str) {
        self.state.lock().unwrap().fail_on = Some((call.to_string(), message.to_string()));
    }

    /// Invalidate every token issued so far.
    pub fn revoke_tokens(&self) {
        self.state.lock().unwrap().tokens.clear();
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.as_str() == call)
            .count()
    }

    /// Stored events, bypassing the call log.
    pub fn stored(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    fn enter(&self, call: &str) -> TimetableResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        let mut failure = state.fail_next.take();
        if failure.is_none() && state.fail_on.as_ref().is_some_and(|(c, _)| c == call) {
            failure = state.fail_on.take().map(|(_, message)| message);
        }
        match failure {
            Some(message) => Err(TimetableError::Remote(message)),
            None => Ok(state),
        }
    }

    fn enter_authorized(
        &self,
        call: &str,
        credential: &Credential,
    ) -> TimetableResult<std::sync::MutexGuard<'_, FakeState>> {
        let state = self.enter(call)?;
        if !state.tokens.iter().any(|t| t == credential.token()) {
            return Err(TimetableError::Unauthorized(
                "Could not validate credentials".to_string(),
            ));
        }
        Ok(state)
    }
}

#[async_trait]
impl EventService for FakeBackend {
    async fn list_events(&self) -> TimetableResult<Vec<Event>> {
        let state = self.enter("list_events")?;
        Ok(state.events.clone())
    }

    async fn create_event(
        &self,
        credential: &Credential,
        draft: &EventDraft,
    ) -> TimetableResult<Event> {
        let mut state = self.enter_authorized("create_event", credential)?;
        state.next_id += 1;
        let event = Event {
            id: EventId(state.next_id),
            title: draft.title.clone(),
            description: draft.description.clone(),
            start_time: draft.start_time.clone(),
            end_time: draft.end_time.clone(),
            days: draft.days,
            color: draft.color.clone(),
            icon: draft.icon.clone(),
            created_at: None,
            updated_at: None,
        };
        state.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(
        &self,
        credential: &Credential,
        id: EventId,
        patch: &EventPatch,
    ) -> TimetableResult<Event> {
        let mut state = self.enter_authorized("update_event", credential)?;
        let event = state
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| TimetableError::NotFound("Event not found".to_string()))?;
        patch.apply_to(event);
        Ok(event.clone())
    }

    async fn delete_event(&self, credential: &Credential, id: EventId) -> TimetableResult<()> {
        let mut state = self.enter_authorized("delete_event", credential)?;
        let before = state.events.len();
        state.events.retain(|e| e.id != id);
        if state.events.len() == before {
            return Err(TimetableError::NotFound("Event not found".to_string()));
        }
        Ok(())
    }

    async fn get_settings(&self) -> TimetableResult<Settings> {
        let state = self.enter("get_settings")?;
        Ok(state.settings.clone())
    }

    async fn update_settings(
        &self,
        credential: &Credential,
        patch: &SettingsPatch,
    ) -> TimetableResult<Settings> {
        let mut state = self.enter_authorized("update_settings", credential)?;
        patch.apply_to(&mut state.settings);
        Ok(state.settings.clone())
    }
}

#[async_trait]
impl AuthService for FakeBackend {
    async fn auth_status(&self) -> TimetableResult<AuthStatus> {
        let state = self.enter("auth_status")?;
        Ok(AuthStatus {
            pin_is_set: state.pin.is_some(),
        })
    }

    async fn setup_pin(&self, pin: &str) -> TimetableResult<()> {
        let mut state = self.enter("setup_pin")?;
        if state.pin.is_some() {
            return Err(TimetableError::Remote(
                "PIN already set. Use change PIN endpoint.".to_string(),
            ));
        }
        state.pin = Some(pin.to_string());
        state.settings.pin_is_set = true;
        Ok(())
    }

    async fn verify_pin(&self, pin: &str) -> TimetableResult<Credential> {
        let mut state = self.enter("verify_pin")?;
        if state.pin.as_deref() != Some(pin) {
            return Err(TimetableError::InvalidPin("Invalid PIN".to_string()));
        }
        let token = format!("fake-token-{}", state.tokens.len() + 1);
        state.tokens.push(token.clone());
        Ok(Credential::new(token))
    }

    async fn change_pin(&self, old_pin: &str, new_pin: &str) -> TimetableResult<()> {
        let mut state = self.enter("change_pin")?;
        if state.pin.as_deref() != Some(old_pin) {
            return Err(TimetableError::InvalidPin(
                "Current PIN is incorrect".to_string(),
            ));
        }
        state.pin = Some(new_pin.to_string());
        Ok(())
    }
}
