//! Collaborator contracts for the persistence and credential service.
//!
//! The core never talks to the network directly; it goes through these two
//! traits. `HttpBackend` is the production implementation.

pub mod http;
pub mod protocol;

use async_trait::async_trait;

use crate::error::TimetableResult;
use crate::event::{Event, EventDraft, EventId, EventPatch};
use crate::session::Credential;
use crate::settings::{Settings, SettingsPatch};

pub use http::HttpBackend;
pub use protocol::AuthStatus;

/// Event and settings persistence. Reads are public, writes carry the
/// session's bearer credential.
#[async_trait]
pub trait EventService: Send + Sync {
    async fn list_events(&self) -> TimetableResult<Vec<Event>>;

    async fn create_event(
        &self,
        credential: &Credential,
        draft: &EventDraft,
    ) -> TimetableResult<Event>;

    async fn update_event(
        &self,
        credential: &Credential,
        id: EventId,
        patch: &EventPatch,
    ) -> TimetableResult<Event>;

    async fn delete_event(&self, credential: &Credential, id: EventId) -> TimetableResult<()>;

    async fn get_settings(&self) -> TimetableResult<Settings>;

    async fn update_settings(
        &self,
        credential: &Credential,
        patch: &SettingsPatch,
    ) -> TimetableResult<Settings>;
}

/// PIN setup, verification and change.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn auth_status(&self) -> TimetableResult<AuthStatus>;

    async fn setup_pin(&self, pin: &str) -> TimetableResult<()>;

    /// Exchange a PIN for a bearer credential.
    async fn verify_pin(&self, pin: &str) -> TimetableResult<Credential>;

    async fn change_pin(&self, old_pin: &str, new_pin: &str) -> TimetableResult<()>;
}
