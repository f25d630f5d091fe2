//! REST protocol types.
//!
//! Each endpoint of the persistence/credential service is a request type
//! that knows its method, path and response type. Request bodies are the
//! serde form of the type itself.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{Event, EventDraft, EventId, EventPatch};
use crate::settings::{Settings, SettingsPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

pub trait Endpoint: Serialize {
    type Response: DeserializeOwned;
    const METHOD: Method;

    /// A 401 from this endpoint means a wrong PIN rather than a bad token.
    const CHECKS_PIN: bool = false;

    fn path(&self) -> String;

    fn has_body() -> bool {
        matches!(Self::METHOD, Method::Post | Method::Put)
    }
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ListEvents;

impl Endpoint for ListEvents {
    type Response = Vec<Event>;
    const METHOD: Method = Method::Get;
    fn path(&self) -> String {
        "/api/events".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct CreateEvent<'a>(pub &'a EventDraft);

impl Endpoint for CreateEvent<'_> {
    type Response = Event;
    const METHOD: Method = Method::Post;
    fn path(&self) -> String {
        "/api/events".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateEvent<'a> {
    #[serde(skip)]
    pub id: EventId,
    #[serde(flatten)]
    pub patch: &'a EventPatch,
}

impl Endpoint for UpdateEvent<'_> {
    type Response = Event;
    const METHOD: Method = Method::Put;
    fn path(&self) -> String {
        format!("/api/events/{}", self.id)
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteEvent {
    #[serde(skip)]
    pub id: EventId,
}

impl Endpoint for DeleteEvent {
    type Response = ();
    const METHOD: Method = Method::Delete;
    fn path(&self) -> String {
        format!("/api/events/{}", self.id)
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GetSettings;

impl Endpoint for GetSettings {
    type Response = Settings;
    const METHOD: Method = Method::Get;
    fn path(&self) -> String {
        "/api/settings".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateSettings<'a>(pub &'a SettingsPatch);

impl Endpoint for UpdateSettings<'_> {
    type Response = Settings;
    const METHOD: Method = Method::Put;
    fn path(&self) -> String {
        "/api/settings".to_string()
    }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub pin_is_set: bool,
}

#[derive(Debug, Serialize)]
pub struct GetAuthStatus;

impl Endpoint for GetAuthStatus {
    type Response = AuthStatus;
    const METHOD: Method = Method::Get;
    fn path(&self) -> String {
        "/api/auth/status".to_string()
    }
}

/// Plain acknowledgement, e.g. `{"message": "PIN set successfully"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SetupPin<'a> {
    pub pin: &'a str,
}

impl Endpoint for SetupPin<'_> {
    type Response = Message;
    const METHOD: Method = Method::Post;
    fn path(&self) -> String {
        "/api/auth/setup".to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyPin<'a> {
    pub pin: &'a str,
}

impl Endpoint for VerifyPin<'_> {
    type Response = TokenResponse;
    const METHOD: Method = Method::Post;
    const CHECKS_PIN: bool = true;
    fn path(&self) -> String {
        "/api/auth/verify".to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct ChangePin<'a> {
    pub old_pin: &'a str,
    pub new_pin: &'a str,
}

impl Endpoint for ChangePin<'_> {
    type Response = Message;
    const METHOD: Method = Method::Post;
    const CHECKS_PIN: bool = true;
    fn path(&self) -> String {
        "/api/auth/change".to_string()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error body returned by the service. `detail` is usually a string but
/// validation failures carry a structured object.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub fn message(&self, status: u16) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => format!("HTTP error! status: {}", status),
            other => other.to_string(),
        }
    }
}
