//! HTTP client for the timetable service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::error::{TimetableError, TimetableResult};
use crate::event::{Event, EventDraft, EventId, EventPatch};
use crate::remote::protocol::{
    AuthStatus, ChangePin, CreateEvent, DeleteEvent, Endpoint, ErrorBody, GetAuthStatus,
    GetSettings, ListEvents, Method, SetupPin, UpdateEvent, UpdateSettings, VerifyPin,
};
use crate::remote::{AuthService, EventService};
use crate::session::Credential;
use crate::settings::{Settings, SettingsPatch};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// REST implementation of both collaborator traits.
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> TimetableResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> TimetableResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TimetableError::Config(format!("Invalid server URL '{}': {}", base_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TimetableError::Config(format!("Could not build HTTP client: {}", e)))?;

        Ok(HttpBackend { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> TimetableResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TimetableError::Config(format!("Invalid endpoint path '{}': {}", path, e)))
    }

    /// Send one request and decode its response.
    pub async fn call<E: Endpoint + Sync>(
        &self,
        endpoint: &E,
        credential: Option<&Credential>,
    ) -> TimetableResult<E::Response> {
        let url = self.url_for(&endpoint.path())?;

        let mut request = match E::METHOD {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Put => self.http.put(url),
            Method::Delete => self.http.delete(url),
        };
        if let Some(credential) = credential {
            request = request.bearer_auth(credential.token());
        }
        if E::has_body() {
            request = request.json(endpoint);
        }

        let resp = request.send().await.map_err(|e| {
            tracing::warn!(path = %endpoint.path(), error = %e, "request failed");
            TimetableError::Remote(format!("Failed to connect to server: {}", e))
        })?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| TimetableError::Remote(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.message(status.as_u16()))
                .unwrap_or_else(|_| format!("HTTP error! status: {}", status.as_u16()));
            tracing::debug!(path = %endpoint.path(), status = status.as_u16(), %message, "service error");
            return Err(classify(status, message, E::CHECKS_PIN));
        }

        // 204 No Content and other empty bodies decode as JSON null
        let body: &[u8] = if status == StatusCode::NO_CONTENT || body.is_empty() {
            b"null"
        } else {
            &body
        };
        serde_json::from_slice(body)
            .map_err(|e| TimetableError::Serialization(format!("Unexpected response: {}", e)))
    }
}

fn classify(status: StatusCode, message: String, checks_pin: bool) -> TimetableError {
    match status {
        StatusCode::UNAUTHORIZED if checks_pin => TimetableError::InvalidPin(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TimetableError::Unauthorized(message),
        StatusCode::NOT_FOUND => TimetableError::NotFound(message),
        _ => TimetableError::Remote(message),
    }
}

#[async_trait]
impl EventService for HttpBackend {
    async fn list_events(&self) -> TimetableResult<Vec<Event>> {
        self.call(&ListEvents, None).await
    }

    async fn create_event(
        &self,
        credential: &Credential,
        draft: &EventDraft,
    ) -> TimetableResult<Event> {
        self.call(&CreateEvent(draft), Some(credential)).await
    }

    async fn update_event(
        &self,
        credential: &Credential,
        id: EventId,
        patch: &EventPatch,
    ) -> TimetableResult<Event> {
        self.call(&UpdateEvent { id, patch }, Some(credential)).await
    }

    async fn delete_event(&self, credential: &Credential, id: EventId) -> TimetableResult<()> {
        self.call(&DeleteEvent { id }, Some(credential)).await
    }

    async fn get_settings(&self) -> TimetableResult<Settings> {
        self.call(&GetSettings, None).await
    }

    async fn update_settings(
        &self,
        credential: &Credential,
        patch: &SettingsPatch,
    ) -> TimetableResult<Settings> {
        self.call(&UpdateSettings(patch), Some(credential)).await
    }
}

#[async_trait]
impl AuthService for HttpBackend {
    async fn auth_status(&self) -> TimetableResult<AuthStatus> {
        self.call(&GetAuthStatus, None).await
    }

    async fn setup_pin(&self, pin: &str) -> TimetableResult<()> {
        self.call(&SetupPin { pin }, None).await.map(|_| ())
    }

    async fn verify_pin(&self, pin: &str) -> TimetableResult<Credential> {
        let token = self.call(&VerifyPin { pin }, None).await?;
        Ok(Credential::new(token.access_token))
    }

    async fn change_pin(&self, old_pin: &str, new_pin: &str) -> TimetableResult<()> {
        self.call(&ChangePin { old_pin, new_pin }, None)
            .await
            .map(|_| ())
    }
}
