//! Session gate: who may mutate the timetable.
//!
//! Every mutating intent goes through [`SessionGate::request_mutating_action`].
//! With a live credential it proceeds immediately; otherwise the intent is
//! parked on a PIN [`Challenge`] and handed back once the challenge succeeds.

pub mod challenge;
pub mod credential;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TimetableError, TimetableResult};
use crate::event::EventId;
use crate::remote::AuthService;

pub use challenge::{Challenge, ChallengeMode, ChallengeStep, MAX_PIN_LEN, MIN_PIN_LEN, PinField};
pub use credential::{Credential, CredentialStore};

use challenge::Prepared;

/// A mutating action waiting on the session. Resolved by the caller's
/// dispatch table once the gate lets it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "id", rename_all = "snake_case")]
pub enum PendingIntent {
    AddEvent,
    EditEvent(EventId),
    DeleteEvent(EventId),
    OpenSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Locked,
    Unlocked,
    Challenging(ChallengeMode),
}

/// Result of asking the gate for permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Credential present; run the intent now.
    Proceed(PendingIntent),
    /// A challenge is open and holds the intent.
    Challenged(ChallengeMode),
}

/// Result of one challenge submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Moved on to the confirmation step.
    Advanced,
    /// Still challenging; the message is shown inline.
    Rejected(String),
    /// Challenge closed and the session is unlocked. `resume` is the parked
    /// intent, handed out exactly once.
    Completed {
        mode: ChallengeMode,
        resume: Option<PendingIntent>,
    },
}

/// Explicitly owned session context. Created at startup, torn down by
/// [`SessionGate::lock`].
#[derive(Debug)]
pub struct SessionGate {
    pin_configured: bool,
    credential: Option<Credential>,
    challenge: Option<Challenge>,
    store: Option<CredentialStore>,
}

impl SessionGate {
    pub fn new(pin_configured: bool) -> Self {
        SessionGate {
            pin_configured,
            credential: None,
            challenge: None,
            store: None,
        }
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Build the gate at startup: ask the service whether a PIN exists and
    /// pick up a previously saved credential if it is still valid.
    pub async fn start<A>(auth: &A, store: Option<CredentialStore>) -> TimetableResult<Self>
    where
        A: AuthService + ?Sized,
    {
        let status = auth.auth_status().await?;
        let mut gate = SessionGate::new(status.pin_is_set);

        if let Some(store) = store {
            let saved = store.load()?;
            gate.store = Some(store);

            match saved {
                Some(credential) if status.pin_is_set && credential.is_valid_at(Utc::now()) => {
                    tracing::debug!("restored saved credential");
                    gate.credential = Some(credential);
                }
                Some(_) => {
                    tracing::debug!("discarding stale credential");
                    gate.forget_saved();
                }
                None => {}
            }
        }

        Ok(gate)
    }

    pub fn pin_configured(&self) -> bool {
        self.pin_configured
    }

    pub fn credential_present(&self) -> bool {
        self.credential_present_at(Utc::now())
    }

    pub fn credential_present_at(&self, now: DateTime<Utc>) -> bool {
        self.credential
            .as_ref()
            .is_some_and(|credential| credential.is_valid_at(now))
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// The credential to attach to a mutating call, or `Locked`.
    pub fn authorize(&self) -> TimetableResult<&Credential> {
        match &self.credential {
            Some(credential) if credential.is_valid_at(Utc::now()) => Ok(credential),
            _ => Err(TimetableError::Locked),
        }
    }

    pub fn state(&self) -> SessionState {
        if let Some(challenge) = &self.challenge {
            SessionState::Challenging(challenge.mode())
        } else if self.credential_present() {
            SessionState::Unlocked
        } else {
            SessionState::Locked
        }
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    pub fn challenge_mut(&mut self) -> Option<&mut Challenge> {
        self.challenge.as_mut()
    }

    /// Gate a mutating intent. Opening a challenge replaces any challenge
    /// that was already open, along with its parked intent.
    pub fn request_mutating_action(&mut self, intent: PendingIntent) -> GateDecision {
        let mode = if !self.pin_configured {
            ChallengeMode::Setup
        } else if self.credential_present() {
            return GateDecision::Proceed(intent);
        } else {
            ChallengeMode::Verify
        };

        tracing::info!(?mode, ?intent, "opening PIN challenge");
        self.challenge = Some(Challenge::new(mode, Some(intent)));
        GateDecision::Challenged(mode)
    }

    /// Open a change challenge. Only an unlocked session may change its PIN.
    pub fn request_pin_change(&mut self) -> TimetableResult<()> {
        if !self.credential_present() {
            return Err(TimetableError::Locked);
        }
        tracing::info!("opening PIN change challenge");
        self.challenge = Some(Challenge::new(ChallengeMode::Change, None));
        Ok(())
    }

    /// Submit the open challenge's current step.
    pub async fn submit<A>(&mut self, auth: &A) -> TimetableResult<ChallengeOutcome>
    where
        A: AuthService + ?Sized,
    {
        let challenge = self.challenge.as_mut().ok_or(TimetableError::NoChallenge)?;

        match challenge.prepare() {
            Prepared::Advanced => Ok(ChallengeOutcome::Advanced),
            Prepared::Invalid(message) => Ok(ChallengeOutcome::Rejected(message)),
            Prepared::Verify(pin) => match auth.verify_pin(&pin).await {
                Ok(credential) => {
                    self.accept(credential);
                    Ok(self.complete())
                }
                Err(e) => Ok(self.fail(e)),
            },
            Prepared::Setup(pin) => self.finish_setup(auth, &pin).await,
            Prepared::Change { current, new } => match auth.change_pin(&current, &new).await {
                Ok(()) => Ok(self.complete()),
                Err(e) => Ok(self.fail(e)),
            },
        }
    }

    async fn finish_setup<A>(&mut self, auth: &A, pin: &str) -> TimetableResult<ChallengeOutcome>
    where
        A: AuthService + ?Sized,
    {
        if let Err(e) = auth.setup_pin(pin).await {
            // Another client may have set a PIN since startup.
            if let Ok(status) = auth.auth_status().await
                && status.pin_is_set
            {
                let message = "A PIN is already set. Enter it to continue".to_string();
                self.pin_configured = true;
                self.switch_to_verify(message.clone());
                return Ok(ChallengeOutcome::Rejected(message));
            }
            return Ok(self.fail(e));
        }
        self.pin_configured = true;

        // Setup establishes trust; exchange the new PIN for a real credential.
        match auth.verify_pin(pin).await {
            Ok(credential) => {
                self.accept(credential);
                Ok(self.complete())
            }
            Err(e) => {
                tracing::warn!(error = %e, "PIN created but verify failed");
                let message = format!("PIN created. Enter it to continue ({e})");
                self.switch_to_verify(message.clone());
                Ok(ChallengeOutcome::Rejected(message))
            }
        }
    }

    /// Replace the open challenge with a verify challenge holding the same
    /// intent.
    fn switch_to_verify(&mut self, message: String) {
        let pending = self.challenge.take().and_then(Challenge::into_pending);
        let mut verify = Challenge::new(ChallengeMode::Verify, pending);
        verify.set_error(message);
        self.challenge = Some(verify);
    }

    fn accept(&mut self, credential: Credential) {
        if let Some(store) = &self.store
            && let Err(e) = store.save(&credential)
        {
            tracing::warn!(error = %e, "could not persist credential");
        }
        self.credential = Some(credential);
    }

    fn complete(&mut self) -> ChallengeOutcome {
        let Some(challenge) = self.challenge.take() else {
            return ChallengeOutcome::Rejected(TimetableError::NoChallenge.to_string());
        };
        let mode = challenge.mode();
        let resume = challenge.into_pending();
        tracing::info!(?mode, ?resume, "PIN challenge completed");
        ChallengeOutcome::Completed { mode, resume }
    }

    /// Wrong PINs clear the entry; service failures keep it so the user can
    /// simply retry.
    fn fail(&mut self, error: TimetableError) -> ChallengeOutcome {
        let message = error.to_string();
        if let Some(challenge) = self.challenge.as_mut() {
            if error.is_credential_error() {
                tracing::debug!(mode = ?challenge.mode(), "PIN rejected");
                challenge.reject(message.clone());
            } else {
                tracing::warn!(error = %error, "PIN challenge failed");
                challenge.set_error(message.clone());
            }
        }
        ChallengeOutcome::Rejected(message)
    }

    /// Close the open challenge without success, discarding its parked
    /// intent. A first-time setup cannot be dismissed.
    pub fn dismiss(&mut self) -> TimetableResult<()> {
        let Some(challenge) = &self.challenge else {
            return Err(TimetableError::NoChallenge);
        };
        if challenge.mode() == ChallengeMode::Setup && !self.pin_configured {
            return Err(TimetableError::ChallengeRequired);
        }
        tracing::debug!(mode = ?challenge.mode(), "PIN challenge dismissed");
        self.challenge = None;
        Ok(())
    }

    /// Explicit logout. Drops the credential and any open challenge.
    pub fn lock(&mut self) -> TimetableResult<()> {
        self.credential = None;
        self.challenge = None;
        tracing::info!("session locked");
        if let Some(store) = &self.store {
            store.clear()?;
        }
        Ok(())
    }

    /// The service rejected our credential; forget it so the next mutating
    /// intent challenges again.
    pub fn invalidate_credential(&mut self) {
        if self.credential.take().is_some() {
            tracing::warn!("credential rejected by server, locking session");
        }
        self.forget_saved();
    }

    fn forget_saved(&self) {
        if let Some(store) = &self.store
            && let Err(e) = store.clear()
        {
            tracing::warn!(error = %e, "could not remove saved credential");
        }
    }
}
