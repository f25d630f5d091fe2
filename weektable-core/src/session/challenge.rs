//! The PIN challenge sub-protocol.
//!
//! Setup and change collect the PIN twice (`Input` then `Confirm`) and only
//! commit when both entries match. Verify is a single step.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::session::PendingIntent;

pub const MIN_PIN_LEN: usize = 4;
pub const MAX_PIN_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeMode {
    Setup,
    Verify,
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeStep {
    Input,
    Confirm,
}

/// PIN entry fields shown by a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinField {
    /// The existing PIN, only asked for when changing it.
    Current,
    Pin,
    Confirm,
}

impl PinField {
    pub fn label(self, mode: ChallengeMode) -> &'static str {
        match (self, mode) {
            (PinField::Current, _) => "Current PIN",
            (PinField::Pin, ChallengeMode::Change) => "New PIN",
            (PinField::Pin, _) => "PIN",
            (PinField::Confirm, _) => "Confirm PIN",
        }
    }
}

/// What a submit should do next, decided locally before any service call.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Prepared {
    /// Moved from `Input` to `Confirm`.
    Advanced,
    /// Local validation failed; the message is already on the challenge.
    Invalid(String),
    Setup(String),
    Verify(String),
    Change { current: String, new: String },
}

/// An open PIN challenge together with the intent it is holding back.
#[derive(Debug, Clone)]
pub struct Challenge {
    mode: ChallengeMode,
    step: ChallengeStep,
    current_pin: String,
    pin: String,
    confirm_pin: String,
    error: Option<String>,
    pending: Option<PendingIntent>,
}

impl Challenge {
    pub(crate) fn new(mode: ChallengeMode, pending: Option<PendingIntent>) -> Self {
        Challenge {
            mode,
            step: ChallengeStep::Input,
            current_pin: String::new(),
            pin: String::new(),
            confirm_pin: String::new(),
            error: None,
            pending,
        }
    }

    pub fn mode(&self) -> ChallengeMode {
        self.mode
    }

    pub fn step(&self) -> ChallengeStep {
        self.step
    }

    /// Inline error from the last submit, cleared on the next keystroke.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending(&self) -> Option<&PendingIntent> {
        self.pending.as_ref()
    }

    pub(crate) fn into_pending(self) -> Option<PendingIntent> {
        self.pending
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn title(&self) -> &'static str {
        match (self.mode, self.step) {
            (ChallengeMode::Setup, ChallengeStep::Input) => "Create PIN 🔐",
            (ChallengeMode::Setup, ChallengeStep::Confirm) => "Confirm PIN",
            (ChallengeMode::Verify, _) => "Enter PIN 🔒",
            (ChallengeMode::Change, ChallengeStep::Input) => "Change PIN",
            (ChallengeMode::Change, ChallengeStep::Confirm) => "Confirm New PIN",
        }
    }

    pub fn description(&self) -> &'static str {
        match (self.mode, self.step) {
            (ChallengeMode::Setup, ChallengeStep::Input) => {
                "Create a 4-6 digit PIN to protect your timetable"
            }
            (ChallengeMode::Setup, ChallengeStep::Confirm) => "Enter the same PIN again to confirm",
            (ChallengeMode::Verify, _) => "Enter your PIN to continue",
            (ChallengeMode::Change, ChallengeStep::Input) => "Enter your current PIN and a new PIN",
            (ChallengeMode::Change, ChallengeStep::Confirm) => "Enter your new PIN again to confirm",
        }
    }

    /// Fields to prompt for at the current step, in order.
    pub fn fields(&self) -> &'static [PinField] {
        match (self.mode, self.step) {
            (ChallengeMode::Change, ChallengeStep::Input) => &[PinField::Current, PinField::Pin],
            (ChallengeMode::Change, ChallengeStep::Confirm) => &[PinField::Confirm],
            (ChallengeMode::Setup, ChallengeStep::Confirm) => &[PinField::Confirm],
            (_, ChallengeStep::Input) => &[PinField::Pin],
            (ChallengeMode::Verify, ChallengeStep::Confirm) => &[PinField::Pin],
        }
    }

    pub fn value(&self, field: PinField) -> &str {
        match field {
            PinField::Current => &self.current_pin,
            PinField::Pin => &self.pin,
            PinField::Confirm => &self.confirm_pin,
        }
    }

    /// Replace a field's contents. Non-digits are dropped and the entry is
    /// capped at six digits.
    pub fn enter(&mut self, field: PinField, raw: &str) {
        let digits: String = raw
            .chars()
            .filter(char::is_ascii_digit)
            .take(MAX_PIN_LEN)
            .collect();
        match field {
            PinField::Current => self.current_pin = digits,
            PinField::Pin => self.pin = digits,
            PinField::Confirm => self.confirm_pin = digits,
        }
        self.error = None;
    }

    /// Return from `Confirm` to `Input`, discarding the confirmation.
    pub fn back(&mut self) {
        if self.step == ChallengeStep::Confirm {
            self.step = ChallengeStep::Input;
            self.confirm_pin.clear();
            self.error = None;
        }
    }

    fn invalid(&mut self, error: ValidationError) -> Prepared {
        let message = error.to_string();
        self.error = Some(message.clone());
        Prepared::Invalid(message)
    }

    pub(crate) fn prepare(&mut self) -> Prepared {
        self.error = None;

        match (self.mode, self.step) {
            (ChallengeMode::Verify, _) => {
                if self.pin.len() < MIN_PIN_LEN {
                    return self.invalid(ValidationError::MissingPin);
                }
                Prepared::Verify(self.pin.clone())
            }
            (ChallengeMode::Setup, ChallengeStep::Input) => {
                if self.pin.len() < MIN_PIN_LEN {
                    return self.invalid(ValidationError::PinTooShort { min: MIN_PIN_LEN });
                }
                self.step = ChallengeStep::Confirm;
                self.confirm_pin.clear();
                Prepared::Advanced
            }
            (ChallengeMode::Change, ChallengeStep::Input) => {
                if self.current_pin.len() < MIN_PIN_LEN || self.pin.len() < MIN_PIN_LEN {
                    return self.invalid(ValidationError::PinTooShort { min: MIN_PIN_LEN });
                }
                self.step = ChallengeStep::Confirm;
                self.confirm_pin.clear();
                Prepared::Advanced
            }
            (mode, ChallengeStep::Confirm) => {
                if self.pin.as_bytes() != self.confirm_pin.as_bytes() {
                    // Only the confirmation is re-entered
                    self.confirm_pin.clear();
                    return self.invalid(if mode == ChallengeMode::Change {
                        ValidationError::NewPinMismatch
                    } else {
                        ValidationError::PinMismatch
                    });
                }
                if mode == ChallengeMode::Setup {
                    Prepared::Setup(self.pin.clone())
                } else {
                    Prepared::Change {
                        current: self.current_pin.clone(),
                        new: self.pin.clone(),
                    }
                }
            }
        }
    }

    /// The service refused the PIN (or failed). Clear what the user has to
    /// type again and show `message` inline.
    pub(crate) fn reject(&mut self, message: String) {
        match self.mode {
            ChallengeMode::Verify => self.pin.clear(),
            ChallengeMode::Change => {
                self.step = ChallengeStep::Input;
                self.current_pin.clear();
                self.pin.clear();
                self.confirm_pin.clear();
            }
            ChallengeMode::Setup => {}
        }
        self.error = Some(message);
    }
}
