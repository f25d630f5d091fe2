//! Error types for weektable.

use thiserror::Error;

/// Field-level validation failures. These are resolved locally and never
/// reach a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a title")]
    MissingTitle,

    #[error("Title must be at most {max} characters")]
    TitleTooLong { max: usize },

    #[error("Description must be at most {max} characters")]
    DescriptionTooLong { max: usize },

    #[error("Invalid time '{0}'. Expected HH:MM (24-hour)")]
    InvalidTime(String),

    #[error("Please select at least one day")]
    NoDays,

    #[error("Invalid day index {0}. Expected 0 (Monday) to 6 (Sunday)")]
    InvalidDay(i64),

    #[error("Please enter your PIN")]
    MissingPin,

    #[error("PIN must be at least {min} digits")]
    PinTooShort { min: usize },

    #[error("PINs do not match. Please try again.")]
    PinMismatch,

    #[error("New PINs do not match. Please try again.")]
    NewPinMismatch,
}

/// Errors that can occur in weektable operations.
#[derive(Error, Debug)]
pub enum TimetableError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Wrong PIN on verify or change.
    #[error("{0}")]
    InvalidPin(String),

    /// The held credential was rejected (missing, expired or forged).
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Transport or server failure, already reduced to one readable message.
    #[error("{0}")]
    Remote(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session is locked")]
    Locked,

    #[error("No PIN challenge is open")]
    NoChallenge,

    #[error("A PIN is required before the timetable can be used")]
    ChallengeRequired,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TimetableError {
    /// Credential errors keep a challenge open; everything else abandons the
    /// attempt.
    pub fn is_credential_error(&self) -> bool {
        matches!(self, TimetableError::InvalidPin(_) | TimetableError::Validation(_))
    }
}

/// Result type alias for weektable operations.
pub type TimetableResult<T> = Result<T, TimetableError>;
