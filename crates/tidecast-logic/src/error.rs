//! Errors surfaced by the fishing protocol.

use thiserror::Error;

use crate::generator::GenerateError;

/// Coarse error class, for adapters that map errors onto transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad deployment data; never the player's fault and not retryable.
    Configuration,
    /// No live session matches; the client should return to idle.
    Session,
    /// The call itself was implausible and has been rejected.
    Validation,
}

#[derive(Debug, Error)]
pub enum FishingError {
    #[error(transparent)]
    Config(#[from] GenerateError),
    #[error("no fishing session found")]
    NoSession,
    #[error("catch window expired")]
    WindowExpired,
    #[error("catch arrived before the bite")]
    TooEarly,
    #[error("session {given} is stale; the current session is {current}")]
    SessionMismatch { given: u64, current: u64 },
    #[error("angler is not registered")]
    UnknownAngler,
    #[error("stored session is unreadable: {0}")]
    Corrupt(String),
}

impl FishingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FishingError::Config(_) | FishingError::Corrupt(_) => ErrorKind::Configuration,
            FishingError::NoSession
            | FishingError::WindowExpired
            | FishingError::SessionMismatch { .. }
            | FishingError::UnknownAngler => ErrorKind::Session,
            FishingError::TooEarly => ErrorKind::Validation,
        }
    }
}

impl From<serde_json::Error> for FishingError {
    fn from(err: serde_json::Error) -> Self {
        FishingError::Corrupt(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            FishingError::from(GenerateError::EmptyZone("Moon".into())).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(FishingError::NoSession.kind(), ErrorKind::Session);
        assert_eq!(FishingError::WindowExpired.kind(), ErrorKind::Session);
        assert_eq!(FishingError::TooEarly.kind(), ErrorKind::Validation);
    }

    #[test]
    fn messages_are_player_readable() {
        assert_eq!(FishingError::WindowExpired.to_string(), "catch window expired");
        assert_eq!(
            FishingError::from(GenerateError::EmptyZone("Moon".into())).to_string(),
            "zone \"Moon\" has no catalog entries"
        );
        assert_eq!(
            FishingError::SessionMismatch {
                given: 3,
                current: 4
            }
            .to_string(),
            "session 3 is stale; the current session is 4"
        );
    }
}
