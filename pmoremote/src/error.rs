//! Types d'erreurs pour pmoremote

use crate::link::Link;
use crate::name::NameError;
use std::time::Duration;

/// Erreurs du proxy de playlist
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid playlist name: {0}")]
    InvalidName(#[from] NameError),

    #[error("Not a track link: {0}")]
    InvalidTrack(Link),

    #[error("Invalid argument: {0}")]
    Validation(String),

    #[error("Position {position} out of range (length {len})")]
    OutOfRange { position: i64, len: usize },

    #[error("Track at position {position} has moved")]
    Moved { position: usize },

    #[error("Operation rejected: {0}")]
    Operation(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl Error {
    /// Crée une erreur d'argument
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Erreurs détectées localement, avant tout appel à l'autorité
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidName(_) | Error::InvalidTrack(_) | Error::Validation(_)
        )
    }
}

impl From<crate::authority::Rejection> for Error {
    fn from(rejection: crate::authority::Rejection) -> Self {
        Error::Operation(rejection.to_string())
    }
}

impl From<crate::position::OutOfRange> for Error {
    fn from(err: crate::position::OutOfRange) -> Self {
        Error::OutOfRange {
            position: err.requested,
            len: err.len,
        }
    }
}

/// Type Result spécialisé pour pmoremote
pub type Result<T> = std::result::Result<T, Error>;
