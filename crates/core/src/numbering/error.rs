//! Identifier generation errors.

use thiserror::Error;

use super::prefix::EntityKind;

/// Errors that can occur while generating identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberingError {
    /// No prefix is configured for the entity kind.
    #[error("No numbering prefix configured for {0}")]
    MissingPrefix(EntityKind),

    /// The counter store failed.
    #[error("Counter store error: {0}")]
    Counter(String),
}

impl NumberingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingPrefix(_) => "CONFIGURATION_ERROR",
            Self::Counter(_) => "COUNTER_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        500
    }
}
