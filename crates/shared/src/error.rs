//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// A single problem with one input field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field (e.g. `entries[1].debit`).
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Joins field errors into a single `; `-separated message.
#[must_use]
pub fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error with per-field problems.
    #[error("Validation error: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Illegal state transition or edit on a finalized record.
    #[error("Invalid state: {0}")]
    State(String),

    /// Conflict (e.g., duplicate voucher number).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or inconsistent configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// External service error.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::State(_) => 422,
            Self::Conflict(_) => 409,
            Self::Configuration(_)
            | Self::Storage(_)
            | Self::ExternalService(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::State(_) => "INVALID_STATE",
            Self::Conflict(_) => "CONFLICT",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for errors whose details must not reach clients in production.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }

    /// Returns the message safe to show to a client.
    ///
    /// Internal errors are replaced by a generic message unless
    /// `expose_internal` is set (development mode).
    #[must_use]
    pub fn client_message(&self, expose_internal: bool) -> String {
        if self.is_internal() && !expose_internal {
            "An unexpected error occurred".to_string()
        } else {
            self.to_string()
        }
    }

    /// Returns the per-field problems of a validation error.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Validation(vec![]).status_code(), 400);
        assert_eq!(AppError::State(String::new()).status_code(), 422);
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::Configuration(String::new()).status_code(), 500);
        assert_eq!(AppError::Storage(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::Validation(vec![]).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(AppError::State(String::new()).error_code(), "INVALID_STATE");
        assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
        assert_eq!(
            AppError::Configuration(String::new()).error_code(),
            "CONFIGURATION_ERROR"
        );
    }

    #[test]
    fn test_validation_display_joins_fields() {
        let err = AppError::Validation(vec![
            FieldError::new("amount", "must be positive"),
            FieldError::new("payee", "is required"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation error: amount: must be positive; payee: is required"
        );
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_client_message_hides_internal_details() {
        let err = AppError::Internal("lock poisoned at store.rs:42".into());
        assert_eq!(err.client_message(false), "An unexpected error occurred");
        assert!(err.client_message(true).contains("store.rs"));

        let err = AppError::Conflict("voucher_number CPV-250101-0001".into());
        assert!(err.client_message(false).contains("CPV-250101-0001"));
    }
}
