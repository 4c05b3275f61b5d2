//! Voucher service error types.

use tallybook_shared::error::{AppError, FieldError, join_field_errors};
use tallybook_shared::types::VoucherId;
use thiserror::Error;

use crate::directory::DirectoryError;
use crate::ledger::LedgerError;
use crate::numbering::NumberingError;
use crate::workflow::{VoucherAction, WorkflowError};

/// Errors returned by voucher operations.
#[derive(Debug, Clone, Error)]
pub enum VoucherError {
    /// One or more input fields are invalid. Nothing was written.
    #[error("Validation error: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name (e.g. `bank account`).
        entity: &'static str,
        /// Identifier that failed to resolve.
        id: String,
    },

    /// A unique field collides with an existing voucher.
    #[error("Duplicate {field}: {value}")]
    Conflict {
        /// The colliding field.
        field: &'static str,
        /// The colliding value.
        value: String,
    },

    /// The action is not allowed in the current status.
    #[error("Cannot {action} voucher in status '{status}'")]
    State {
        /// Current status name.
        status: String,
        /// Attempted action.
        action: VoucherAction,
    },

    /// Missing configuration (e.g. no prefix for a voucher kind).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The voucher changed between read and write.
    #[error("Voucher {id} was modified concurrently")]
    ConcurrentModification {
        /// The contended voucher.
        id: VoucherId,
    },

    /// Unexpected failure in a collaborator.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VoucherError {
    /// Creates a validation error for a single field.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(field: &'static str, value: impl Into<String>) -> Self {
        Self::Conflict {
            field,
            value: value.into(),
        }
    }

    /// Creates a state error.
    #[must_use]
    pub fn state(status: impl std::fmt::Display, action: VoucherAction) -> Self {
        Self::State {
            status: status.to_string(),
            action,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } | Self::ConcurrentModification { .. } => 409,
            Self::State { .. } => 422,
            Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::State { .. } => "INVALID_STATE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<WorkflowError> for VoucherError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidTransition { status, action } => Self::State { status, action },
        }
    }
}

impl From<LedgerError> for VoucherError {
    fn from(err: LedgerError) -> Self {
        Self::Validation(err.field_errors())
    }
}

impl From<NumberingError> for VoucherError {
    fn from(err: NumberingError) -> Self {
        match err {
            NumberingError::MissingPrefix(_) => Self::Configuration(err.to_string()),
            NumberingError::Counter(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<DirectoryError> for VoucherError {
    fn from(err: DirectoryError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<VoucherError> for AppError {
    fn from(err: VoucherError) -> Self {
        match err {
            VoucherError::Validation(errors) => Self::Validation(errors),
            VoucherError::NotFound { .. } => Self::NotFound(err.to_string()),
            VoucherError::Conflict { .. } | VoucherError::ConcurrentModification { .. } => {
                Self::Conflict(err.to_string())
            }
            VoucherError::State { .. } => Self::State(err.to_string()),
            VoucherError::Configuration(msg) => Self::Configuration(msg),
            VoucherError::Internal(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbering::EntityKind;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_codes() {
        assert_eq!(VoucherError::invalid("amount", "must be positive").status_code(), 400);
        assert_eq!(VoucherError::not_found("bank account", "x").status_code(), 404);
        assert_eq!(VoucherError::conflict("voucher_number", "JV-1").status_code(), 409);
        assert_eq!(VoucherError::state("posted", VoucherAction::Update).status_code(), 422);
        assert_eq!(VoucherError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_workflow_error_becomes_state() {
        let err: VoucherError = WorkflowError::invalid("completed", VoucherAction::Cancel).into();
        assert_eq!(err.error_code(), "INVALID_STATE");
        assert_eq!(err.to_string(), "Cannot cancel voucher in status 'completed'");
    }

    #[test]
    fn test_unbalanced_becomes_validation() {
        let err: VoucherError = LedgerError::Unbalanced {
            debit: dec!(5000),
            credit: dec!(4000),
        }
        .into();
        let message = err.to_string();
        assert!(message.contains("5000"));
        assert!(message.contains("4000"));
    }

    #[test]
    fn test_missing_prefix_is_configuration() {
        let err: VoucherError = NumberingError::MissingPrefix(EntityKind::Journal).into();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = VoucherError::conflict("transaction_id", "TXN-1").into();
        assert_eq!(app.status_code(), 409);
        assert!(app.to_string().contains("transaction_id"));

        let app: AppError = VoucherError::invalid("entries", "at least 2 entries").into();
        assert_eq!(app.field_errors().len(), 1);
    }
}
