//! Workflow error types for voucher lifecycle management.

use thiserror::Error;

use crate::workflow::types::VoucherAction;

/// Errors that can occur during workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The action is not allowed from the current status.
    ///
    /// The status is carried as its lowercase name so the error is
    /// independent of the voucher variant.
    #[error("Cannot {action} voucher in status '{status}'")]
    InvalidTransition {
        /// The current status.
        status: String,
        /// The attempted action.
        action: VoucherAction,
    },
}

impl WorkflowError {
    /// Creates an invalid-transition error.
    #[must_use]
    pub fn invalid(status: impl std::fmt::Display, action: VoucherAction) -> Self {
        Self::InvalidTransition {
            status: status.to_string(),
            action,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } => 422,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }
}
