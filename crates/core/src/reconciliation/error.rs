//! Reconciliation errors.

use thiserror::Error;

use crate::voucher::VoucherError;
use crate::workflow::{VoucherAction, WorkflowError};

/// Errors that can occur while reconciling a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconciliationError {
    /// The voucher is already reconciled.
    #[error("Voucher is already reconciled")]
    AlreadyReconciled,

    /// The voucher status does not allow reconciliation.
    #[error("Cannot reconcile voucher in status '{status}'")]
    InvalidStatus {
        /// Current status name.
        status: String,
    },

    /// The completing transition failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl ReconciliationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyReconciled => "ALREADY_RECONCILED",
            Self::InvalidStatus { .. } | Self::Workflow(_) => "INVALID_STATE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        422
    }
}

impl From<ReconciliationError> for VoucherError {
    fn from(err: ReconciliationError) -> Self {
        match err {
            ReconciliationError::AlreadyReconciled => {
                Self::state("reconciled", VoucherAction::Reconcile)
            }
            ReconciliationError::InvalidStatus { status } => {
                Self::state(status, VoucherAction::Reconcile)
            }
            ReconciliationError::Workflow(err) => err.into(),
        }
    }
}
