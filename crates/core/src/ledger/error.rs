//! Ledger error types for double-entry validation.

use rust_decimal::Decimal;
use tallybook_shared::error::FieldError;
use thiserror::Error;

/// Errors that can occur while validating an entry list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Too few entries.
    #[error("At least {min} entries are required, got {actual}")]
    InsufficientEntries {
        /// Required minimum.
        min: usize,
        /// Entries supplied.
        actual: usize,
    },

    /// One or more entries are malformed.
    #[error("Invalid entries: {}", tallybook_shared::error::join_field_errors(.0))]
    InvalidEntries(Vec<FieldError>),

    /// Debits and credits differ by more than the tolerance.
    #[error("Total debit ({debit}) must equal total credit ({credit})")]
    Unbalanced {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientEntries { .. } => "INSUFFICIENT_ENTRIES",
            Self::InvalidEntries(_) => "INVALID_ENTRIES",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRIES",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        400
    }

    /// Converts the error into per-field problems.
    #[must_use]
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            Self::InvalidEntries(errors) => errors.clone(),
            Self::InsufficientEntries { .. } | Self::Unbalanced { .. } => {
                vec![FieldError::new("entries", self.to_string())]
            }
        }
    }
}
