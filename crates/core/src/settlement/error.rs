//! Derived-transaction errors.
//!
//! These never fail the voucher write that triggered them: services report
//! them alongside the successful voucher.

use thiserror::Error;

use crate::numbering::NumberingError;
use crate::voucher::VoucherError;

/// Errors raised while synthesizing a derived record.
#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    /// Balance aggregation or record insertion failed.
    #[error("Settlement ledger error: {0}")]
    Ledger(String),

    /// Refer code generation failed.
    #[error(transparent)]
    Numbering(#[from] NumberingError),

    /// Reading or linking the voucher failed.
    #[error(transparent)]
    Voucher(#[from] VoucherError),
}

impl SettlementError {
    /// Creates a ledger error.
    #[must_use]
    pub fn ledger(msg: impl Into<String>) -> Self {
        Self::Ledger(msg.into())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(_) | Self::Numbering(_) => "DERIVED_TRANSACTION_ERROR",
            Self::Voucher(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Ledger(_) | Self::Numbering(_) => 500,
            Self::Voucher(err) => err.status_code(),
        }
    }
}
