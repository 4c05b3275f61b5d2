//! Store error types.

use tallybook_core::voucher::VoucherError;
use tallybook_shared::types::VoucherId;
use thiserror::Error;

/// Errors raised by the in-memory collections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A unique index already holds the value.
    #[error("Duplicate {field}: {value}")]
    Duplicate {
        /// Indexed field.
        field: &'static str,
        /// Colliding value.
        value: String,
    },

    /// No record with this id.
    #[error("Voucher not found: {0}")]
    NotFound(VoucherId),

    /// The stored version differs from the expected one.
    #[error("Voucher {id} is at version {actual}, expected {expected}")]
    VersionMismatch {
        /// Contended voucher.
        id: VoucherId,
        /// Version the caller read.
        expected: u64,
        /// Version in the store.
        actual: u64,
    },

    /// An identifier assigned at creation was changed.
    #[error("{0} cannot change once assigned")]
    ImmutableField(&'static str),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Duplicate { .. } => "CONFLICT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::VersionMismatch { .. } => "CONCURRENT_MODIFICATION",
            Self::ImmutableField(_) => "VALIDATION_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Duplicate { .. } | Self::VersionMismatch { .. } => 409,
            Self::NotFound(_) => 404,
            Self::ImmutableField(_) => 400,
        }
    }
}

impl From<StoreError> for VoucherError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { field, value } => Self::conflict(field, value),
            StoreError::NotFound(id) => Self::not_found("voucher", id),
            StoreError::VersionMismatch { id, .. } => Self::ConcurrentModification { id },
            StoreError::ImmutableField(field) => Self::invalid(field, "cannot change once assigned"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StoreError::NotFound(VoucherId::new()), 404)]
    #[case(StoreError::ImmutableField("voucher_number"), 400)]
    #[case(StoreError::Duplicate { field: "refer_code", value: "JV-0001".into() }, 409)]
    fn test_status_survives_conversion(#[case] err: StoreError, #[case] status: u16) {
        let converted: VoucherError = err.into();
        assert_eq!(converted.status_code(), status);
    }

    #[test]
    fn test_into_voucher_error() {
        let err: VoucherError = StoreError::Duplicate {
            field: "voucher_number",
            value: "JV-250314-0001".into(),
        }
        .into();
        assert_eq!(err.status_code(), 409);
        assert!(err.to_string().contains("voucher_number"));

        let id = VoucherId::new();
        let err: VoucherError = StoreError::VersionMismatch {
            id,
            expected: 1,
            actual: 2,
        }
        .into();
        assert_eq!(err.error_code(), "CONCURRENT_MODIFICATION");
    }
}
