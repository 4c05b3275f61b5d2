//! Errors raised while storing voucher attachments.

use tallybook_shared::AppError;
use tallybook_shared::error::FieldError;
use thiserror::Error;

/// Attachment storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Upload is bigger than the configured ceiling.
    #[error("attachment of {size} bytes is over the {max} byte limit")]
    AttachmentTooLarge {
        /// Upload size.
        size: u64,
        /// Configured ceiling.
        max: u64,
    },

    /// Content type is not on the allow list.
    #[error("attachments of type '{0}' are not accepted")]
    UnsupportedType(String),

    /// No object behind the key.
    #[error("attachment missing from storage: {0}")]
    Missing(String),

    /// Operator could not be built.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Backend call failed.
    #[error("storage backend failed: {0}")]
    Backend(String),

    /// Url was not issued by this store.
    #[error("invalid attachment url: {0}")]
    ForeignUrl(String),
}

impl StorageError {
    /// Shorthand for [`StorageError::Configuration`].
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AttachmentTooLarge { .. } => "ATTACHMENT_TOO_LARGE",
            Self::UnsupportedType(_) => "UNSUPPORTED_ATTACHMENT_TYPE",
            Self::Missing(_) => "ATTACHMENT_NOT_FOUND",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Backend(_) => "STORAGE_ERROR",
            Self::ForeignUrl(_) => "INVALID_ATTACHMENT_URL",
        }
    }

    /// Whether the caller sent something unusable.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AttachmentTooLarge { .. } | Self::UnsupportedType(_) | Self::ForeignUrl(_)
        )
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        if err.kind() == opendal::ErrorKind::NotFound {
            Self::Missing(err.to_string())
        } else {
            Self::Backend(err.to_string())
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Missing(key) => Self::NotFound(format!("attachment {key}")),
            err if err.is_client_error() => {
                Self::Validation(vec![FieldError::new("attachments", err.to_string())])
            }
            err => Self::Storage(err.to_string()),
        }
    }
}
