//! Storage service implementation using Apache OpenDAL.

use std::future::Future;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use tallybook_shared::types::AttachmentId;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use crate::voucher::{Attachment, VoucherKind};

/// Raw attachment upload.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    /// Original filename.
    pub name: String,
    /// Content type (MIME type).
    pub content_type: String,
    /// File content.
    pub bytes: Bytes,
}

impl AttachmentUpload {
    /// Creates an upload.
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Attachment store capability.
///
/// The voucher engine persists only the returned `{url, name, type}`
/// triple; failures are logged by callers and never block a voucher write.
pub trait AttachmentStore: Send + Sync {
    /// Stores an upload for a voucher of `kind`.
    fn store(
        &self,
        kind: VoucherKind,
        upload: AttachmentUpload,
    ) -> impl Future<Output = Result<Attachment, StorageError>> + Send;

    /// Deletes a previously stored attachment.
    fn remove(&self, url: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Storage service for voucher attachments.
#[derive(Debug, Clone)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::Memory => Ok(Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish()),
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                Ok(Operator::new(services::Fs::default().root(root))
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Validate an upload against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::AttachmentTooLarge {
                size,
                max: self.config.max_file_size,
            });
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::UnsupportedType(content_type.to_string()));
        }

        Ok(())
    }

    /// Generate storage key for an attachment.
    ///
    /// Format: `vouchers/{voucher_kind}/{attachment_id}/{sanitized_filename}`
    #[must_use]
    pub fn generate_storage_key(kind: VoucherKind, attachment_id: AttachmentId, filename: &str) -> String {
        format!(
            "vouchers/{kind}/{attachment_id}/{}",
            sanitize_filename(filename)
        )
    }

    /// Returns the url of a storage key.
    #[must_use]
    pub fn url_for(&self, key: &str) -> String {
        format!("{}://{key}", self.config.provider.name())
    }

    /// Extracts the storage key from a url issued by this service.
    ///
    /// # Errors
    ///
    /// Returns `ForeignUrl` for foreign urls.
    pub fn key_for(&self, url: &str) -> Result<String, StorageError> {
        let scheme = format!("{}://", self.config.provider.name());
        url.strip_prefix(&scheme)
            .filter(|key| key.starts_with("vouchers/"))
            .map(ToString::to_string)
            .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))
    }

    /// Check if an attachment url exists in storage.
    pub async fn exists(&self, url: &str) -> bool {
        let Ok(key) = self.key_for(url) else {
            return false;
        };
        match self.operator.stat(&key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl AttachmentStore for StorageService {
    async fn store(
        &self,
        kind: VoucherKind,
        upload: AttachmentUpload,
    ) -> Result<Attachment, StorageError> {
        self.validate_upload(&upload.content_type, upload.bytes.len() as u64)?;

        let key = Self::generate_storage_key(kind, AttachmentId::new(), &upload.name);
        self.operator
            .write(&key, upload.bytes)
            .await
            .map_err(StorageError::from)?;

        Ok(Attachment {
            url: self.url_for(&key),
            name: upload.name,
            content_type: upload.content_type,
        })
    }

    async fn remove(&self, url: &str) -> Result<(), StorageError> {
        let key = self.key_for(url)?;
        self.operator.delete(&key).await.map_err(StorageError::from)
    }
}

/// Sanitize filename for storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Sanitized filenames only contain safe characters.
        #[test]
        fn prop_sanitized_filename_safe_chars(filename in ".*") {
            let sanitized = sanitize_filename(&filename);
            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized filename: {}", c);
            }
        }

        /// Keys always have four segments: root, kind, id, filename.
        #[test]
        fn prop_storage_key_format(filename in "[a-zA-Z0-9 _-]{1,40}\\.[a-z]{2,4}") {
            let id = AttachmentId::new();
            let key = StorageService::generate_storage_key(VoucherKind::BankPayment, id, &filename);
            let parts: Vec<&str> = key.split('/').collect();
            prop_assert_eq!(parts.len(), 4);
            prop_assert_eq!(parts[0], "vouchers");
            prop_assert_eq!(parts[1], "bank_payment");
            prop_assert_eq!(parts[2], id.to_string());
        }

        /// Size validation accepts exactly the sizes up to the limit.
        #[test]
        fn prop_file_size_validation(max_size in 1024u64..10_000_000, file_size in 0u64..20_000_000) {
            let service = StorageService::from_config(
                StorageConfig::new(StorageProvider::Memory).with_max_file_size(max_size),
            ).expect("should create service");
            let result = service.validate_upload("application/pdf", file_size);
            prop_assert_eq!(result.is_ok(), file_size <= max_size);
        }
    }
}
