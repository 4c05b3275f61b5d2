//! Attachment storage using Apache OpenDAL.
//!
//! Voucher attachments are written through a vendor-agnostic operator:
//! in-process memory for tests and the seeder, the local filesystem for
//! development.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{AttachmentStore, AttachmentUpload, StorageService};
