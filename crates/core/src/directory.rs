//! Collaborator capabilities the voucher engine consumes.
//!
//! The engine only needs to know whether referenced entities exist and a
//! few of their attributes. Storage of those entities lives elsewhere.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tallybook_shared::types::{BankAccountId, CurrencyCode, PaymentId, PurchaseId, SaleId};
use thiserror::Error;

use crate::voucher::account::AccountRef;

/// Errors raised by directory lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The backing store could not answer.
    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Bank account attributes used by vouchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccountInfo {
    /// Account id.
    pub id: BankAccountId,
    /// Short unique code, embedded in scoped voucher numbers.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account currency, used when a voucher names none.
    pub currency: CurrencyCode,
    /// Inactive accounts cannot be used on new vouchers.
    pub is_active: bool,
}

/// Resolved attributes of any referenced account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// The resolved reference.
    pub account: AccountRef,
    /// Display name.
    pub name: String,
}

/// Account directory capability.
pub trait AccountDirectory: Send + Sync {
    /// Resolves a bank account.
    fn bank_account(
        &self,
        id: BankAccountId,
    ) -> impl Future<Output = Result<Option<BankAccountInfo>, DirectoryError>> + Send;

    /// Resolves any account reference by its kind tag.
    fn resolve(
        &self,
        account: AccountRef,
    ) -> impl Future<Output = Result<Option<AccountInfo>, DirectoryError>> + Send;
}

/// A document a voucher may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum DocumentRef {
    /// A purchase.
    Purchase(PurchaseId),
    /// A sale.
    Sale(SaleId),
    /// A previously derived payment.
    Payment(PaymentId),
}

impl DocumentRef {
    /// Entity name used in not-found errors.
    #[must_use]
    pub const fn entity(self) -> &'static str {
        match self {
            Self::Purchase(_) => "purchase",
            Self::Sale(_) => "sale",
            Self::Payment(_) => "payment",
        }
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Purchase(id) => write!(f, "{id}"),
            Self::Sale(id) => write!(f, "{id}"),
            Self::Payment(id) => write!(f, "{id}"),
        }
    }
}

/// Related-document registry capability (existence checks only).
pub trait DocumentRegistry: Send + Sync {
    /// Returns true if the document exists.
    fn exists(&self, document: DocumentRef)
    -> impl Future<Output = Result<bool, DirectoryError>> + Send;
}
