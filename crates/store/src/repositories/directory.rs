//! Account directory and related-document registry.

use dashmap::{DashMap, DashSet};
use tallybook_core::directory::{
    AccountDirectory, AccountInfo, BankAccountInfo, DirectoryError, DocumentRef, DocumentRegistry,
};
use tallybook_core::voucher::{AccountKind, AccountRef};
use tallybook_shared::types::{BankAccountId, CurrencyCode, CustomerId, SupplierId};
use uuid::Uuid;

/// In-memory directory of bank accounts, parties and related documents.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    bank_accounts: DashMap<BankAccountId, BankAccountInfo>,
    accounts: DashMap<AccountRef, AccountInfo>,
    documents: DashSet<DocumentRef>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an active bank account.
    ///
    /// The account is also resolvable as an `AccountRef` of kind `BankAccount`.
    pub fn add_bank_account(
        &self,
        code: impl Into<String>,
        name: impl Into<String>,
        currency: CurrencyCode,
    ) -> BankAccountInfo {
        let info = BankAccountInfo {
            id: BankAccountId::new(),
            code: code.into(),
            name: name.into(),
            currency,
            is_active: true,
        };
        self.add_account(
            AccountRef::new(AccountKind::BankAccount, info.id.into_inner()),
            info.name.clone(),
        );
        self.bank_accounts.insert(info.id, info.clone());
        info
    }

    /// Marks a bank account inactive.
    pub fn deactivate_bank_account(&self, id: BankAccountId) {
        if let Some(mut account) = self.bank_accounts.get_mut(&id) {
            account.is_active = false;
        }
    }

    /// Registers an account of any kind under a fresh id.
    pub fn add_account_of(&self, kind: AccountKind, name: impl Into<String>) -> AccountRef {
        let account = AccountRef::new(kind, Uuid::now_v7());
        self.add_account(account, name);
        account
    }

    /// Registers an account reference.
    pub fn add_account(&self, account: AccountRef, name: impl Into<String>) {
        self.accounts.insert(
            account,
            AccountInfo {
                account,
                name: name.into(),
            },
        );
    }

    /// Registers a supplier.
    pub fn add_supplier(&self, name: impl Into<String>) -> SupplierId {
        SupplierId::from_uuid(self.add_account_of(AccountKind::Supplier, name).id)
    }

    /// Registers a customer.
    pub fn add_customer(&self, name: impl Into<String>) -> CustomerId {
        CustomerId::from_uuid(self.add_account_of(AccountKind::Customer, name).id)
    }

    /// Registers a related document.
    pub fn add_document(&self, document: DocumentRef) {
        self.documents.insert(document);
    }
}

impl AccountDirectory for InMemoryDirectory {
    async fn bank_account(&self, id: BankAccountId) -> Result<Option<BankAccountInfo>, DirectoryError> {
        Ok(self.bank_accounts.get(&id).map(|account| account.clone()))
    }

    async fn resolve(&self, account: AccountRef) -> Result<Option<AccountInfo>, DirectoryError> {
        Ok(self.accounts.get(&account).map(|info| info.clone()))
    }
}

impl DocumentRegistry for InMemoryDirectory {
    async fn exists(&self, document: DocumentRef) -> Result<bool, DirectoryError> {
        Ok(self.documents.contains(&document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tallybook_shared::types::PurchaseId;

    #[tokio::test]
    async fn test_bank_account_resolves_both_ways() {
        let directory = InMemoryDirectory::new();
        let info = directory.add_bank_account("BA-001", "Operating", CurrencyCode::default());

        let found = directory.bank_account(info.id).await.unwrap().unwrap();
        assert_eq!(found.code, "BA-001");

        let as_account = AccountRef::new(AccountKind::BankAccount, info.id.into_inner());
        assert_eq!(directory.resolve(as_account).await.unwrap().unwrap().name, "Operating");
    }

    #[tokio::test]
    async fn test_unknown_references() {
        let directory = InMemoryDirectory::new();
        assert!(directory.bank_account(BankAccountId::new()).await.unwrap().is_none());
        let supplier = directory.add_supplier("Acme");
        let wrong_kind = AccountRef::new(AccountKind::Customer, supplier.into_inner());
        assert!(directory.resolve(wrong_kind).await.unwrap().is_none());

        let purchase = DocumentRef::Purchase(PurchaseId::new());
        assert!(!directory.exists(purchase).await.unwrap());
        directory.add_document(purchase);
        assert!(directory.exists(purchase).await.unwrap());
    }
}
