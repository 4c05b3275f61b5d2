//! In-memory backend for the voucher services.

use std::sync::Arc;

use rust_decimal::Decimal;
use tallybook_core::directory::DocumentRef;
use tallybook_core::service::Backend;
use tallybook_core::storage::{StorageConfig, StorageError, StorageProvider, StorageService};
use tallybook_core::voucher::{
    BankTransferVoucher, JournalVoucher, PaymentVoucher, ReconciliationVoucher,
};
use tallybook_shared::types::{CustomerId, SupplierId};

use crate::repositories::{
    InMemoryCounterStore, InMemoryDirectory, InMemorySettlementLedger, InMemoryVoucherRepository,
    Purchase, Sale,
};

/// Every collection the voucher services need, held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    counters: Arc<InMemoryCounterStore>,
    directory: Arc<InMemoryDirectory>,
    attachments: Arc<StorageService>,
    ledger: Arc<InMemorySettlementLedger>,
    transfers: Arc<InMemoryVoucherRepository<BankTransferVoucher>>,
    payments: Arc<InMemoryVoucherRepository<PaymentVoucher>>,
    journals: Arc<InMemoryVoucherRepository<JournalVoucher>>,
    reconciliations: Arc<InMemoryVoucherRepository<ReconciliationVoucher>>,
}

impl InMemoryBackend {
    /// Creates an empty backend storing attachments in `storage`.
    #[must_use]
    pub fn new(storage: StorageService) -> Self {
        Self {
            counters: Arc::new(InMemoryCounterStore::new()),
            directory: Arc::new(InMemoryDirectory::new()),
            attachments: Arc::new(storage),
            ledger: Arc::new(InMemorySettlementLedger::new()),
            transfers: Arc::new(InMemoryVoucherRepository::new()),
            payments: Arc::new(InMemoryVoucherRepository::new()),
            journals: Arc::new(InMemoryVoucherRepository::new()),
            reconciliations: Arc::new(InMemoryVoucherRepository::new()),
        }
    }

    /// Creates an empty backend with in-process attachment storage.
    pub fn in_memory() -> Result<Self, StorageError> {
        let storage = StorageService::from_config(StorageConfig::new(StorageProvider::Memory))?;
        Ok(Self::new(storage))
    }

    /// Records a purchase and registers it as a related document.
    pub fn add_purchase(&self, supplier: SupplierId, total: Decimal) -> Purchase {
        let purchase = self.ledger.add_purchase(supplier, total);
        self.directory.add_document(DocumentRef::Purchase(purchase.id));
        purchase
    }

    /// Records a sale and registers it as a related document.
    pub fn add_sale(&self, customer: CustomerId, total: Decimal) -> Sale {
        let sale = self.ledger.add_sale(customer, total);
        self.directory.add_document(DocumentRef::Sale(sale.id));
        sale
    }

    /// Returns the directory for seeding.
    #[must_use]
    pub fn directory_ref(&self) -> &InMemoryDirectory {
        &self.directory
    }

    /// Returns the settlement ledger for inspection.
    #[must_use]
    pub fn ledger_ref(&self) -> &InMemorySettlementLedger {
        &self.ledger
    }

    /// Returns the counter store for inspection.
    #[must_use]
    pub fn counters_ref(&self) -> &InMemoryCounterStore {
        &self.counters
    }
}

impl Backend for InMemoryBackend {
    type Counters = InMemoryCounterStore;
    type Directory = InMemoryDirectory;
    type Attachments = StorageService;
    type Ledger = InMemorySettlementLedger;
    type Transfers = InMemoryVoucherRepository<BankTransferVoucher>;
    type Payments = InMemoryVoucherRepository<PaymentVoucher>;
    type Journals = InMemoryVoucherRepository<JournalVoucher>;
    type Reconciliations = InMemoryVoucherRepository<ReconciliationVoucher>;

    fn counters(&self) -> Arc<Self::Counters> {
        Arc::clone(&self.counters)
    }

    fn directory(&self) -> Arc<Self::Directory> {
        Arc::clone(&self.directory)
    }

    fn attachments(&self) -> Arc<Self::Attachments> {
        Arc::clone(&self.attachments)
    }

    fn ledger(&self) -> Arc<Self::Ledger> {
        Arc::clone(&self.ledger)
    }

    fn transfers(&self) -> Arc<Self::Transfers> {
        Arc::clone(&self.transfers)
    }

    fn payments(&self) -> Arc<Self::Payments> {
        Arc::clone(&self.payments)
    }

    fn journals(&self) -> Arc<Self::Journals> {
        Arc::clone(&self.journals)
    }

    fn reconciliations(&self) -> Arc<Self::Reconciliations> {
        Arc::clone(&self.reconciliations)
    }
}
