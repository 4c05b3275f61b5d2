//! Voucher services.
//!
//! One service per variant family, all sharing a `VoucherContext`:
//! - `TransferService` - bank account transfers
//! - `PaymentService` - cash and bank payments, with derived transactions
//! - `JournalService` - journal and opening balance vouchers
//! - `ReconciliationService` - bank statement reconciliation

mod context;
mod journal;
mod payment;
mod reconcile;
mod transfer;

use tallybook_shared::config::AppConfig;

pub use context::{AttachmentChanges, Backend, VoucherContext, VoucherOutcome, day_bounds};
pub use journal::{JournalInput, JournalPatch, JournalService};
pub use payment::{PaymentInput, PaymentPatch, PaymentService};
pub use reconcile::{ReconciliationInput, ReconciliationPatch, ReconciliationService};
pub use transfer::{TransferInput, TransferPatch, TransferService};

use crate::settlement::SettlementEngine;
use crate::voucher::VoucherError;

/// Every voucher service, wired to one backend.
pub struct VoucherServices<B: Backend> {
    /// Bank transfers.
    pub transfers: TransferService<B>,
    /// Cash and bank payments.
    pub payments: PaymentService<B>,
    /// Journal and opening balance vouchers.
    pub journals: JournalService<B>,
    /// Bank reconciliations.
    pub reconciliations: ReconciliationService<B>,
}

impl<B: Backend> Clone for VoucherServices<B> {
    fn clone(&self) -> Self {
        Self {
            transfers: self.transfers.clone(),
            payments: self.payments.clone(),
            journals: self.journals.clone(),
            reconciliations: self.reconciliations.clone(),
        }
    }
}

impl<B: Backend> VoucherServices<B> {
    /// Wires the services to `backend`.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an invalid ledger configuration.
    pub fn new(backend: &B, config: &AppConfig) -> Result<Self, VoucherError> {
        let ctx = VoucherContext::new(backend, config)?;
        let settlement = SettlementEngine::new(backend.ledger(), ctx.ids().clone());
        Ok(Self {
            transfers: TransferService::new(ctx.clone(), backend.transfers()),
            payments: PaymentService::new(ctx.clone(), backend.payments(), settlement),
            journals: JournalService::new(ctx.clone(), backend.journals()),
            reconciliations: ReconciliationService::new(ctx, backend.reconciliations()),
        })
    }
}
