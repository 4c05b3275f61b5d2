//! Bank reconciliation voucher.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::types::BankAccountId;

use super::header::VoucherHeader;
use super::{Voucher, VoucherKind};
use crate::reconciliation::{Adjustments, ReconciliationEntry, ReconciliationState};
use crate::workflow::{ReconcileStatus, Stamp};

/// Reconciliation of one bank statement against the books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationVoucher {
    /// Shared attributes.
    pub header: VoucherHeader,
    /// Workflow status.
    pub status: ReconcileStatus,
    /// Reconciled account.
    pub bank_account: BankAccountId,
    /// Statement date.
    pub statement_date: NaiveDate,
    /// Statement opening balance.
    pub opening_balance: Decimal,
    /// Statement closing balance.
    pub closing_balance: Decimal,
    /// Balance according to the books.
    pub book_balance: Decimal,
    /// Balance to reconcile against (defaults to the closing balance).
    pub statement_balance: Decimal,
    /// Statement lines.
    pub entries: Vec<ReconciliationEntry>,
    /// Outstanding items.
    pub adjustments: Adjustments,
    /// Last computed adjusted balance.
    pub adjusted_balance: Option<Decimal>,
    /// Last computed difference.
    pub difference: Option<Decimal>,
    /// Reconciliation outcome.
    pub reconciliation_status: ReconciliationState,
    /// Last reconciling actor.
    pub reconciled: Option<Stamp>,
}

impl Voucher for ReconciliationVoucher {
    type Status = ReconcileStatus;

    fn kind(&self) -> VoucherKind {
        VoucherKind::BankReconciliation
    }

    fn header(&self) -> &VoucherHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut VoucherHeader {
        &mut self.header
    }

    fn status(&self) -> ReconcileStatus {
        self.status
    }

    fn set_status(&mut self, status: ReconcileStatus) {
        self.status = status;
    }

    fn bank_account(&self) -> Option<BankAccountId> {
        Some(self.bank_account)
    }
}
