//! Voucher data model.
//!
//! Every variant shares a `VoucherHeader` and owns a variant-specific
//! status enum. The `Voucher` trait is what repositories, the workflow
//! and the services operate on.

pub mod account;
pub mod error;
pub mod header;
pub mod input;
pub mod journal;
pub mod payment;
pub mod reconcile;
pub mod transfer;

use std::fmt;

use serde::{Deserialize, Serialize};
use tallybook_shared::types::{BankAccountId, VoucherId};

use crate::numbering::EntityKind;
use crate::workflow::{Lifecycle, WorkflowEvent};

pub use account::{AccountKind, AccountRef, Payee, PayeeType};
pub use error::VoucherError;
pub use header::{ApprovalStatus, Attachment, Cancellation, VoucherHeader, VoucherIdentity};
pub use input::{HeaderInput, HeaderPatch, parse_json_field};
pub use journal::{JournalKind, JournalVoucher};
pub use payment::{DerivedLink, PaymentChannel, PaymentMethod, PaymentVoucher};
pub use reconcile::ReconciliationVoucher;
pub use transfer::{BankTransferVoucher, FailureDetails, TransferMethod};

/// The six voucher kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherKind {
    /// Transfer between two bank accounts.
    BankTransfer,
    /// Payment out of the cash book.
    CashPayment,
    /// Payment out of a bank account.
    BankPayment,
    /// Balanced journal entries.
    Journal,
    /// Opening balances.
    OpeningBalance,
    /// Bank statement reconciliation.
    BankReconciliation,
}

impl VoucherKind {
    /// Returns the numbering entity for this kind.
    #[must_use]
    pub const fn entity(self) -> EntityKind {
        match self {
            Self::BankTransfer => EntityKind::BankTransfer,
            Self::CashPayment => EntityKind::CashPayment,
            Self::BankPayment => EntityKind::BankPayment,
            Self::Journal => EntityKind::Journal,
            Self::OpeningBalance => EntityKind::OpeningBalance,
            Self::BankReconciliation => EntityKind::BankReconciliation,
        }
    }

    /// Returns the snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.entity().as_str()
    }

    /// Returns true if the daily number sequence is scoped to the bank account.
    #[must_use]
    pub const fn scoped_by_account(self) -> bool {
        matches!(self, Self::BankReconciliation)
    }
}

impl fmt::Display for VoucherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behaviour shared by all voucher variants.
pub trait Voucher: Clone + fmt::Debug + Send + Sync + 'static {
    /// Variant status enum.
    type Status: Lifecycle;

    /// Returns the voucher kind.
    fn kind(&self) -> VoucherKind;

    /// Returns the shared header.
    fn header(&self) -> &VoucherHeader;

    /// Returns the shared header mutably.
    fn header_mut(&mut self) -> &mut VoucherHeader;

    /// Returns the current status.
    fn status(&self) -> Self::Status;

    /// Overwrites the status.
    fn set_status(&mut self, status: Self::Status);

    /// Bank account the voucher is filed under, if any.
    fn bank_account(&self) -> Option<BankAccountId> {
        None
    }

    /// Variant-specific bookkeeping after a workflow event.
    fn on_event(&mut self, _event: &WorkflowEvent<Self::Status>) {}

    /// Applies a workflow event: status, audit trail, variant hook.
    fn apply(&mut self, event: &WorkflowEvent<Self::Status>) {
        self.set_status(event.new_status());
        self.header_mut().record(event);
        self.on_event(event);
    }

    /// Returns the voucher id.
    fn id(&self) -> VoucherId {
        self.header().id
    }

    /// Returns true if the voucher accepts no further mutation.
    fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }
}
