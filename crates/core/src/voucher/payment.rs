//! Cash and bank payment vouchers.
//!
//! Both share one shape; `PaymentChannel` decides which voucher kind a
//! record belongs to. Bank payments additionally name the paying account.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::error::FieldError;
use tallybook_shared::types::{BankAccountId, PaymentId, PurchaseId, SaleId};

use super::account::Payee;
use super::header::VoucherHeader;
use super::{Voucher, VoucherKind};
use crate::workflow::PaymentStatus;

/// Where the money leaves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentChannel {
    /// Paid from the cash book.
    Cash,
    /// Paid from a bank account.
    Bank,
}

impl PaymentChannel {
    /// Returns the voucher kind for the channel.
    #[must_use]
    pub const fn kind(self) -> VoucherKind {
        match self {
            Self::Cash => VoucherKind::CashPayment,
            Self::Bank => VoucherKind::BankPayment,
        }
    }

    /// Status used when the caller does not name one.
    ///
    /// Cash payments are settled on the spot.
    #[must_use]
    pub const fn default_status(self) -> PaymentStatus {
        match self {
            Self::Cash => PaymentStatus::Completed,
            Self::Bank => PaymentStatus::Draft,
        }
    }
}

/// Payment instrument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    #[default]
    Cash,
    /// Cheque.
    Cheque,
    /// Bank transfer.
    BankTransfer,
    /// Card.
    Card,
    /// Online payment.
    Online,
    /// Anything else.
    Other,
}

impl PaymentMethod {
    /// Returns the snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Cheque => "cheque",
            Self::BankTransfer => "bank_transfer",
            Self::Card => "card",
            Self::Online => "online",
            Self::Other => "other",
        }
    }
}

/// Back-reference to the record synthesized from a payment voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum DerivedLink {
    /// `relatedSupplierPayment`.
    SupplierPayment(PaymentId),
    /// `relatedPayment` (customer payment).
    CustomerPayment(PaymentId),
    /// `relatedFinancialPayment`.
    FinancialPayment(PaymentId),
}

impl DerivedLink {
    /// Returns the linked payment id.
    #[must_use]
    pub const fn payment_id(self) -> PaymentId {
        match self {
            Self::SupplierPayment(id) | Self::CustomerPayment(id) | Self::FinancialPayment(id) => {
                id
            }
        }
    }
}

/// A cash or bank payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVoucher {
    /// Shared attributes.
    pub header: VoucherHeader,
    /// Workflow status.
    pub status: PaymentStatus,
    /// Cash or bank.
    pub channel: PaymentChannel,
    /// Paying account (bank payments only).
    pub bank_account: Option<BankAccountId>,
    /// Who is paid.
    pub payee: Payee,
    /// Resolved payee display name.
    pub payee_name: String,
    /// Paid amount.
    pub amount: Decimal,
    /// Payment instrument.
    pub payment_method: PaymentMethod,
    /// Purchase this payment settles.
    pub related_purchase: Option<PurchaseId>,
    /// Sale this payment relates to.
    pub related_sale: Option<SaleId>,
    /// Derived record, set at most once.
    pub derived: Option<DerivedLink>,
}

impl PaymentVoucher {
    /// `relatedSupplierPayment` back-reference.
    #[must_use]
    pub fn related_supplier_payment(&self) -> Option<PaymentId> {
        match self.derived {
            Some(DerivedLink::SupplierPayment(id)) => Some(id),
            _ => None,
        }
    }

    /// `relatedPayment` back-reference (customer payment).
    #[must_use]
    pub fn related_payment(&self) -> Option<PaymentId> {
        match self.derived {
            Some(DerivedLink::CustomerPayment(id)) => Some(id),
            _ => None,
        }
    }

    /// `relatedFinancialPayment` back-reference.
    #[must_use]
    pub fn related_financial_payment(&self) -> Option<PaymentId> {
        match self.derived {
            Some(DerivedLink::FinancialPayment(id)) => Some(id),
            _ => None,
        }
    }

    /// Checks the payment-specific field rules.
    pub fn validate_fields(
        channel: PaymentChannel,
        bank_account: Option<BankAccountId>,
        payee: &Payee,
        amount: Decimal,
        problems: &mut Vec<FieldError>,
    ) {
        if amount <= Decimal::ZERO {
            problems.push(FieldError::new("amount", "must be greater than zero"));
        }
        if channel == PaymentChannel::Bank && bank_account.is_none() {
            problems.push(FieldError::new("bank_account", "is required for bank payments"));
        }
        match payee {
            Payee::Financial(account) if !account.kind.is_financial_category() => {
                problems.push(FieldError::new(
                    "payee",
                    format!("{} is not a financial account category", account.kind),
                ));
            }
            Payee::Other(name) if name.trim().is_empty() => {
                problems.push(FieldError::new("payee", "is required"));
            }
            _ => {}
        }
    }
}

impl Voucher for PaymentVoucher {
    type Status = PaymentStatus;

    fn kind(&self) -> VoucherKind {
        self.channel.kind()
    }

    fn header(&self) -> &VoucherHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut VoucherHeader {
        &mut self.header
    }

    fn status(&self) -> PaymentStatus {
        self.status
    }

    fn set_status(&mut self, status: PaymentStatus) {
        self.status = status;
    }

    fn bank_account(&self) -> Option<BankAccountId> {
        self.bank_account
    }
}
