//! Records synthesized from payment vouchers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::types::{
    CurrencyCode, CustomerId, JourneyId, PaymentId, PurchaseId, SaleId, SupplierId, UserId,
    VoucherId,
};
use uuid::Uuid;

use crate::voucher::{AccountKind, PaymentMethod};

/// Fields every derived payment carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Payment id.
    pub id: PaymentId,
    /// Refer code (`SPAY-0001`, `CPAY-0001`, `FPAY-0001`).
    pub refer_code: String,
    /// Paid amount.
    pub amount: Decimal,
    /// Currency of the source voucher.
    pub currency: CurrencyCode,
    /// Payment instrument.
    pub payment_method: PaymentMethod,
    /// Voucher date of the source voucher.
    pub payment_date: DateTime<Utc>,
    /// Source voucher.
    pub voucher_id: VoucherId,
    /// Source voucher number.
    pub voucher_number: String,
    /// Acting user.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Cancelled payments are excluded from balance aggregation.
    pub is_cancelled: bool,
}

/// Payment against a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierPayment {
    /// Common fields.
    pub record: PaymentRecord,
    /// Paid supplier.
    pub supplier: SupplierId,
    /// Purchase settled, if any.
    pub related_purchase: Option<PurchaseId>,
}

/// Payment against a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPayment {
    /// Common fields.
    pub record: PaymentRecord,
    /// Customer.
    pub customer: CustomerId,
    /// Sale settled, if any.
    pub related_sale: Option<SaleId>,
}

/// Payment against an internal financial account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialPayment {
    /// Common fields.
    pub record: PaymentRecord,
    /// Account category.
    pub category: AccountKind,
    /// Referenced account id.
    pub account_id: Uuid,
}

/// Counterparty of a journey entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum JourneyParty {
    /// Supplier balance.
    Supplier(SupplierId),
    /// Customer balance.
    Customer(CustomerId),
}

/// Immutable audit record of a balance change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyEntry {
    /// Entry id.
    pub id: JourneyId,
    /// Refer code (`JRN-0001`).
    pub refer_code: String,
    /// Whose balance changed.
    pub party: JourneyParty,
    /// Payment that caused the change.
    pub payment_id: PaymentId,
    /// Source voucher.
    pub voucher_id: VoucherId,
    /// Total purchased from / sold to the party.
    pub total_amount: Decimal,
    /// Paid so far, including this payment.
    pub paid_amount: Decimal,
    /// Remaining after this payment (negative means advance).
    pub remaining_balance: Decimal,
    /// Human-readable narrative.
    pub narrative: String,
    /// Acting user.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Payment status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalePaymentStatus {
    /// Nothing paid.
    Unpaid,
    /// Partly paid.
    Partial,
    /// Fully covered.
    Paid,
}

/// Total and paid-to-date of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleSummary {
    /// Sale total.
    pub total: Decimal,
    /// Sum of non-cancelled customer payments linked to the sale.
    pub paid: Decimal,
}

/// A freshly synthesized record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DerivedRecord {
    /// Supplier payment with its journey entry.
    Supplier {
        /// The payment.
        payment: SupplierPayment,
        /// The journey entry.
        journey: JourneyEntry,
    },
    /// Customer payment with its journey entry.
    Customer {
        /// The payment.
        payment: CustomerPayment,
        /// The journey entry.
        journey: JourneyEntry,
        /// New status of the linked sale.
        sale_status: Option<SalePaymentStatus>,
    },
    /// Financial payment.
    Financial {
        /// The payment.
        payment: FinancialPayment,
    },
}

impl DerivedRecord {
    /// Returns the id of the synthesized payment.
    #[must_use]
    pub fn payment_id(&self) -> PaymentId {
        match self {
            Self::Supplier { payment, .. } => payment.record.id,
            Self::Customer { payment, .. } => payment.record.id,
            Self::Financial { payment } => payment.record.id,
        }
    }
}

/// Result of a settlement attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// A record was created and linked.
    Created(Box<DerivedRecord>),
    /// The voucher was already linked; nothing was created.
    AlreadySettled(crate::voucher::DerivedLink),
    /// The voucher does not qualify (status or payee type).
    NotApplicable,
}

impl SettlementOutcome {
    /// Returns the created record, if any.
    #[must_use]
    pub fn into_record(self) -> Option<DerivedRecord> {
        match self {
            Self::Created(record) => Some(*record),
            Self::AlreadySettled(_) | Self::NotApplicable => None,
        }
    }
}
