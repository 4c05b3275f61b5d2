//! Running balance arithmetic for derived payments.

use rust_decimal::Decimal;

use super::types::{SalePaymentStatus, SaleSummary};

/// Balance of a supplier or customer just before a new payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    /// Total purchased from (or sold to) the party.
    pub total: Decimal,
    /// Sum of qualifying prior payments.
    pub paid_so_far: Decimal,
}

/// Balance right after a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceAfter {
    /// `paid_so_far + amount`.
    pub paid_amount: Decimal,
    /// `remaining_before − amount`; negative means an advance.
    pub remaining_balance: Decimal,
}

impl BalanceSnapshot {
    /// Outstanding amount before the payment.
    #[must_use]
    pub fn remaining_before(&self) -> Decimal {
        self.total - self.paid_so_far
    }

    /// Applies a payment of `amount`.
    #[must_use]
    pub fn after(&self, amount: Decimal) -> BalanceAfter {
        BalanceAfter {
            paid_amount: self.paid_so_far + amount,
            remaining_balance: self.remaining_before() - amount,
        }
    }
}

/// Builds the journey narrative.
#[must_use]
pub fn narrative(amount: Decimal, currency: &str, payee: &str, voucher_number: &str, remaining: Decimal) -> String {
    let mut text = format!(
        "Paid {amount:.2} {currency} to {payee} via {voucher_number}. Remaining balance: {remaining:.2}"
    );
    if remaining < Decimal::ZERO {
        text.push_str(&format!(". Advanced payment of {:.2}", remaining.abs()));
    }
    text
}

/// Derives a sale's payment status from its totals.
#[must_use]
pub fn sale_payment_status(summary: SaleSummary) -> SalePaymentStatus {
    if summary.paid >= summary.total {
        SalePaymentStatus::Paid
    } else if summary.paid > Decimal::ZERO {
        SalePaymentStatus::Partial
    } else {
        SalePaymentStatus::Unpaid
    }
}
