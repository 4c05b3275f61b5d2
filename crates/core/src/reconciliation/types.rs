//! Bank statement reconciliation types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::types::VoucherId;

use crate::voucher::VoucherKind;

/// Direction of a statement line as seen by the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementType {
    /// Money left the account.
    Debit,
    /// Money entered the account.
    Credit,
}

/// Matching state of a statement line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMatchStatus {
    /// Matched to a book transaction.
    Matched,
    /// Not yet matched.
    #[default]
    Unmatched,
    /// Corrected by an adjustment.
    Adjusted,
}

/// Book transaction a statement line was matched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchedTransaction {
    /// Kind of the matched voucher.
    pub kind: VoucherKind,
    /// Matched voucher id.
    pub id: VoucherId,
}

/// One bank statement line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconciliationEntry {
    /// Date on the statement.
    pub statement_date: NaiveDate,
    /// Amount on the statement (positive).
    pub statement_amount: Decimal,
    /// Debit or credit.
    pub statement_type: StatementType,
    /// Statement narrative.
    #[serde(default)]
    pub description: Option<String>,
    /// Matched book transaction.
    #[serde(default)]
    pub matched_transaction: Option<MatchedTransaction>,
    /// Matching state.
    #[serde(default)]
    pub status: EntryMatchStatus,
    /// Correction amount for adjusted lines.
    #[serde(default)]
    pub adjustment: Decimal,
}

/// Outstanding items between book and statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Adjustments {
    /// Deposits in the books, not yet on the statement.
    pub outstanding_deposits: Decimal,
    /// Withdrawals in the books, not yet on the statement.
    pub outstanding_withdrawals: Decimal,
    /// Issued cheques not yet presented.
    pub outstanding_checks: Decimal,
    /// Charges on the statement, not yet booked.
    pub bank_charges: Decimal,
    /// Interest on the statement, not yet booked.
    pub interest_earned: Decimal,
    /// Booking errors.
    pub errors: Decimal,
}

/// Outcome of a reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationState {
    /// Not reconciled yet.
    #[default]
    Pending,
    /// Statement and adjusted book balance agree.
    Reconciled,
    /// A difference remains for manual handling.
    Discrepancy,
}

/// Result of the balance computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Reconciled or discrepancy.
    pub state: ReconciliationState,
    /// Book balance corrected by the outstanding items.
    pub adjusted_balance: Decimal,
    /// `|statement_balance − adjusted_balance|`.
    pub difference: Decimal,
}
