//! Reconciliation balance computation.
//!
//! ```text
//! adjusted   = book + deposits − withdrawals − checks + interest − charges − errors
//! difference = |statement − adjusted|
//! ```
//!
//! A difference strictly below the tolerance reconciles the voucher and
//! completes it; anything else is a discrepancy left for manual handling.

use rust_decimal::Decimal;

use super::error::ReconciliationError;
use super::types::{
    Adjustments, EntryMatchStatus, ReconciliationEntry, ReconciliationResult, ReconciliationState,
    StatementType,
};
use crate::voucher::{ReconciliationVoucher, Voucher};
use crate::workflow::{Lifecycle, ReconcileStatus, Stamp, WorkflowService};

/// Reconciliation engine.
#[derive(Debug, Clone, Copy)]
pub struct ReconciliationEngine {
    tolerance: Decimal,
}

impl ReconciliationEngine {
    /// Creates an engine with the given tolerance (usually `0.01`).
    #[must_use]
    pub const fn new(tolerance: Decimal) -> Self {
        Self { tolerance }
    }

    /// Computes the book balance corrected by the outstanding items.
    #[must_use]
    pub fn adjusted_balance(book_balance: Decimal, adjustments: &Adjustments) -> Decimal {
        book_balance + adjustments.outstanding_deposits
            - adjustments.outstanding_withdrawals
            - adjustments.outstanding_checks
            + adjustments.interest_earned
            - adjustments.bank_charges
            - adjustments.errors
    }

    /// Computes the reconciliation outcome without touching any voucher.
    #[must_use]
    pub fn compute(
        &self,
        book_balance: Decimal,
        statement_balance: Decimal,
        adjustments: &Adjustments,
    ) -> ReconciliationResult {
        let adjusted_balance = Self::adjusted_balance(book_balance, adjustments);
        let difference = (statement_balance - adjusted_balance).abs();
        let state = if difference < self.tolerance {
            ReconciliationState::Reconciled
        } else {
            ReconciliationState::Discrepancy
        };
        ReconciliationResult {
            state,
            adjusted_balance,
            difference,
        }
    }

    /// Reconciles a voucher in place.
    ///
    /// The actor stamp is recorded whatever the outcome. A reconciled
    /// voucher is also completed.
    ///
    /// # Errors
    ///
    /// Rejects vouchers that are already reconciled, terminal or rejected.
    pub fn apply(
        &self,
        voucher: &mut ReconciliationVoucher,
        stamp: Stamp,
    ) -> Result<ReconciliationResult, ReconciliationError> {
        if voucher.reconciliation_status == ReconciliationState::Reconciled {
            return Err(ReconciliationError::AlreadyReconciled);
        }
        if voucher.status.is_terminal() || voucher.status == ReconcileStatus::Rejected {
            return Err(ReconciliationError::InvalidStatus {
                status: voucher.status.to_string(),
            });
        }

        let result = self.compute(
            voucher.book_balance,
            voucher.statement_balance,
            &voucher.adjustments,
        );

        if result.state == ReconciliationState::Reconciled {
            let event = WorkflowService::complete(voucher.status, stamp)?;
            voucher.apply(&event);
        }

        voucher.adjusted_balance = Some(result.adjusted_balance);
        voucher.difference = Some(result.difference);
        voucher.reconciliation_status = result.state;
        voucher.reconciled = Some(stamp);
        voucher.header.touch(stamp.at);

        Ok(result)
    }
}

/// Derives outstanding items from statement lines.
///
/// Unmatched credits are outstanding deposits, unmatched debits are
/// outstanding withdrawals, and adjusted lines contribute their adjustment
/// to `errors`. Cheques and bank charges cannot be told apart from other
/// debits and stay zero.
#[must_use]
pub fn summarize_entries(entries: &[ReconciliationEntry]) -> Adjustments {
    entries
        .iter()
        .fold(Adjustments::default(), |mut acc, entry| {
            match (entry.status, entry.statement_type) {
                (EntryMatchStatus::Unmatched, StatementType::Credit) => {
                    acc.outstanding_deposits += entry.statement_amount;
                }
                (EntryMatchStatus::Unmatched, StatementType::Debit) => {
                    acc.outstanding_withdrawals += entry.statement_amount;
                }
                (EntryMatchStatus::Adjusted, _) => acc.errors += entry.adjustment,
                (EntryMatchStatus::Matched, _) => {}
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use tallybook_shared::types::{BankAccountId, CurrencyCode, UserId};

    use crate::voucher::VoucherHeader;

    fn engine() -> ReconciliationEngine {
        ReconciliationEngine::new(dec!(0.01))
    }

    fn sample_adjustments() -> Adjustments {
        Adjustments {
            outstanding_deposits: dec!(200),
            outstanding_withdrawals: dec!(50),
            bank_charges: dec!(10),
            interest_earned: dec!(5),
            ..Adjustments::default()
        }
    }

    fn voucher(statement_balance: Decimal) -> ReconciliationVoucher {
        ReconciliationVoucher {
            header: VoucherHeader::new(UserId::new(), Utc::now(), CurrencyCode::default(), dec!(1)),
            status: ReconcileStatus::Draft,
            bank_account: BankAccountId::new(),
            statement_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            opening_balance: dec!(900),
            closing_balance: statement_balance,
            book_balance: dec!(1000),
            statement_balance,
            entries: Vec::new(),
            adjustments: sample_adjustments(),
            adjusted_balance: None,
            difference: None,
            reconciliation_status: ReconciliationState::Pending,
            reconciled: None,
        }
    }

    #[test]
    fn test_adjusted_balance_example() {
        assert_eq!(
            ReconciliationEngine::adjusted_balance(dec!(1000), &sample_adjustments()),
            dec!(1145)
        );
    }

    #[test]
    fn test_matching_statement_reconciles() {
        let result = engine().compute(dec!(1000), dec!(1145), &sample_adjustments());
        assert_eq!(result.state, ReconciliationState::Reconciled);
        assert_eq!(result.difference, dec!(0));
    }

    #[test]
    fn test_discrepancy_reports_difference() {
        let result = engine().compute(dec!(1000), dec!(1200), &sample_adjustments());
        assert_eq!(result.state, ReconciliationState::Discrepancy);
        assert_eq!(result.difference, dec!(55));
    }

    #[test]
    fn test_difference_at_tolerance_is_discrepancy() {
        let result = engine().compute(dec!(1000), dec!(1145.01), &sample_adjustments());
        assert_eq!(result.state, ReconciliationState::Discrepancy);
    }

    #[test]
    fn test_apply_completes_reconciled_voucher() {
        let mut v = voucher(dec!(1145));
        let stamp = Stamp::now(UserId::new());
        engine().apply(&mut v, stamp).unwrap();
        assert_eq!(v.status, ReconcileStatus::Completed);
        assert_eq!(v.reconciliation_status, ReconciliationState::Reconciled);
        assert_eq!(v.adjusted_balance, Some(dec!(1145)));
        assert_eq!(v.reconciled, Some(stamp));

        assert_eq!(
            engine().apply(&mut v, stamp),
            Err(ReconciliationError::AlreadyReconciled)
        );
    }

    #[test]
    fn test_apply_discrepancy_keeps_status_and_stamps() {
        let mut v = voucher(dec!(1200));
        let stamp = Stamp::now(UserId::new());
        let result = engine().apply(&mut v, stamp).unwrap();
        assert_eq!(result.difference, dec!(55));
        assert_eq!(v.status, ReconcileStatus::Draft);
        assert_eq!(v.reconciliation_status, ReconciliationState::Discrepancy);
        assert_eq!(v.reconciled, Some(stamp));

        // A corrected statement can be reconciled again.
        v.statement_balance = dec!(1145);
        engine().apply(&mut v, stamp).unwrap();
        assert_eq!(v.status, ReconcileStatus::Completed);
    }

    #[test]
    fn test_apply_rejects_cancelled() {
        let mut v = voucher(dec!(1145));
        v.status = ReconcileStatus::Cancelled;
        let err = engine().apply(&mut v, Stamp::now(UserId::new())).unwrap_err();
        assert!(matches!(err, ReconciliationError::InvalidStatus { .. }));
    }

    #[test]
    fn test_summarize_entries() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let line = |amount, statement_type, status, adjustment| ReconciliationEntry {
            statement_date: date,
            statement_amount: amount,
            statement_type,
            description: None,
            matched_transaction: None,
            status,
            adjustment,
        };
        let entries = vec![
            line(dec!(200), StatementType::Credit, EntryMatchStatus::Unmatched, dec!(0)),
            line(dec!(50), StatementType::Debit, EntryMatchStatus::Unmatched, dec!(0)),
            line(dec!(75), StatementType::Debit, EntryMatchStatus::Matched, dec!(0)),
            line(dec!(10), StatementType::Debit, EntryMatchStatus::Adjusted, dec!(3)),
        ];
        let summary = summarize_entries(&entries);
        assert_eq!(summary.outstanding_deposits, dec!(200));
        assert_eq!(summary.outstanding_withdrawals, dec!(50));
        assert_eq!(summary.errors, dec!(3));
    }
}
