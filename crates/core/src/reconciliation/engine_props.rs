//! Property-based tests for reconciliation arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::engine::ReconciliationEngine;
use super::types::{Adjustments, ReconciliationState};

fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn adjustments() -> impl Strategy<Value = Adjustments> {
    (amount(), amount(), amount(), amount(), amount(), amount()).prop_map(
        |(deposits, withdrawals, checks, charges, interest, errors)| Adjustments {
            outstanding_deposits: deposits,
            outstanding_withdrawals: withdrawals,
            outstanding_checks: checks,
            bank_charges: charges,
            interest_earned: interest,
            errors,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A statement equal to the adjusted balance always reconciles.
    #[test]
    fn prop_exact_statement_reconciles(book in amount(), adj in adjustments()) {
        let engine = ReconciliationEngine::new(Decimal::new(1, 2));
        let adjusted = ReconciliationEngine::adjusted_balance(book, &adj);
        let result = engine.compute(book, adjusted, &adj);
        prop_assert_eq!(result.state, ReconciliationState::Reconciled);
        prop_assert_eq!(result.difference, Decimal::ZERO);
    }

    /// The difference is symmetric and never negative.
    #[test]
    fn prop_difference_is_absolute(
        book in amount(),
        adj in adjustments(),
        offset_cents in -1_000_000i64..1_000_000,
    ) {
        let engine = ReconciliationEngine::new(Decimal::new(1, 2));
        let adjusted = ReconciliationEngine::adjusted_balance(book, &adj);
        let offset = Decimal::new(offset_cents, 2);
        let result = engine.compute(book, adjusted + offset, &adj);
        prop_assert_eq!(result.difference, offset.abs());
        prop_assert_eq!(
            result.state == ReconciliationState::Reconciled,
            offset.abs() < Decimal::new(1, 2)
        );
    }

    /// Deposits and interest raise the adjusted balance, the rest lower it.
    #[test]
    fn prop_adjustment_signs(book in amount(), delta in amount()) {
        let base = ReconciliationEngine::adjusted_balance(book, &Adjustments::default());
        let up = Adjustments { outstanding_deposits: delta, interest_earned: delta, ..Adjustments::default() };
        let down = Adjustments { outstanding_checks: delta, bank_charges: delta, ..Adjustments::default() };
        prop_assert_eq!(ReconciliationEngine::adjusted_balance(book, &up), base + delta + delta);
        prop_assert_eq!(ReconciliationEngine::adjusted_balance(book, &down), base - delta - delta);
    }
}
