//! Property-based tests for double-entry validation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{EntryInput, EntryRules};
use super::validation::validate_entries;
use crate::voucher::account::AccountKind;

fn tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Amounts from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn account_model() -> impl Strategy<Value = String> {
    prop::sample::select(AccountKind::ALL.to_vec()).prop_map(|k| k.as_str().to_lowercase())
}

fn debit(model: String, amount: Decimal) -> EntryInput {
    EntryInput {
        account: Uuid::now_v7(),
        account_model: model,
        account_name: None,
        debit: amount,
        credit: Decimal::ZERO,
        description: None,
    }
}

fn credit(model: String, amount: Decimal) -> EntryInput {
    EntryInput {
        credit: amount,
        debit: Decimal::ZERO,
        ..debit(model, Decimal::ZERO)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any split of a debit total into credits is accepted and totals are cached.
    #[test]
    fn prop_balanced_split_accepted(
        amounts in prop::collection::vec(positive_amount(), 1..6),
        model in account_model(),
    ) {
        let total: Decimal = amounts.iter().copied().sum();
        let mut entries = vec![debit(model.clone(), total)];
        entries.extend(amounts.iter().map(|a| credit(model.clone(), *a)));

        let validated = validate_entries(&entries, EntryRules::JOURNAL, tolerance()).unwrap();
        prop_assert_eq!(validated.total_debit, total);
        prop_assert_eq!(validated.total_credit, total);
        prop_assert_eq!(validated.entries.len(), entries.len());
    }

    /// A difference larger than the tolerance is rejected with both totals.
    #[test]
    fn prop_unbalanced_rejected(
        amount in positive_amount(),
        extra_cents in 2i64..1_000_000,
        model in account_model(),
    ) {
        let bigger = amount + Decimal::new(extra_cents, 2);
        let entries = vec![debit(model.clone(), bigger), credit(model, amount)];

        let result = validate_entries(&entries, EntryRules::JOURNAL, tolerance());
        prop_assert_eq!(
            result.unwrap_err(),
            LedgerError::Unbalanced { debit: bigger, credit: amount }
        );
    }

    /// Both-sided entries are always rejected.
    #[test]
    fn prop_both_sides_rejected(a in positive_amount(), b in positive_amount()) {
        let mut entry = debit("asset".into(), a);
        entry.credit = b;
        let entries = vec![entry, credit("asset".into(), a)];

        let result = validate_entries(&entries, EntryRules::JOURNAL, tolerance());
        prop_assert!(matches!(result, Err(LedgerError::InvalidEntries(_))));
    }

    /// Opening balances accept any non-empty single-sided list.
    #[test]
    fn prop_opening_balance_single_sided(
        amounts in prop::collection::vec(positive_amount(), 1..5),
    ) {
        let entries: Vec<_> = amounts.iter().map(|a| debit("asset".into(), *a)).collect();
        prop_assert!(validate_entries(&entries, EntryRules::OPENING_BALANCE, tolerance()).is_ok());
        if entries.len() < 2 {
            prop_assert!(validate_entries(&entries, EntryRules::JOURNAL, tolerance()).is_err());
        }
    }
}
