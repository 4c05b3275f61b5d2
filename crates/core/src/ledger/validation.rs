//! Double-entry validation for journal-style vouchers.
//!
//! Validation is pure: it never touches storage and is run both when a
//! voucher is created and whenever its entries are replaced.

use rust_decimal::Decimal;
use tallybook_shared::error::FieldError;
use tallybook_shared::types::within_tolerance;

use super::error::LedgerError;
use super::types::{EntryInput, EntryRules, JournalEntry, ValidatedEntries};
use crate::voucher::account::{AccountKind, AccountRef};

/// Validates and normalizes an entry list.
///
/// Rules, in order:
/// 1. at least `rules.min_entries` entries
/// 2. every account model tag resolves to a known `AccountKind`
/// 3. debit and credit are non-negative and exactly one is positive
/// 4. if `rules.require_balance`, `|Σdebit − Σcredit| <= tolerance`
///
/// Every per-entry problem is reported, not just the first.
///
/// # Errors
///
/// Returns the first failing rule group as a `LedgerError`.
pub fn validate_entries(
    inputs: &[EntryInput],
    rules: EntryRules,
    tolerance: Decimal,
) -> Result<ValidatedEntries, LedgerError> {
    if inputs.len() < rules.min_entries {
        return Err(LedgerError::InsufficientEntries {
            min: rules.min_entries,
            actual: inputs.len(),
        });
    }

    let mut problems = Vec::new();
    let mut entries = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        if let Some(entry) = validate_entry(index, input, &mut problems) {
            entries.push(entry);
        }
    }

    if !problems.is_empty() {
        return Err(LedgerError::InvalidEntries(problems));
    }

    let (total_debit, total_credit) = super::types::entry_totals(&entries);

    if rules.require_balance {
        check_balance(total_debit, total_credit, tolerance)?;
    }

    Ok(ValidatedEntries {
        entries,
        total_debit,
        total_credit,
    })
}

/// Checks that debits and credits agree within `tolerance`.
///
/// # Errors
///
/// Returns `LedgerError::Unbalanced` reporting both totals.
pub fn check_balance(debit: Decimal, credit: Decimal, tolerance: Decimal) -> Result<(), LedgerError> {
    if within_tolerance(debit, credit, tolerance) {
        Ok(())
    } else {
        Err(LedgerError::Unbalanced { debit, credit })
    }
}

fn validate_entry(
    index: usize,
    input: &EntryInput,
    problems: &mut Vec<FieldError>,
) -> Option<JournalEntry> {
    let field = |name: &str| format!("entries[{index}].{name}");
    let before = problems.len();

    let kind = AccountKind::normalize(&input.account_model);
    if kind.is_none() {
        problems.push(FieldError::new(
            field("account_model"),
            format!("unknown account model '{}'", input.account_model),
        ));
    }

    if input.debit.is_sign_negative() && !input.debit.is_zero() {
        problems.push(FieldError::new(field("debit"), "must not be negative"));
    }
    if input.credit.is_sign_negative() && !input.credit.is_zero() {
        problems.push(FieldError::new(field("credit"), "must not be negative"));
    }

    let debit_positive = input.debit > Decimal::ZERO;
    let credit_positive = input.credit > Decimal::ZERO;
    if debit_positive == credit_positive && problems.len() == before {
        problems.push(FieldError::new(
            field("amount"),
            "exactly one of debit or credit must be greater than zero",
        ));
    }

    if problems.len() > before {
        return None;
    }

    let kind = kind?;
    Some(JournalEntry {
        account: AccountRef::new(kind, input.account),
        account_name: input.account_name.clone().unwrap_or_default(),
        debit: input.debit,
        credit: input.credit,
        description: input.description.clone(),
    })
}
