//! Domain types for journal-style entry lists.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::voucher::account::AccountRef;

/// Raw entry as received at the boundary.
///
/// The account model tag is still an unnormalized alias here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryInput {
    /// Referenced account id.
    pub account: Uuid,
    /// Account model tag alias (e.g. `bankaccount`).
    pub account_model: String,
    /// Display name of the account.
    #[serde(default)]
    pub account_name: Option<String>,
    /// Debit amount.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount.
    #[serde(default)]
    pub credit: Decimal,
    /// Line description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A validated journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Normalized account reference.
    pub account: AccountRef,
    /// Display name of the account.
    pub account_name: String,
    /// Debit amount (zero on credit lines).
    pub debit: Decimal,
    /// Credit amount (zero on debit lines).
    pub credit: Decimal,
    /// Line description.
    pub description: Option<String>,
}

/// Structural rules for an entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRules {
    /// Minimum number of entries.
    pub min_entries: usize,
    /// Whether total debits must equal total credits.
    pub require_balance: bool,
}

impl EntryRules {
    /// Journal vouchers: at least two lines, balanced.
    pub const JOURNAL: Self = Self {
        min_entries: 2,
        require_balance: true,
    };

    /// Opening balance vouchers: at least one single-sided line.
    pub const OPENING_BALANCE: Self = Self {
        min_entries: 1,
        require_balance: false,
    };
}

/// Validated entries with their cached totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEntries {
    /// Normalized entries, in input order.
    pub entries: Vec<JournalEntry>,
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
}

/// Sums debits and credits of a validated list.
#[must_use]
pub fn entry_totals(entries: &[JournalEntry]) -> (Decimal, Decimal) {
    entries.iter().fold((Decimal::ZERO, Decimal::ZERO), |(d, c), e| {
        (d + e.debit, c + e.credit)
    })
}
