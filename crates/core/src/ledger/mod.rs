//! Double-entry bookkeeping rules for journal-style vouchers.
//!
//! - `types` - Entry input and validated entry types
//! - `validation` - Structural and balance validation
//! - `error` - Validation errors

pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use types::{EntryInput, EntryRules, JournalEntry, ValidatedEntries, entry_totals};
pub use validation::{check_balance, validate_entries};
