//! Journal and opening balance vouchers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::header::VoucherHeader;
use super::{Voucher, VoucherKind};
use crate::ledger::{EntryRules, JournalEntry, ValidatedEntries};
use crate::workflow::JournalStatus;

/// Which journal-style variant a voucher is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalKind {
    /// Balanced journal voucher.
    Journal,
    /// Opening balance voucher.
    OpeningBalance,
}

impl JournalKind {
    /// Entry rules for the variant.
    #[must_use]
    pub const fn rules(self) -> EntryRules {
        match self {
            Self::Journal => EntryRules::JOURNAL,
            Self::OpeningBalance => EntryRules::OPENING_BALANCE,
        }
    }

    /// Voucher kind for the variant.
    #[must_use]
    pub const fn kind(self) -> VoucherKind {
        match self {
            Self::Journal => VoucherKind::Journal,
            Self::OpeningBalance => VoucherKind::OpeningBalance,
        }
    }
}

/// A journal-style voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalVoucher {
    /// Shared attributes.
    pub header: VoucherHeader,
    /// Workflow status.
    pub status: JournalStatus,
    /// Journal or opening balance.
    pub journal_kind: JournalKind,
    /// Ordered entries.
    pub entries: Vec<JournalEntry>,
    /// Cached sum of debits.
    pub total_debit: Decimal,
    /// Cached sum of credits.
    pub total_credit: Decimal,
}

impl JournalVoucher {
    /// Replaces the entries with a validated list and refreshes totals.
    pub fn replace_entries(&mut self, validated: ValidatedEntries) {
        self.entries = validated.entries;
        self.total_debit = validated.total_debit;
        self.total_credit = validated.total_credit;
    }
}

impl Voucher for JournalVoucher {
    type Status = JournalStatus;

    fn kind(&self) -> VoucherKind {
        self.journal_kind.kind()
    }

    fn header(&self) -> &VoucherHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut VoucherHeader {
        &mut self.header
    }

    fn status(&self) -> JournalStatus {
        self.status
    }

    fn set_status(&mut self, status: JournalStatus) {
        self.status = status;
    }
}
