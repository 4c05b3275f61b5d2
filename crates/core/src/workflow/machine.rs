//! Per-variant voucher state machines.
//!
//! Every voucher variant has its own status enum with an explicit
//! `(status, action) -> status` table. A `None` entry means the
//! transition is illegal. The tables are pure and tested in isolation
//! from persistence.
//!
//! Common shape:
//! - `draft → pending/approved → posted|completed` (terminal)
//! - `rejected` and `cancelled` reachable from any non-terminal status
//! - `failed` reachable for bank transfer vouchers
//!
//! Terminal statuses (`completed`, `posted`, `cancelled`) accept no action.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::VoucherAction;

/// Behaviour shared by every voucher status enum.
pub trait Lifecycle:
    Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + Serialize + 'static
{
    /// Every status of the variant, in declaration order.
    const ALL: &'static [Self];

    /// Looks up the transition table.
    ///
    /// Returns `None` when `action` is not allowed from `self`.
    fn next(self, action: VoucherAction) -> Option<Self>;

    /// Returns true if no further action is accepted.
    fn is_terminal(self) -> bool;

    /// Returns the lowercase name of the status.
    fn as_str(self) -> &'static str;

    /// Returns true if reaching this status triggers derived-transaction synthesis.
    fn triggers_settlement(self) -> bool {
        false
    }

    /// Parses a status name case-insensitively.
    fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL.iter().copied().find(|status| status.as_str() == wanted)
    }
}

macro_rules! status_display {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(Lifecycle::as_str(*self))
            }
        }
    };
}

/// Bank account transfer voucher status.
///
/// Approval sends the transfer (back) to `pending`; `failed` records an
/// unsuccessful execution and can be approved again for a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Being drafted.
    Draft,
    /// Awaiting execution.
    Pending,
    /// Funds moved (terminal).
    Completed,
    /// Execution failed.
    Failed,
    /// Rejected by an approver.
    Rejected,
    /// Cancelled (terminal).
    Cancelled,
}

impl Lifecycle for TransferStatus {
    const ALL: &'static [Self] = &[
        Self::Draft,
        Self::Pending,
        Self::Completed,
        Self::Failed,
        Self::Rejected,
        Self::Cancelled,
    ];

    fn next(self, action: VoucherAction) -> Option<Self> {
        use TransferStatus::{Cancelled, Completed, Draft, Failed, Pending, Rejected};
        match (self, action) {
            (Draft | Pending | Failed | Rejected, VoucherAction::Approve) => Some(Pending),
            (Draft | Pending | Failed | Rejected, VoucherAction::Reject) => Some(Rejected),
            (Draft | Pending | Failed, VoucherAction::Complete) => Some(Completed),
            (Draft | Pending | Failed | Rejected, VoucherAction::Cancel) => Some(Cancelled),
            (Draft | Pending | Failed | Rejected, VoucherAction::Fail) => Some(Failed),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

status_display!(TransferStatus);

/// Cash and bank payment voucher status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Being drafted.
    Draft,
    /// Awaiting approval.
    Pending,
    /// Approved (derived payment is synthesized).
    Approved,
    /// Paid out (terminal, derived payment is synthesized).
    Completed,
    /// Rejected by an approver.
    Rejected,
    /// Cancelled (terminal).
    Cancelled,
}

impl Lifecycle for PaymentStatus {
    const ALL: &'static [Self] = &[
        Self::Draft,
        Self::Pending,
        Self::Approved,
        Self::Completed,
        Self::Rejected,
        Self::Cancelled,
    ];

    fn next(self, action: VoucherAction) -> Option<Self> {
        use PaymentStatus::{Approved, Cancelled, Completed, Draft, Pending, Rejected};
        match (self, action) {
            (Draft | Pending | Approved | Rejected, VoucherAction::Approve) => Some(Approved),
            (Draft | Pending | Approved | Rejected, VoucherAction::Reject) => Some(Rejected),
            (Draft | Pending | Approved, VoucherAction::Complete) => Some(Completed),
            (Draft | Pending | Approved | Rejected, VoucherAction::Cancel) => Some(Cancelled),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    fn triggers_settlement(self) -> bool {
        matches!(self, Self::Approved | Self::Completed)
    }
}

status_display!(PaymentStatus);

/// Journal and opening balance voucher status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Being drafted.
    Draft,
    /// Awaiting approval.
    Pending,
    /// Approved, ready for posting.
    Approved,
    /// Posted to the books (terminal).
    Posted,
    /// Rejected by an approver.
    Rejected,
    /// Cancelled (terminal).
    Cancelled,
}

impl Lifecycle for JournalStatus {
    const ALL: &'static [Self] = &[
        Self::Draft,
        Self::Pending,
        Self::Approved,
        Self::Posted,
        Self::Rejected,
        Self::Cancelled,
    ];

    fn next(self, action: VoucherAction) -> Option<Self> {
        use JournalStatus::{Approved, Cancelled, Draft, Pending, Posted, Rejected};
        match (self, action) {
            (Draft | Pending | Approved | Rejected, VoucherAction::Approve) => Some(Approved),
            (Draft | Pending | Approved | Rejected, VoucherAction::Reject) => Some(Rejected),
            (Draft | Pending | Approved, VoucherAction::Complete) => Some(Posted),
            (Draft | Pending | Approved | Rejected, VoucherAction::Cancel) => Some(Cancelled),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Posted | Self::Cancelled)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Posted => "posted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

status_display!(JournalStatus);

/// Bank reconciliation voucher status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileStatus {
    /// Being drafted.
    Draft,
    /// Awaiting review.
    Pending,
    /// Approved by a reviewer.
    Approved,
    /// Statement reconciled (terminal).
    Completed,
    /// Rejected by a reviewer.
    Rejected,
    /// Cancelled (terminal).
    Cancelled,
}

impl Lifecycle for ReconcileStatus {
    const ALL: &'static [Self] = &[
        Self::Draft,
        Self::Pending,
        Self::Approved,
        Self::Completed,
        Self::Rejected,
        Self::Cancelled,
    ];

    fn next(self, action: VoucherAction) -> Option<Self> {
        use ReconcileStatus::{Approved, Cancelled, Completed, Draft, Pending, Rejected};
        match (self, action) {
            (Draft | Pending | Approved | Rejected, VoucherAction::Approve) => Some(Approved),
            (Draft | Pending | Approved | Rejected, VoucherAction::Reject) => Some(Rejected),
            (Draft | Pending | Approved, VoucherAction::Complete) => Some(Completed),
            (Draft | Pending | Approved | Rejected, VoucherAction::Cancel) => Some(Cancelled),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

status_display!(ReconcileStatus);
