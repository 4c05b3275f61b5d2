//! Attributes shared by every voucher variant.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::types::{CurrencyCode, UserId, VoucherId};

use crate::workflow::{Lifecycle, Stamp, WorkflowEvent};

/// Stored attachment metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Attachment {
    /// Location returned by the attachment store.
    pub url: String,
    /// Original file name.
    pub name: String,
    /// MIME type.
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Approval and rejection trail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStatus {
    /// Last approver.
    pub approved_by: Option<UserId>,
    /// Time of the last approval.
    pub approved_at: Option<DateTime<Utc>>,
    /// Last rejecting user.
    pub rejected_by: Option<UserId>,
    /// Time of the last rejection.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Reason of the last rejection.
    pub rejection_reason: Option<String>,
}

/// Cancellation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    /// Who cancelled and when.
    pub stamp: Stamp,
    /// Optional reason.
    pub reason: Option<String>,
}

/// Identifiers assigned once, when a voucher is first persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherIdentity {
    /// Sequential id.
    pub serial: u64,
    /// Date-scoped voucher number.
    pub voucher_number: String,
    /// Short refer code.
    pub refer_code: String,
    /// Transaction id (caller supplied or generated).
    pub transaction_id: String,
}

/// Common voucher attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherHeader {
    /// Primary key.
    pub id: VoucherId,
    /// Sequential id per voucher kind.
    pub serial: u64,
    /// Unique voucher number, never changed once assigned.
    pub voucher_number: String,
    /// Accounting date of the voucher.
    pub voucher_date: DateTime<Utc>,
    /// Voucher currency.
    pub currency: CurrencyCode,
    /// Exchange rate to the functional currency (stored, never revalued).
    pub exchange_rate: Decimal,
    /// External reference.
    pub reference_number: Option<String>,
    /// Unique transaction id, never changed once assigned.
    pub transaction_id: String,
    /// Unique refer code.
    pub refer_code: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Ordered attachment list.
    pub attachments: Vec<Attachment>,
    /// Approval trail.
    pub approval: ApprovalStatus,
    /// Posting or completion actor.
    pub completion: Option<Stamp>,
    /// Cancellation record.
    pub cancellation: Option<Cancellation>,
    /// Creator and sole owner.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete flag.
    pub is_active: bool,
    /// Optimistic concurrency counter, bumped on every write.
    pub version: u64,
}

impl VoucherHeader {
    /// Creates an unnumbered header.
    #[must_use]
    pub fn new(
        created_by: UserId,
        voucher_date: DateTime<Utc>,
        currency: CurrencyCode,
        exchange_rate: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: VoucherId::new(),
            serial: 0,
            voucher_number: String::new(),
            voucher_date,
            currency,
            exchange_rate,
            reference_number: None,
            transaction_id: String::new(),
            refer_code: String::new(),
            description: None,
            attachments: Vec::new(),
            approval: ApprovalStatus::default(),
            completion: None,
            cancellation: None,
            created_by,
            created_at: now,
            updated_at: now,
            is_active: true,
            version: 0,
        }
    }

    /// Returns true once identifiers have been assigned.
    #[must_use]
    pub fn is_numbered(&self) -> bool {
        !self.voucher_number.is_empty()
    }

    /// Assigns generated identifiers.
    pub fn assign(&mut self, identity: VoucherIdentity) {
        self.serial = identity.serial;
        self.voucher_number = identity.voucher_number;
        self.refer_code = identity.refer_code;
        self.transaction_id = identity.transaction_id;
    }

    /// Records the audit trail of a workflow event.
    pub fn record<S: Lifecycle>(&mut self, event: &WorkflowEvent<S>) {
        match event {
            WorkflowEvent::Approved { stamp, .. } => {
                self.approval.approved_by = Some(stamp.by);
                self.approval.approved_at = Some(stamp.at);
            }
            WorkflowEvent::Rejected { stamp, reason, .. } => {
                self.approval.rejected_by = Some(stamp.by);
                self.approval.rejected_at = Some(stamp.at);
                self.approval.rejection_reason = Some(reason.clone());
            }
            WorkflowEvent::Completed { stamp, .. } => {
                self.completion = Some(*stamp);
            }
            WorkflowEvent::Cancelled { stamp, reason, .. } => {
                self.cancellation = Some(Cancellation {
                    stamp: *stamp,
                    reason: reason.clone(),
                });
            }
            WorkflowEvent::Failed { .. } => {}
        }
        self.touch(event.stamp().at);
    }

    /// Updates the modification time.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}
