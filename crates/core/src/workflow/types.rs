//! Workflow domain types for voucher lifecycle management.
//!
//! This module defines the actions a caller can attempt on a voucher and
//! the audit events produced by a successful transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tallybook_shared::types::UserId;

use super::machine::Lifecycle;

/// Reason recorded when a rejection does not state one.
pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

/// An operation attempted on a voucher.
///
/// The first five are state-machine transitions. The remaining ones are
/// guarded by the same terminal-status rules and appear in state errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherAction {
    /// Approve the voucher.
    Approve,
    /// Reject the voucher.
    Reject,
    /// Post or complete the voucher (terminal).
    Complete,
    /// Cancel the voucher (terminal).
    Cancel,
    /// Record a failed execution (bank transfers only).
    Fail,
    /// Edit voucher fields.
    Update,
    /// Soft-delete the voucher.
    Delete,
    /// Reconcile a bank statement.
    Reconcile,
}

impl VoucherAction {
    /// Transitions handled by the per-variant tables.
    pub const TRANSITIONS: [Self; 5] = [
        Self::Approve,
        Self::Reject,
        Self::Complete,
        Self::Cancel,
        Self::Fail,
    ];

    /// Returns the string representation of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::Fail => "fail",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Reconcile => "reconcile",
        }
    }
}

impl fmt::Display for VoucherAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who performed a step and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    /// Acting user.
    pub by: UserId,
    /// Time of the step.
    pub at: DateTime<Utc>,
}

impl Stamp {
    /// Creates a stamp for `by` at the current time.
    #[must_use]
    pub fn now(by: UserId) -> Self {
        Self { by, at: Utc::now() }
    }
}

/// Request to move a voucher through its workflow.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    /// The attempted transition.
    pub action: VoucherAction,
    /// The acting user.
    pub actor: UserId,
    /// Optional reason (rejection, cancellation, failure).
    pub reason: Option<String>,
    /// Time of the request.
    pub at: DateTime<Utc>,
}

impl TransitionRequest {
    /// Creates a request stamped with the current time.
    #[must_use]
    pub fn new(action: VoucherAction, actor: UserId) -> Self {
        Self {
            action,
            actor,
            reason: None,
            at: Utc::now(),
        }
    }

    /// Attaches a reason to the request.
    #[must_use]
    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }
}

/// Audit event produced by a successful transition.
///
/// Each variant captures the resulting status and who/when/why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent<S: Lifecycle> {
    /// Voucher approved.
    Approved {
        /// Status after approval.
        new_status: S,
        /// Approver and time.
        stamp: Stamp,
    },
    /// Voucher rejected.
    Rejected {
        /// Status after rejection.
        new_status: S,
        /// Rejecting user and time.
        stamp: Stamp,
        /// Recorded reason.
        reason: String,
    },
    /// Voucher posted or completed.
    Completed {
        /// Terminal status.
        new_status: S,
        /// Posting actor and time.
        stamp: Stamp,
    },
    /// Voucher cancelled.
    Cancelled {
        /// Terminal status.
        new_status: S,
        /// Cancelling user and time.
        stamp: Stamp,
        /// Optional reason.
        reason: Option<String>,
    },
    /// Transfer execution failed.
    Failed {
        /// Status after the failure.
        new_status: S,
        /// Reporting user and time.
        stamp: Stamp,
        /// Failure reason.
        reason: String,
    },
}

impl<S: Lifecycle> WorkflowEvent<S> {
    /// Returns the new status resulting from this event.
    #[must_use]
    pub fn new_status(&self) -> S {
        match self {
            Self::Approved { new_status, .. }
            | Self::Rejected { new_status, .. }
            | Self::Completed { new_status, .. }
            | Self::Cancelled { new_status, .. }
            | Self::Failed { new_status, .. } => *new_status,
        }
    }

    /// Returns the stamp of this event.
    #[must_use]
    pub fn stamp(&self) -> Stamp {
        match self {
            Self::Approved { stamp, .. }
            | Self::Rejected { stamp, .. }
            | Self::Completed { stamp, .. }
            | Self::Cancelled { stamp, .. }
            | Self::Failed { stamp, .. } => *stamp,
        }
    }

    /// Returns the action that produced this event.
    #[must_use]
    pub fn action(&self) -> VoucherAction {
        match self {
            Self::Approved { .. } => VoucherAction::Approve,
            Self::Rejected { .. } => VoucherAction::Reject,
            Self::Completed { .. } => VoucherAction::Complete,
            Self::Cancelled { .. } => VoucherAction::Cancel,
            Self::Failed { .. } => VoucherAction::Fail,
        }
    }
}
