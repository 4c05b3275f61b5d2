//! Workflow service for voucher state transitions.
//!
//! This module applies the per-variant transition tables and produces the
//! audit event that a persisted voucher records. It never touches storage.

use crate::workflow::error::WorkflowError;
use crate::workflow::machine::Lifecycle;
use crate::workflow::types::{
    DEFAULT_REJECTION_REASON, Stamp, TransitionRequest, VoucherAction, WorkflowEvent,
};

/// Stateless service for voucher workflow transitions.
///
/// All methods are associated functions that validate a transition against
/// the variant's table and return the matching `WorkflowEvent`. A failed
/// check returns `WorkflowError::InvalidTransition` and mutates nothing.
pub struct WorkflowService;

impl WorkflowService {
    /// Approve a voucher.
    ///
    /// # Returns
    /// * `Ok(WorkflowEvent::Approved)` if the status allows approval
    /// * `Err(WorkflowError::InvalidTransition)` otherwise
    pub fn approve<S: Lifecycle>(current: S, stamp: Stamp) -> Result<WorkflowEvent<S>, WorkflowError> {
        let new_status = Self::target(current, VoucherAction::Approve)?;
        Ok(WorkflowEvent::Approved { new_status, stamp })
    }

    /// Reject a voucher.
    ///
    /// A missing or blank reason is recorded as `"No reason provided"`.
    pub fn reject<S: Lifecycle>(
        current: S,
        stamp: Stamp,
        reason: Option<String>,
    ) -> Result<WorkflowEvent<S>, WorkflowError> {
        let new_status = Self::target(current, VoucherAction::Reject)?;
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());
        Ok(WorkflowEvent::Rejected {
            new_status,
            stamp,
            reason,
        })
    }

    /// Post or complete a voucher (terminal).
    pub fn complete<S: Lifecycle>(current: S, stamp: Stamp) -> Result<WorkflowEvent<S>, WorkflowError> {
        let new_status = Self::target(current, VoucherAction::Complete)?;
        Ok(WorkflowEvent::Completed { new_status, stamp })
    }

    /// Cancel a voucher (terminal).
    pub fn cancel<S: Lifecycle>(
        current: S,
        stamp: Stamp,
        reason: Option<String>,
    ) -> Result<WorkflowEvent<S>, WorkflowError> {
        let new_status = Self::target(current, VoucherAction::Cancel)?;
        Ok(WorkflowEvent::Cancelled {
            new_status,
            stamp,
            reason: reason.filter(|r| !r.trim().is_empty()),
        })
    }

    /// Record a failed execution.
    ///
    /// Only variants whose table defines `fail` accept this.
    pub fn fail<S: Lifecycle>(
        current: S,
        stamp: Stamp,
        reason: String,
    ) -> Result<WorkflowEvent<S>, WorkflowError> {
        let new_status = Self::target(current, VoucherAction::Fail)?;
        Ok(WorkflowEvent::Failed {
            new_status,
            stamp,
            reason,
        })
    }

    /// Dispatches a transition request to the matching operation.
    ///
    /// Non-transition actions (`update`, `delete`, `reconcile`) are rejected.
    pub fn transition<S: Lifecycle>(
        current: S,
        request: TransitionRequest,
    ) -> Result<WorkflowEvent<S>, WorkflowError> {
        let stamp = Stamp {
            by: request.actor,
            at: request.at,
        };
        match request.action {
            VoucherAction::Approve => Self::approve(current, stamp),
            VoucherAction::Reject => Self::reject(current, stamp, request.reason),
            VoucherAction::Complete => Self::complete(current, stamp),
            VoucherAction::Cancel => Self::cancel(current, stamp, request.reason),
            VoucherAction::Fail => Self::fail(
                current,
                stamp,
                request.reason.unwrap_or_else(|| "Unknown failure".to_string()),
            ),
            action @ (VoucherAction::Update | VoucherAction::Delete | VoucherAction::Reconcile) => {
                Err(WorkflowError::invalid(current, action))
            }
        }
    }

    /// Checks that a voucher in `current` may still be edited or deleted.
    pub fn ensure_mutable<S: Lifecycle>(current: S, action: VoucherAction) -> Result<(), WorkflowError> {
        if current.is_terminal() {
            return Err(WorkflowError::invalid(current, action));
        }
        Ok(())
    }

    /// Returns the status `action` leads to from `current`.
    fn target<S: Lifecycle>(current: S, action: VoucherAction) -> Result<S, WorkflowError> {
        current
            .next(action)
            .ok_or_else(|| WorkflowError::invalid(current, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::machine::{JournalStatus, PaymentStatus, TransferStatus};
    use tallybook_shared::types::UserId;

    fn stamp() -> Stamp {
        Stamp::now(UserId::new())
    }

    #[test]
    fn test_approve_transfer_returns_to_pending() {
        let event = WorkflowService::approve(TransferStatus::Failed, stamp()).unwrap();
        assert_eq!(event.new_status(), TransferStatus::Pending);
        assert_eq!(event.action(), VoucherAction::Approve);
    }

    #[test]
    fn test_reject_defaults_reason() {
        let event = WorkflowService::reject(PaymentStatus::Pending, stamp(), None).unwrap();
        match event {
            WorkflowEvent::Rejected { reason, new_status, .. } => {
                assert_eq!(reason, DEFAULT_REJECTION_REASON);
                assert_eq!(new_status, PaymentStatus::Rejected);
            }
            other => panic!("unexpected event {other:?}"),
        }

        let event =
            WorkflowService::reject(PaymentStatus::Pending, stamp(), Some("   ".into())).unwrap();
        assert!(matches!(
            event,
            WorkflowEvent::Rejected { ref reason, .. } if reason == DEFAULT_REJECTION_REASON
        ));
    }

    #[test]
    fn test_complete_journal_posts() {
        let event = WorkflowService::complete(JournalStatus::Approved, stamp()).unwrap();
        assert_eq!(event.new_status(), JournalStatus::Posted);
    }

    #[test]
    fn test_completed_voucher_rejects_everything() {
        for action in VoucherAction::TRANSITIONS {
            let request = TransitionRequest::new(action, UserId::new());
            let err = WorkflowService::transition(PaymentStatus::Completed, request).unwrap_err();
            assert_eq!(err, WorkflowError::invalid("completed", action));
        }
        assert!(WorkflowService::ensure_mutable(PaymentStatus::Completed, VoucherAction::Update).is_err());
    }

    #[test]
    fn test_fail_not_defined_for_payments() {
        let err = WorkflowService::fail(PaymentStatus::Draft, stamp(), "timeout".into()).unwrap_err();
        assert!(err.to_string().contains("fail"));
        assert!(err.to_string().contains("draft"));
    }

    #[test]
    fn test_transition_rejects_non_table_actions() {
        let request = TransitionRequest::new(VoucherAction::Reconcile, UserId::new());
        assert!(WorkflowService::transition(JournalStatus::Draft, request).is_err());
    }

    #[test]
    fn test_ensure_mutable_allows_rejected() {
        assert!(WorkflowService::ensure_mutable(TransferStatus::Rejected, VoucherAction::Update).is_ok());
        assert!(WorkflowService::ensure_mutable(JournalStatus::Posted, VoucherAction::Delete).is_err());
    }
}
