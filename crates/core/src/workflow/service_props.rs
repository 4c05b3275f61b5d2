//! Property-based tests for the voucher state machines.

use proptest::prelude::*;
use tallybook_shared::types::UserId;

use crate::workflow::machine::{
    JournalStatus, Lifecycle, PaymentStatus, ReconcileStatus, TransferStatus,
};
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{TransitionRequest, VoucherAction};

fn arb_action() -> impl Strategy<Value = VoucherAction> {
    prop::sample::select(VoucherAction::TRANSITIONS.to_vec())
}

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(uuid::Uuid::from_u128(n)))
}

fn check_terminal_is_closed<S: Lifecycle>(status: S, action: VoucherAction) -> bool {
    !status.is_terminal() || status.next(action).is_none()
}

fn check_cancel_and_reject_guard<S: Lifecycle>(status: S) -> bool {
    let cancel = status.next(VoucherAction::Cancel);
    let reject = status.next(VoucherAction::Reject);
    status.is_terminal() == (cancel.is_none() && reject.is_none())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Terminal statuses accept no transition in any variant.
    #[test]
    fn prop_terminal_statuses_are_closed(
        t in prop::sample::select(TransferStatus::ALL.to_vec()),
        p in prop::sample::select(PaymentStatus::ALL.to_vec()),
        j in prop::sample::select(JournalStatus::ALL.to_vec()),
        r in prop::sample::select(ReconcileStatus::ALL.to_vec()),
        action in arb_action(),
    ) {
        prop_assert!(check_terminal_is_closed(t, action));
        prop_assert!(check_terminal_is_closed(p, action));
        prop_assert!(check_terminal_is_closed(j, action));
        prop_assert!(check_terminal_is_closed(r, action));
    }

    /// Reject and cancel are reachable exactly from non-terminal statuses.
    #[test]
    fn prop_reject_cancel_from_any_open_status(
        t in prop::sample::select(TransferStatus::ALL.to_vec()),
        p in prop::sample::select(PaymentStatus::ALL.to_vec()),
        j in prop::sample::select(JournalStatus::ALL.to_vec()),
    ) {
        prop_assert!(check_cancel_and_reject_guard(t));
        prop_assert!(check_cancel_and_reject_guard(p));
        prop_assert!(check_cancel_and_reject_guard(j));
    }

    /// A failed transition reports the current status and the action.
    #[test]
    fn prop_error_names_status_and_action(
        p in prop::sample::select(PaymentStatus::ALL.to_vec()),
        action in arb_action(),
        user in arb_user(),
    ) {
        let result = WorkflowService::transition(p, TransitionRequest::new(action, user));
        match p.next(action) {
            Some(expected) => {
                let event = result.unwrap();
                prop_assert_eq!(event.new_status(), expected);
                prop_assert_eq!(event.stamp().by, user);
            }
            None => {
                let message = result.unwrap_err().to_string();
                prop_assert!(message.contains(p.as_str()));
                prop_assert!(message.contains(action.as_str()));
            }
        }
    }

    /// Completion never leaves a voucher in a non-terminal status.
    #[test]
    fn prop_complete_is_terminal(
        t in prop::sample::select(TransferStatus::ALL.to_vec()),
        j in prop::sample::select(JournalStatus::ALL.to_vec()),
    ) {
        if let Some(next) = t.next(VoucherAction::Complete) {
            prop_assert!(next.is_terminal());
        }
        if let Some(next) = j.next(VoucherAction::Complete) {
            prop_assert_eq!(next, JournalStatus::Posted);
        }
    }
}
