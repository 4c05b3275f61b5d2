//! Voucher workflow management.
//!
//! This module implements the per-variant voucher state machines and the
//! audit events recorded for each transition.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (VoucherAction, Stamp, WorkflowEvent)
//! - `machine` - Status enums and their transition tables
//! - `error` - Workflow-specific error types
//! - `service` - Transition logic

pub mod error;
pub mod machine;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use machine::{JournalStatus, Lifecycle, PaymentStatus, ReconcileStatus, TransferStatus};
pub use service::WorkflowService;
pub use types::{
    DEFAULT_REJECTION_REASON, Stamp, TransitionRequest, VoucherAction, WorkflowEvent,
};
