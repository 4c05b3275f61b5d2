//! Bank statement reconciliation.

pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::{ReconciliationEngine, summarize_entries};
pub use error::ReconciliationError;
pub use types::{
    Adjustments, EntryMatchStatus, MatchedTransaction, ReconciliationEntry, ReconciliationResult,
    ReconciliationState, StatementType,
};
