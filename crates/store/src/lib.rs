//! In-memory persistence for Tallybook.
//!
//! This crate provides:
//! - An atomic counter store for identifier generation
//! - One voucher collection per variant with unique indexes
//! - The settlement ledger (purchases, sales, derived payments, journeys)
//! - An account directory and related-document registry
//! - `InMemoryBackend`, wiring all of the above for the voucher services

pub mod backend;
pub mod error;
pub mod repositories;

pub use backend::InMemoryBackend;
pub use error::StoreError;
pub use repositories::{
    InMemoryCounterStore, InMemoryDirectory, InMemorySettlementLedger, InMemoryVoucherRepository,
    Purchase, Sale,
};
