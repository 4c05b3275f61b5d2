//! Core business logic for Tallybook.
//!
//! This crate contains the voucher ledger engine with ZERO web or database
//! dependencies. Persistence and collaborators are traits implemented
//! elsewhere.
//!
//! # Modules
//!
//! - `voucher` - Voucher data model shared by all variants
//! - `ledger` - Double-entry validation of journal entries
//! - `workflow` - Per-variant state machines
//! - `numbering` - Serials, refer codes and voucher numbers
//! - `settlement` - Derived transactions synthesized from payments
//! - `reconciliation` - Bank statement reconciliation arithmetic
//! - `storage` - Attachment storage on OpenDAL
//! - `directory` / `repository` - Collaborator and persistence traits
//! - `service` - Voucher operations tying everything together

pub mod directory;
pub mod ledger;
pub mod numbering;
pub mod reconciliation;
pub mod repository;
pub mod service;
pub mod settlement;
pub mod storage;
pub mod voucher;
pub mod workflow;
