//! In-memory implementations of the core repository and collaborator traits.

pub mod counter;
pub mod directory;
pub mod settlement;
pub mod voucher;

pub use counter::InMemoryCounterStore;
pub use directory::InMemoryDirectory;
pub use settlement::{InMemorySettlementLedger, Purchase, Sale};
pub use voucher::InMemoryVoucherRepository;
