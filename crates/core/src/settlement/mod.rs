//! Derived-transaction synthesis for payment vouchers.
//!
//! - `types` - Derived payment, journey and outcome types
//! - `balance` - Running balance arithmetic and narratives
//! - `ledger` - Storage capability for derived records
//! - `locks` - Per-voucher mutual exclusion
//! - `engine` - The settlement sequence
//! - `error` - Settlement errors
//!
//! A failed payment insert releases the voucher's link so a retry creates
//! the record afresh. A journey or sale-status failure after the payment
//! is stored keeps the link, and the missing follow-up is not replayed.

pub mod balance;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod locks;
pub mod types;

pub use balance::{BalanceAfter, BalanceSnapshot, narrative, sale_payment_status};
pub use engine::SettlementEngine;
pub use error::SettlementError;
pub use ledger::SettlementLedger;
pub use locks::VoucherLocks;
pub use types::{
    CustomerPayment, DerivedRecord, FinancialPayment, JourneyEntry, JourneyParty, PaymentRecord,
    SalePaymentStatus, SaleSummary, SettlementOutcome, SupplierPayment,
};
