//! Settlement ledger capability: where derived records live.

use std::future::Future;

use rust_decimal::Decimal;
use tallybook_shared::types::{CustomerId, SaleId, SupplierId};

use super::error::SettlementError;
use super::types::{
    CustomerPayment, FinancialPayment, JourneyEntry, SalePaymentStatus, SaleSummary,
    SupplierPayment,
};

/// Balance aggregates and sinks for derived records.
///
/// Aggregates are read at call time. Under concurrent payments against the
/// same party they may be stale by the time a new record is written; every
/// write recomputes them fresh rather than trusting stored totals.
pub trait SettlementLedger: Send + Sync {
    /// Total purchased from a supplier.
    fn supplier_purchase_total(
        &self,
        supplier: SupplierId,
    ) -> impl Future<Output = Result<Decimal, SettlementError>> + Send;

    /// Sum of non-cancelled payments to a supplier.
    fn supplier_paid_total(
        &self,
        supplier: SupplierId,
    ) -> impl Future<Output = Result<Decimal, SettlementError>> + Send;

    /// Total sold to a customer.
    fn customer_sales_total(
        &self,
        customer: CustomerId,
    ) -> impl Future<Output = Result<Decimal, SettlementError>> + Send;

    /// Sum of non-cancelled payments from a customer.
    fn customer_paid_total(
        &self,
        customer: CustomerId,
    ) -> impl Future<Output = Result<Decimal, SettlementError>> + Send;

    /// Sale total and paid-to-date, `None` for unknown sales.
    fn sale_summary(
        &self,
        sale: SaleId,
    ) -> impl Future<Output = Result<Option<SaleSummary>, SettlementError>> + Send;

    /// Stores a sale's payment status.
    fn set_sale_payment_status(
        &self,
        sale: SaleId,
        status: SalePaymentStatus,
    ) -> impl Future<Output = Result<(), SettlementError>> + Send;

    /// Stores a supplier payment.
    fn insert_supplier_payment(
        &self,
        payment: SupplierPayment,
    ) -> impl Future<Output = Result<(), SettlementError>> + Send;

    /// Stores a customer payment.
    fn insert_customer_payment(
        &self,
        payment: CustomerPayment,
    ) -> impl Future<Output = Result<(), SettlementError>> + Send;

    /// Stores a financial payment.
    fn insert_financial_payment(
        &self,
        payment: FinancialPayment,
    ) -> impl Future<Output = Result<(), SettlementError>> + Send;

    /// Appends a journey entry.
    fn append_journey(
        &self,
        entry: JourneyEntry,
    ) -> impl Future<Output = Result<(), SettlementError>> + Send;
}
