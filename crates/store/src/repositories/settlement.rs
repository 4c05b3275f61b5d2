//! Purchases, sales and the records derived from payment vouchers.
//!
//! Aggregates are recomputed from the stored records on every call; no
//! running totals are kept.

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_core::settlement::{
    CustomerPayment, FinancialPayment, JourneyEntry, SalePaymentStatus, SaleSummary,
    SettlementError, SettlementLedger, SupplierPayment,
};
use tallybook_shared::types::{CustomerId, PaymentId, PurchaseId, SaleId, SupplierId};
use tokio::sync::RwLock;

/// A purchase from a supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Primary key.
    pub id: PurchaseId,
    /// Supplier.
    pub supplier: SupplierId,
    /// Purchase total.
    pub total: Decimal,
}

/// A sale to a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// Primary key.
    pub id: SaleId,
    /// Customer.
    pub customer: CustomerId,
    /// Sale total.
    pub total: Decimal,
    /// Payment status, maintained by settlement.
    pub payment_status: SalePaymentStatus,
}

/// In-memory settlement ledger.
#[derive(Debug, Default)]
pub struct InMemorySettlementLedger {
    purchases: DashMap<PurchaseId, Purchase>,
    sales: DashMap<SaleId, Sale>,
    supplier_payments: RwLock<Vec<SupplierPayment>>,
    customer_payments: RwLock<Vec<CustomerPayment>>,
    financial_payments: RwLock<Vec<FinancialPayment>>,
    journeys: RwLock<Vec<JourneyEntry>>,
}

impl InMemorySettlementLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a purchase.
    pub fn add_purchase(&self, supplier: SupplierId, total: Decimal) -> Purchase {
        let purchase = Purchase {
            id: PurchaseId::new(),
            supplier,
            total,
        };
        self.purchases.insert(purchase.id, purchase);
        purchase
    }

    /// Records a sale.
    pub fn add_sale(&self, customer: CustomerId, total: Decimal) -> Sale {
        let sale = Sale {
            id: SaleId::new(),
            customer,
            total,
            payment_status: SalePaymentStatus::Unpaid,
        };
        self.sales.insert(sale.id, sale);
        sale
    }

    /// Returns a sale.
    #[must_use]
    pub fn sale(&self, id: SaleId) -> Option<Sale> {
        self.sales.get(&id).map(|sale| *sale)
    }

    /// Returns true if the purchase exists.
    #[must_use]
    pub fn has_purchase(&self, id: PurchaseId) -> bool {
        self.purchases.contains_key(&id)
    }

    /// Returns true if the sale exists.
    #[must_use]
    pub fn has_sale(&self, id: SaleId) -> bool {
        self.sales.contains_key(&id)
    }

    /// Returns true if a derived payment with this id exists.
    pub async fn has_payment(&self, id: PaymentId) -> bool {
        self.supplier_payments.read().await.iter().any(|p| p.record.id == id)
            || self.customer_payments.read().await.iter().any(|p| p.record.id == id)
            || self.financial_payments.read().await.iter().any(|p| p.record.id == id)
    }

    /// All supplier payments, in creation order.
    pub async fn supplier_payments(&self) -> Vec<SupplierPayment> {
        self.supplier_payments.read().await.clone()
    }

    /// All customer payments, in creation order.
    pub async fn customer_payments(&self) -> Vec<CustomerPayment> {
        self.customer_payments.read().await.clone()
    }

    /// All financial payments, in creation order.
    pub async fn financial_payments(&self) -> Vec<FinancialPayment> {
        self.financial_payments.read().await.clone()
    }

    /// All journey entries, in creation order.
    pub async fn journeys(&self) -> Vec<JourneyEntry> {
        self.journeys.read().await.clone()
    }
}

impl SettlementLedger for InMemorySettlementLedger {
    async fn supplier_purchase_total(&self, supplier: SupplierId) -> Result<Decimal, SettlementError> {
        Ok(self
            .purchases
            .iter()
            .filter(|purchase| purchase.supplier == supplier)
            .map(|purchase| purchase.total)
            .sum())
    }

    async fn supplier_paid_total(&self, supplier: SupplierId) -> Result<Decimal, SettlementError> {
        Ok(self
            .supplier_payments
            .read()
            .await
            .iter()
            .filter(|payment| payment.supplier == supplier && !payment.record.is_cancelled)
            .map(|payment| payment.record.amount)
            .sum())
    }

    async fn customer_sales_total(&self, customer: CustomerId) -> Result<Decimal, SettlementError> {
        Ok(self
            .sales
            .iter()
            .filter(|sale| sale.customer == customer)
            .map(|sale| sale.total)
            .sum())
    }

    async fn customer_paid_total(&self, customer: CustomerId) -> Result<Decimal, SettlementError> {
        Ok(self
            .customer_payments
            .read()
            .await
            .iter()
            .filter(|payment| payment.customer == customer && !payment.record.is_cancelled)
            .map(|payment| payment.record.amount)
            .sum())
    }

    async fn sale_summary(&self, sale: SaleId) -> Result<Option<SaleSummary>, SettlementError> {
        let Some(total) = self.sales.get(&sale).map(|s| s.total) else {
            return Ok(None);
        };
        let paid = self
            .customer_payments
            .read()
            .await
            .iter()
            .filter(|payment| payment.related_sale == Some(sale) && !payment.record.is_cancelled)
            .map(|payment| payment.record.amount)
            .sum();
        Ok(Some(SaleSummary { total, paid }))
    }

    async fn set_sale_payment_status(
        &self,
        sale: SaleId,
        status: SalePaymentStatus,
    ) -> Result<(), SettlementError> {
        let mut entry = self
            .sales
            .get_mut(&sale)
            .ok_or_else(|| SettlementError::ledger(format!("sale not found: {sale}")))?;
        entry.payment_status = status;
        Ok(())
    }

    async fn insert_supplier_payment(&self, payment: SupplierPayment) -> Result<(), SettlementError> {
        self.supplier_payments.write().await.push(payment);
        Ok(())
    }

    async fn insert_customer_payment(&self, payment: CustomerPayment) -> Result<(), SettlementError> {
        self.customer_payments.write().await.push(payment);
        Ok(())
    }

    async fn insert_financial_payment(&self, payment: FinancialPayment) -> Result<(), SettlementError> {
        self.financial_payments.write().await.push(payment);
        Ok(())
    }

    async fn append_journey(&self, entry: JourneyEntry) -> Result<(), SettlementError> {
        self.journeys.write().await.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_purchase_total_per_supplier() {
        let ledger = InMemorySettlementLedger::new();
        let supplier = SupplierId::new();
        ledger.add_purchase(supplier, dec!(1000));
        ledger.add_purchase(supplier, dec!(500));
        ledger.add_purchase(SupplierId::new(), dec!(999));

        assert_eq!(ledger.supplier_purchase_total(supplier).await.unwrap(), dec!(1500));
        assert_eq!(ledger.supplier_paid_total(supplier).await.unwrap(), dec!(0));
    }

    #[tokio::test]
    async fn test_sale_summary_and_status() {
        let ledger = InMemorySettlementLedger::new();
        let sale = ledger.add_sale(CustomerId::new(), dec!(300));

        let summary = ledger.sale_summary(sale.id).await.unwrap().unwrap();
        assert_eq!(summary.total, dec!(300));
        assert_eq!(summary.paid, dec!(0));

        ledger
            .set_sale_payment_status(sale.id, SalePaymentStatus::Partial)
            .await
            .unwrap();
        assert_eq!(ledger.sale(sale.id).unwrap().payment_status, SalePaymentStatus::Partial);

        assert!(ledger.sale_summary(SaleId::new()).await.unwrap().is_none());
        assert!(
            ledger
                .set_sale_payment_status(SaleId::new(), SalePaymentStatus::Paid)
                .await
                .is_err()
        );
    }
}
