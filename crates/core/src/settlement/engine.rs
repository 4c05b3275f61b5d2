//! Derived-transaction engine.
//!
//! When a payment voucher is approved or completed, exactly one downstream
//! record is synthesized from it, depending on the payee:
//!
//! | Payee       | Record                                       |
//! |-------------|----------------------------------------------|
//! | supplier    | supplier payment + journey entry             |
//! | customer    | customer payment + journey entry (+ sale)    |
//! | financial   | financial payment tagged with the category   |
//! | other       | nothing                                      |
//!
//! The sequence re-read → check link → claim link → insert payment →
//! journey runs under a per-voucher lock, so concurrent completions create
//! at most one record.

use std::sync::Arc;

use chrono::Utc;
use tallybook_shared::types::{CustomerId, JourneyId, PaymentId, SupplierId, UserId, VoucherId};
use tracing::{info, warn};

use super::balance::{BalanceSnapshot, narrative, sale_payment_status};
use super::error::SettlementError;
use super::ledger::SettlementLedger;
use super::locks::VoucherLocks;
use super::types::{
    CustomerPayment, DerivedRecord, FinancialPayment, JourneyEntry, JourneyParty, PaymentRecord,
    SettlementOutcome, SupplierPayment,
};
use crate::numbering::{CounterStore, EntityKind, IdentifierGenerator};
use crate::repository::VoucherRepository;
use crate::voucher::{AccountRef, DerivedLink, Payee, PaymentVoucher, VoucherError};
use crate::workflow::Lifecycle;

/// Synthesizes derived payments from payment vouchers.
pub struct SettlementEngine<L, C> {
    ledger: Arc<L>,
    ids: IdentifierGenerator<C>,
    locks: VoucherLocks,
}

impl<L, C> Clone for SettlementEngine<L, C> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            ids: self.ids.clone(),
            locks: self.locks.clone(),
        }
    }
}

impl<L: SettlementLedger, C: CounterStore> SettlementEngine<L, C> {
    /// Creates an engine.
    #[must_use]
    pub fn new(ledger: Arc<L>, ids: IdentifierGenerator<C>) -> Self {
        Self {
            ledger,
            ids,
            locks: VoucherLocks::new(),
        }
    }

    /// Returns the settlement ledger.
    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Settles a payment voucher at most once.
    ///
    /// The link is claimed on the voucher before anything reaches the
    /// ledger. If the payment insert then fails the claim is released, so a
    /// retry starts clean. Failures after the payment is stored leave the
    /// link in place and are not retried.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher cannot be read or linked, or if the
    /// ledger fails. The voucher itself is never rolled back.
    pub async fn settle<R>(
        &self,
        repo: &R,
        id: VoucherId,
        actor: UserId,
    ) -> Result<SettlementOutcome, SettlementError>
    where
        R: VoucherRepository<PaymentVoucher>,
    {
        let _guard = self.locks.lock(id).await;

        let voucher = repo
            .get(id)
            .await?
            .ok_or_else(|| VoucherError::not_found("voucher", id))?;

        if !voucher.header.is_active || !voucher.status.triggers_settlement() {
            return Ok(SettlementOutcome::NotApplicable);
        }
        if let Some(link) = voucher.derived {
            return Ok(SettlementOutcome::AlreadySettled(link));
        }

        let record = match &voucher.payee {
            Payee::Supplier(supplier) => self.prepare_supplier(&voucher, *supplier, actor).await?,
            Payee::Customer(customer) => self.prepare_customer(&voucher, *customer, actor).await?,
            Payee::Financial(account) => self.prepare_financial(&voucher, *account, actor).await?,
            Payee::Other(_) => return Ok(SettlementOutcome::NotApplicable),
        };

        let link = match &record {
            DerivedRecord::Supplier { payment, .. } => DerivedLink::SupplierPayment(payment.record.id),
            DerivedRecord::Customer { payment, .. } => DerivedLink::CustomerPayment(payment.record.id),
            DerivedRecord::Financial { payment } => DerivedLink::FinancialPayment(payment.record.id),
        };

        repo.update_with(id, move |stored| {
            if let Some(existing) = stored.derived {
                return Err(VoucherError::conflict(
                    "derived payment",
                    existing.payment_id().to_string(),
                ));
            }
            stored.derived = Some(link);
            Ok(())
        })
        .await?;

        if let Err(err) = self.insert_payment(&record).await {
            self.release(repo, id, link).await;
            return Err(err);
        }
        let record = self.follow_up(record).await?;

        info!(
            voucher_number = %voucher.header.voucher_number,
            payment_id = %link.payment_id(),
            payee_type = voucher.payee.payee_type().as_str(),
            "Derived payment created"
        );

        Ok(SettlementOutcome::Created(Box::new(record)))
    }

    async fn release<R>(&self, repo: &R, id: VoucherId, link: DerivedLink)
    where
        R: VoucherRepository<PaymentVoucher>,
    {
        let released = repo
            .update_with(id, move |stored| {
                if stored.derived == Some(link) {
                    stored.derived = None;
                }
                Ok(())
            })
            .await;
        if let Err(err) = released {
            warn!(voucher_id = %id, error = %err, "Settlement claim left in place");
        }
    }

    async fn insert_payment(&self, record: &DerivedRecord) -> Result<(), SettlementError> {
        match record {
            DerivedRecord::Supplier { payment, .. } => {
                self.ledger.insert_supplier_payment(payment.clone()).await
            }
            DerivedRecord::Customer { payment, .. } => {
                self.ledger.insert_customer_payment(payment.clone()).await
            }
            DerivedRecord::Financial { payment } => {
                self.ledger.insert_financial_payment(payment.clone()).await
            }
        }
    }

    /// Journey entry and sale status, once the payment is stored.
    async fn follow_up(&self, record: DerivedRecord) -> Result<DerivedRecord, SettlementError> {
        match record {
            DerivedRecord::Supplier { payment, journey } => {
                self.ledger.append_journey(journey.clone()).await?;
                Ok(DerivedRecord::Supplier { payment, journey })
            }
            DerivedRecord::Customer {
                payment, journey, ..
            } => {
                self.ledger.append_journey(journey.clone()).await?;
                let mut sale_status = None;
                if let Some(sale) = payment.related_sale
                    && let Some(summary) = self.ledger.sale_summary(sale).await?
                {
                    let status = sale_payment_status(summary);
                    self.ledger.set_sale_payment_status(sale, status).await?;
                    sale_status = Some(status);
                }
                Ok(DerivedRecord::Customer {
                    payment,
                    journey,
                    sale_status,
                })
            }
            financial @ DerivedRecord::Financial { .. } => Ok(financial),
        }
    }

    async fn prepare_supplier(
        &self,
        voucher: &PaymentVoucher,
        supplier: SupplierId,
        actor: UserId,
    ) -> Result<DerivedRecord, SettlementError> {
        let snapshot = BalanceSnapshot {
            total: self.ledger.supplier_purchase_total(supplier).await?,
            paid_so_far: self.ledger.supplier_paid_total(supplier).await?,
        };

        let payment = SupplierPayment {
            record: self.payment_record(voucher, EntityKind::SupplierPayment, actor).await?,
            supplier,
            related_purchase: voucher.related_purchase,
        };
        let journey = self
            .journey(voucher, JourneyParty::Supplier(supplier), payment.record.id, snapshot, actor)
            .await?;

        Ok(DerivedRecord::Supplier { payment, journey })
    }

    async fn prepare_customer(
        &self,
        voucher: &PaymentVoucher,
        customer: CustomerId,
        actor: UserId,
    ) -> Result<DerivedRecord, SettlementError> {
        let snapshot = BalanceSnapshot {
            total: self.ledger.customer_sales_total(customer).await?,
            paid_so_far: self.ledger.customer_paid_total(customer).await?,
        };

        let payment = CustomerPayment {
            record: self.payment_record(voucher, EntityKind::CustomerPayment, actor).await?,
            customer,
            related_sale: voucher.related_sale,
        };
        let journey = self
            .journey(voucher, JourneyParty::Customer(customer), payment.record.id, snapshot, actor)
            .await?;

        Ok(DerivedRecord::Customer {
            payment,
            journey,
            sale_status: None,
        })
    }

    async fn prepare_financial(
        &self,
        voucher: &PaymentVoucher,
        account: AccountRef,
        actor: UserId,
    ) -> Result<DerivedRecord, SettlementError> {
        let payment = FinancialPayment {
            record: self.payment_record(voucher, EntityKind::FinancialPayment, actor).await?,
            category: account.kind,
            account_id: account.id,
        };
        Ok(DerivedRecord::Financial { payment })
    }

    async fn payment_record(
        &self,
        voucher: &PaymentVoucher,
        kind: EntityKind,
        actor: UserId,
    ) -> Result<PaymentRecord, SettlementError> {
        Ok(PaymentRecord {
            id: PaymentId::new(),
            refer_code: self.ids.next_refer_code(kind).await?,
            amount: voucher.amount,
            currency: voucher.header.currency.clone(),
            payment_method: voucher.payment_method,
            payment_date: voucher.header.voucher_date,
            voucher_id: voucher.header.id,
            voucher_number: voucher.header.voucher_number.clone(),
            created_by: actor,
            created_at: Utc::now(),
            is_cancelled: false,
        })
    }

    async fn journey(
        &self,
        voucher: &PaymentVoucher,
        party: JourneyParty,
        payment_id: PaymentId,
        snapshot: BalanceSnapshot,
        actor: UserId,
    ) -> Result<JourneyEntry, SettlementError> {
        let after = snapshot.after(voucher.amount);
        Ok(JourneyEntry {
            id: JourneyId::new(),
            refer_code: self.ids.next_refer_code(EntityKind::Journey).await?,
            party,
            payment_id,
            voucher_id: voucher.header.id,
            total_amount: snapshot.total,
            paid_amount: after.paid_amount,
            remaining_balance: after.remaining_balance,
            narrative: narrative(
                voucher.amount,
                voucher.header.currency.as_str(),
                &voucher.payee_name,
                &voucher.header.voucher_number,
                after.remaining_balance,
            ),
            created_by: actor,
            created_at: Utc::now(),
        })
    }
}
