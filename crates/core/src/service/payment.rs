//! Cash and bank payment vouchers.
//!
//! Reaching `approved` or `completed` hands the voucher to the settlement
//! engine, which synthesizes at most one derived payment. Synthesis
//! failures are reported in the outcome and never undo the voucher write.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tallybook_shared::error::FieldError;
use tallybook_shared::types::{BankAccountId, PageRequest, PageResponse, PurchaseId, SaleId, UserId, VoucherId};
use tracing::{info, warn};

use super::context::{
    AttachmentChanges, Backend, VoucherContext, VoucherOutcome, apply_initial_status,
    ensure_editable, fetch, list, reject_problems, save_update, soft_delete, transition,
};
use crate::directory::DocumentRef;
use crate::repository::{VoucherFilter, VoucherRepository};
use crate::settlement::{SettlementEngine, SettlementOutcome};
use crate::storage::AttachmentUpload;
use crate::voucher::{
    Attachment, HeaderInput, HeaderPatch, Payee, PaymentChannel, PaymentMethod, PaymentVoucher,
    Voucher, VoucherError,
};
use crate::workflow::{Lifecycle, PaymentStatus, Stamp, TransitionRequest, VoucherAction};

const FROZEN: &str = "cannot change once a derived payment exists";

/// Input for a new payment.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentInput {
    /// Shared header fields.
    #[serde(default)]
    pub header: HeaderInput,
    /// Cash or bank.
    pub channel: PaymentChannel,
    /// Paying account, required for bank payments.
    #[serde(default)]
    pub bank_account: Option<BankAccountId>,
    /// Who is paid.
    pub payee: Payee,
    /// Paid amount.
    pub amount: Decimal,
    /// Payment instrument.
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Purchase being settled.
    #[serde(default)]
    pub related_purchase: Option<PurchaseId>,
    /// Sale being paid.
    #[serde(default)]
    pub related_sale: Option<SaleId>,
    /// Initial status; the channel default when absent.
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    /// Already stored attachments.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Files to store.
    #[serde(skip)]
    pub uploads: Vec<AttachmentUpload>,
}

/// Changes to a payment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaymentPatch {
    /// Header changes.
    pub header: HeaderPatch,
    /// New paying account (bank payments).
    pub bank_account: Option<BankAccountId>,
    /// New payee.
    pub payee: Option<Payee>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New instrument.
    pub payment_method: Option<PaymentMethod>,
    /// New related purchase.
    pub related_purchase: Option<PurchaseId>,
    /// New related sale.
    pub related_sale: Option<SaleId>,
    /// Attachment changes.
    #[serde(skip)]
    pub attachments: AttachmentChanges,
}

/// Operations on cash and bank payment vouchers.
pub struct PaymentService<B: Backend> {
    ctx: VoucherContext<B>,
    repo: Arc<B::Payments>,
    settlement: SettlementEngine<B::Ledger, B::Counters>,
}

impl<B: Backend> Clone for PaymentService<B> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            repo: Arc::clone(&self.repo),
            settlement: self.settlement.clone(),
        }
    }
}

impl<B: Backend> PaymentService<B> {
    /// Creates the service.
    #[must_use]
    pub fn new(
        ctx: VoucherContext<B>,
        repo: Arc<B::Payments>,
        settlement: SettlementEngine<B::Ledger, B::Counters>,
    ) -> Self {
        Self {
            ctx,
            repo,
            settlement,
        }
    }

    /// Returns the settlement engine.
    #[must_use]
    pub fn settlement(&self) -> &SettlementEngine<B::Ledger, B::Counters> {
        &self.settlement
    }

    /// Creates a payment.
    ///
    /// Cash payments without an explicit status are completed on creation
    /// and settled right away.
    pub async fn create(
        &self,
        input: PaymentInput,
        actor: UserId,
    ) -> Result<VoucherOutcome<PaymentVoucher>, VoucherError> {
        let mut problems = Vec::new();
        PaymentVoucher::validate_fields(
            input.channel,
            input.bank_account,
            &input.payee,
            input.amount,
            &mut problems,
        );
        let mut header = input
            .header
            .build(actor, &self.ctx.default_currency, &mut problems);
        reject_problems(problems)?;

        let bank_account = match input.channel {
            PaymentChannel::Bank => input.bank_account,
            PaymentChannel::Cash => None,
        };
        if let Some(account) = bank_account {
            let info = self.ctx.bank_account(account).await?;
            if input.header.currency.is_none() {
                header.currency = info.currency;
            }
        }
        let payee_name = self.payee_name(&input.payee).await?;
        self.related_documents(input.related_purchase, input.related_sale)
            .await?;

        let mut voucher = PaymentVoucher {
            header,
            status: PaymentStatus::Draft,
            channel: input.channel,
            bank_account,
            payee: input.payee,
            payee_name,
            amount: input.amount,
            payment_method: input.payment_method,
            related_purchase: input.related_purchase,
            related_sale: input.related_sale,
            derived: None,
        };
        let initial = input.status.unwrap_or(input.channel.default_status());
        apply_initial_status(&mut voucher, initial, Stamp::now(actor))?;

        self.ctx
            .assign_identity(self.repo.as_ref(), &mut voucher, None, input.header.transaction_id())
            .await?;

        let mut attachments = input.attachments;
        attachments.extend(self.ctx.upload_attachments(voucher.kind(), input.uploads).await);
        voucher.header.attachments = attachments;

        let voucher = self.repo.insert(voucher).await?;
        info!(
            voucher_number = %voucher.header.voucher_number,
            voucher_kind = %voucher.kind(),
            payee_type = voucher.payee.payee_type().as_str(),
            amount = %voucher.amount,
            status = %voucher.status,
            "Payment voucher created"
        );

        Ok(self.settle(voucher, actor).await)
    }

    /// Updates a payment that is not yet terminal.
    ///
    /// Once a derived payment exists the payee and amount are frozen.
    pub async fn update(
        &self,
        id: VoucherId,
        patch: PaymentPatch,
        actor: UserId,
    ) -> Result<PaymentVoucher, VoucherError> {
        let mut voucher = fetch(self.repo.as_ref(), id).await?;
        ensure_editable(&voucher)?;
        let version = voucher.header.version;

        let payee = patch.payee.clone().unwrap_or_else(|| voucher.payee.clone());
        let amount = patch.amount.unwrap_or(voucher.amount);
        let bank_account = match voucher.channel {
            PaymentChannel::Bank => patch.bank_account.or(voucher.bank_account),
            PaymentChannel::Cash => None,
        };

        let mut problems = Vec::new();
        PaymentVoucher::validate_fields(voucher.channel, bank_account, &payee, amount, &mut problems);
        if voucher.derived.is_some() {
            if payee != voucher.payee {
                problems.push(FieldError::new("payee", FROZEN));
            }
            if amount != voucher.amount {
                problems.push(FieldError::new("amount", FROZEN));
            }
        }
        patch.header.apply(&mut voucher.header, &mut problems);
        reject_problems(problems)?;

        if bank_account != voucher.bank_account
            && let Some(account) = bank_account
        {
            self.ctx.bank_account(account).await?;
        }
        if payee != voucher.payee {
            voucher.payee_name = self.payee_name(&payee).await?;
        }
        self.related_documents(patch.related_purchase, patch.related_sale)
            .await?;

        voucher.bank_account = bank_account;
        voucher.payee = payee;
        voucher.amount = amount;
        if let Some(method) = patch.payment_method {
            voucher.payment_method = method;
        }
        if patch.related_purchase.is_some() {
            voucher.related_purchase = patch.related_purchase;
        }
        if patch.related_sale.is_some() {
            voucher.related_sale = patch.related_sale;
        }

        save_update(&self.ctx, self.repo.as_ref(), voucher, version, patch.attachments, actor).await
    }

    /// Loads an active payment.
    pub async fn get(&self, id: VoucherId) -> Result<PaymentVoucher, VoucherError> {
        fetch(self.repo.as_ref(), id).await
    }

    /// Lists payments, newest first.
    pub async fn list(
        &self,
        filter: &VoucherFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<PaymentVoucher>, VoucherError> {
        list(self.repo.as_ref(), filter, page).await
    }

    /// Soft-deletes a payment.
    pub async fn delete(&self, id: VoucherId, actor: UserId) -> Result<PaymentVoucher, VoucherError> {
        soft_delete(&self.ctx, self.repo.as_ref(), id, actor).await
    }

    /// Approves a payment and synthesizes its derived record.
    pub async fn approve(
        &self,
        id: VoucherId,
        actor: UserId,
    ) -> Result<VoucherOutcome<PaymentVoucher>, VoucherError> {
        let voucher =
            transition(self.repo.as_ref(), id, TransitionRequest::new(VoucherAction::Approve, actor))
                .await?;
        Ok(self.settle(voucher, actor).await)
    }

    /// Rejects a payment.
    pub async fn reject(
        &self,
        id: VoucherId,
        actor: UserId,
        reason: Option<String>,
    ) -> Result<PaymentVoucher, VoucherError> {
        transition(
            self.repo.as_ref(),
            id,
            TransitionRequest::new(VoucherAction::Reject, actor).with_reason(reason),
        )
        .await
    }

    /// Completes a payment and synthesizes its derived record.
    ///
    /// Calling this again on a completed voucher fails with a state error
    /// and never creates a second derived record.
    pub async fn complete(
        &self,
        id: VoucherId,
        actor: UserId,
    ) -> Result<VoucherOutcome<PaymentVoucher>, VoucherError> {
        let voucher =
            transition(self.repo.as_ref(), id, TransitionRequest::new(VoucherAction::Complete, actor))
                .await?;
        Ok(self.settle(voucher, actor).await)
    }

    /// Cancels a payment.
    ///
    /// Derived records already created are left in place.
    pub async fn cancel(
        &self,
        id: VoucherId,
        actor: UserId,
        reason: Option<String>,
    ) -> Result<PaymentVoucher, VoucherError> {
        let voucher: PaymentVoucher = transition(
            self.repo.as_ref(),
            id,
            TransitionRequest::new(VoucherAction::Cancel, actor).with_reason(reason),
        )
        .await?;
        if let Some(link) = voucher.derived {
            warn!(
                voucher_number = %voucher.header.voucher_number,
                payment_id = %link.payment_id(),
                "Cancelled payment voucher keeps its derived payment"
            );
        }
        Ok(voucher)
    }

    /// Runs derived-transaction synthesis for a voucher that may need it.
    ///
    /// Safe to call repeatedly: at most one record is ever created.
    pub async fn settle(&self, voucher: PaymentVoucher, actor: UserId) -> VoucherOutcome<PaymentVoucher> {
        if !voucher.status.triggers_settlement() || voucher.derived.is_some() {
            return VoucherOutcome::plain(voucher);
        }

        let id = voucher.header.id;
        match self.settlement.settle(self.repo.as_ref(), id, actor).await {
            Ok(SettlementOutcome::Created(record)) => {
                let voucher = match self.repo.get(id).await {
                    Ok(Some(linked)) => linked,
                    _ => voucher,
                };
                VoucherOutcome {
                    voucher,
                    derived: Some(*record),
                    transaction_error: None,
                }
            }
            Ok(SettlementOutcome::AlreadySettled(_) | SettlementOutcome::NotApplicable) => {
                VoucherOutcome::plain(voucher)
            }
            Err(e) => {
                warn!(
                    voucher_number = %voucher.header.voucher_number,
                    error = %e,
                    "Derived payment synthesis failed"
                );
                VoucherOutcome {
                    voucher,
                    derived: None,
                    transaction_error: Some(e),
                }
            }
        }
    }

    async fn payee_name(&self, payee: &Payee) -> Result<String, VoucherError> {
        match payee {
            Payee::Other(name) => Ok(name.trim().to_string()),
            other => match other.account_ref() {
                Some(account) => Ok(self.ctx.account(account).await?.name),
                None => Ok(String::new()),
            },
        }
    }

    async fn related_documents(
        &self,
        purchase: Option<PurchaseId>,
        sale: Option<SaleId>,
    ) -> Result<(), VoucherError> {
        if let Some(purchase) = purchase {
            self.ctx.document(DocumentRef::Purchase(purchase)).await?;
        }
        if let Some(sale) = sale {
            self.ctx.document(DocumentRef::Sale(sale)).await?;
        }
        Ok(())
    }
}
