//! Bank account transfer vouchers.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tallybook_shared::types::{BankAccountId, PageRequest, PageResponse, UserId, VoucherId};
use tracing::info;

use super::context::{
    AttachmentChanges, Backend, VoucherContext, VoucherOutcome, apply_initial_status,
    ensure_editable, fetch, list, reject_problems, save_update, soft_delete, transition,
};
use crate::repository::{VoucherFilter, VoucherRepository};
use crate::storage::AttachmentUpload;
use crate::voucher::{
    Attachment, BankTransferVoucher, HeaderInput, HeaderPatch, TransferMethod, Voucher,
    VoucherError,
};
use crate::workflow::{Stamp, TransferStatus, TransitionRequest, VoucherAction};

/// Input for a new transfer.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransferInput {
    /// Shared header fields.
    #[serde(default)]
    pub header: HeaderInput,
    /// Source account.
    pub from_bank_account: BankAccountId,
    /// Destination account.
    pub to_bank_account: BankAccountId,
    /// Transferred amount.
    pub amount: Decimal,
    /// Bank fee.
    #[serde(default)]
    pub transfer_fee: Decimal,
    /// Transfer method.
    #[serde(default)]
    pub transfer_method: TransferMethod,
    /// Initial status; `draft` when absent.
    #[serde(default)]
    pub status: Option<TransferStatus>,
    /// Already stored attachments.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Files to store.
    #[serde(skip)]
    pub uploads: Vec<AttachmentUpload>,
}

/// Changes to a transfer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransferPatch {
    /// Header changes.
    pub header: HeaderPatch,
    /// New source account.
    pub from_bank_account: Option<BankAccountId>,
    /// New destination account.
    pub to_bank_account: Option<BankAccountId>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New fee.
    pub transfer_fee: Option<Decimal>,
    /// New method.
    pub transfer_method: Option<TransferMethod>,
    /// Attachment changes.
    #[serde(skip)]
    pub attachments: AttachmentChanges,
}

/// Operations on bank transfer vouchers.
pub struct TransferService<B: Backend> {
    ctx: VoucherContext<B>,
    repo: Arc<B::Transfers>,
}

impl<B: Backend> Clone for TransferService<B> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<B: Backend> TransferService<B> {
    /// Creates the service.
    #[must_use]
    pub fn new(ctx: VoucherContext<B>, repo: Arc<B::Transfers>) -> Self {
        Self { ctx, repo }
    }

    /// Creates a transfer.
    ///
    /// Same-account transfers are rejected before any number is assigned.
    pub async fn create(
        &self,
        input: TransferInput,
        actor: UserId,
    ) -> Result<VoucherOutcome<BankTransferVoucher>, VoucherError> {
        let mut problems = Vec::new();
        BankTransferVoucher::validate_fields(
            input.from_bank_account,
            input.to_bank_account,
            input.amount,
            input.transfer_fee,
            &mut problems,
        );
        let mut header = input
            .header
            .build(actor, &self.ctx.default_currency, &mut problems);
        reject_problems(problems)?;

        let from = self.ctx.bank_account(input.from_bank_account).await?;
        self.ctx.bank_account(input.to_bank_account).await?;
        if input.header.currency.is_none() {
            header.currency = from.currency;
        }

        let mut voucher = BankTransferVoucher {
            header,
            status: TransferStatus::Draft,
            from_bank_account: input.from_bank_account,
            to_bank_account: input.to_bank_account,
            amount: Decimal::ZERO,
            transfer_fee: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            transfer_method: input.transfer_method,
            initiated_at: None,
            completed_at: None,
            failure_details: None,
        };
        voucher.set_amounts(input.amount, input.transfer_fee);
        if let Some(status) = input.status {
            apply_initial_status(&mut voucher, status, Stamp::now(actor))?;
        }

        self.ctx
            .assign_identity(self.repo.as_ref(), &mut voucher, None, input.header.transaction_id())
            .await?;

        let mut attachments = input.attachments;
        attachments.extend(self.ctx.upload_attachments(voucher.kind(), input.uploads).await);
        voucher.header.attachments = attachments;

        let voucher = self.repo.insert(voucher).await?;
        info!(
            voucher_number = %voucher.header.voucher_number,
            amount = %voucher.total_amount,
            status = %voucher.status,
            "Bank transfer voucher created"
        );
        Ok(VoucherOutcome::plain(voucher))
    }

    /// Updates a transfer that is not yet terminal.
    pub async fn update(
        &self,
        id: VoucherId,
        patch: TransferPatch,
        actor: UserId,
    ) -> Result<BankTransferVoucher, VoucherError> {
        let mut voucher = fetch(self.repo.as_ref(), id).await?;
        ensure_editable(&voucher)?;
        let version = voucher.header.version;

        let from = patch.from_bank_account.unwrap_or(voucher.from_bank_account);
        let to = patch.to_bank_account.unwrap_or(voucher.to_bank_account);
        let amount = patch.amount.unwrap_or(voucher.amount);
        let fee = patch.transfer_fee.unwrap_or(voucher.transfer_fee);

        let mut problems = Vec::new();
        BankTransferVoucher::validate_fields(from, to, amount, fee, &mut problems);
        patch.header.apply(&mut voucher.header, &mut problems);
        reject_problems(problems)?;

        if from != voucher.from_bank_account {
            self.ctx.bank_account(from).await?;
        }
        if to != voucher.to_bank_account {
            self.ctx.bank_account(to).await?;
        }

        voucher.from_bank_account = from;
        voucher.to_bank_account = to;
        voucher.set_amounts(amount, fee);
        if let Some(method) = patch.transfer_method {
            voucher.transfer_method = method;
        }

        save_update(&self.ctx, self.repo.as_ref(), voucher, version, patch.attachments, actor).await
    }

    /// Loads an active transfer.
    pub async fn get(&self, id: VoucherId) -> Result<BankTransferVoucher, VoucherError> {
        fetch(self.repo.as_ref(), id).await
    }

    /// Lists transfers, newest first.
    pub async fn list(
        &self,
        filter: &VoucherFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<BankTransferVoucher>, VoucherError> {
        list(self.repo.as_ref(), filter, page).await
    }

    /// Soft-deletes a transfer.
    pub async fn delete(&self, id: VoucherId, actor: UserId) -> Result<BankTransferVoucher, VoucherError> {
        soft_delete(&self.ctx, self.repo.as_ref(), id, actor).await
    }

    /// Approves a transfer; it goes (back) to `pending`.
    pub async fn approve(&self, id: VoucherId, actor: UserId) -> Result<BankTransferVoucher, VoucherError> {
        self.transition(id, TransitionRequest::new(VoucherAction::Approve, actor)).await
    }

    /// Rejects a transfer.
    pub async fn reject(
        &self,
        id: VoucherId,
        actor: UserId,
        reason: Option<String>,
    ) -> Result<BankTransferVoucher, VoucherError> {
        self.transition(
            id,
            TransitionRequest::new(VoucherAction::Reject, actor).with_reason(reason),
        )
        .await
    }

    /// Completes a transfer.
    pub async fn complete(&self, id: VoucherId, actor: UserId) -> Result<BankTransferVoucher, VoucherError> {
        self.transition(id, TransitionRequest::new(VoucherAction::Complete, actor)).await
    }

    /// Cancels a transfer.
    pub async fn cancel(
        &self,
        id: VoucherId,
        actor: UserId,
        reason: Option<String>,
    ) -> Result<BankTransferVoucher, VoucherError> {
        self.transition(
            id,
            TransitionRequest::new(VoucherAction::Cancel, actor).with_reason(reason),
        )
        .await
    }

    /// Records a failed execution and bumps the retry counter.
    pub async fn fail(
        &self,
        id: VoucherId,
        actor: UserId,
        reason: impl Into<String>,
    ) -> Result<BankTransferVoucher, VoucherError> {
        self.transition(
            id,
            TransitionRequest::new(VoucherAction::Fail, actor).with_reason(Some(reason.into())),
        )
        .await
    }

    async fn transition(
        &self,
        id: VoucherId,
        request: TransitionRequest,
    ) -> Result<BankTransferVoucher, VoucherError> {
        transition(self.repo.as_ref(), id, request).await
    }
}
