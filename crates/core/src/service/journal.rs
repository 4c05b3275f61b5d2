//! Journal and opening balance vouchers.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tallybook_shared::error::FieldError;
use tallybook_shared::types::{PageRequest, PageResponse, UserId, VoucherId};
use tracing::info;

use super::context::{
    AttachmentChanges, Backend, VoucherContext, VoucherOutcome, ensure_editable, fetch, list,
    reject_problems, save_update, soft_delete, transition,
};
use crate::ledger::{EntryInput, ValidatedEntries, check_balance, validate_entries};
use crate::repository::{VoucherFilter, VoucherRepository};
use crate::storage::AttachmentUpload;
use crate::voucher::{
    Attachment, HeaderInput, HeaderPatch, JournalKind, JournalVoucher, Voucher, VoucherError,
    parse_json_field,
};
use crate::workflow::{JournalStatus, TransitionRequest, VoucherAction};

/// Input for a new journal-style voucher.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JournalInput {
    /// Shared header fields.
    #[serde(default)]
    pub header: HeaderInput,
    /// Ordered entries.
    #[serde(default)]
    pub entries: Vec<EntryInput>,
    /// Already stored attachments.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Files to store.
    #[serde(skip)]
    pub uploads: Vec<AttachmentUpload>,
}

impl JournalInput {
    /// Builds an input from JSON-encoded `entries` and `attachments` fields.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error naming the field that failed to parse.
    pub fn from_encoded(
        header: HeaderInput,
        entries: &str,
        attachments: Option<&str>,
    ) -> Result<Self, VoucherError> {
        Ok(Self {
            header,
            entries: parse_json_field("entries", entries)?,
            attachments: match attachments {
                Some(raw) => parse_json_field("attachments", raw)?,
                None => Vec::new(),
            },
            uploads: Vec::new(),
        })
    }
}

/// Changes to a journal-style voucher.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JournalPatch {
    /// Header changes.
    pub header: HeaderPatch,
    /// Replacement entries, validated like new ones.
    pub entries: Option<Vec<EntryInput>>,
    /// Attachment changes.
    #[serde(skip)]
    pub attachments: AttachmentChanges,
}

/// Operations on journal and opening balance vouchers.
pub struct JournalService<B: Backend> {
    ctx: VoucherContext<B>,
    repo: Arc<B::Journals>,
}

impl<B: Backend> Clone for JournalService<B> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<B: Backend> JournalService<B> {
    /// Creates the service.
    #[must_use]
    pub fn new(ctx: VoucherContext<B>, repo: Arc<B::Journals>) -> Self {
        Self { ctx, repo }
    }

    /// Creates a journal or opening balance voucher in `draft`.
    pub async fn create(
        &self,
        journal_kind: JournalKind,
        input: JournalInput,
        actor: UserId,
    ) -> Result<VoucherOutcome<JournalVoucher>, VoucherError> {
        let mut problems = Vec::new();
        let header = input
            .header
            .build(actor, &self.ctx.default_currency, &mut problems);
        let validated = self.validate(&input.entries, journal_kind, problems).await?;

        let mut voucher = JournalVoucher {
            header,
            status: JournalStatus::Draft,
            journal_kind,
            entries: Vec::new(),
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
        };
        voucher.replace_entries(validated);

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
            entries = voucher.entries.len(),
            total_debit = %voucher.total_debit,
            total_credit = %voucher.total_credit,
            "Journal voucher created"
        );
        Ok(VoucherOutcome::plain(voucher))
    }

    /// Updates a voucher that is not yet posted or cancelled.
    pub async fn update(
        &self,
        id: VoucherId,
        patch: JournalPatch,
        actor: UserId,
    ) -> Result<JournalVoucher, VoucherError> {
        let mut voucher = fetch(self.repo.as_ref(), id).await?;
        ensure_editable(&voucher)?;
        let version = voucher.header.version;

        let mut problems = Vec::new();
        patch.header.apply(&mut voucher.header, &mut problems);
        match &patch.entries {
            Some(entries) => {
                let validated = self.validate(entries, voucher.journal_kind, problems).await?;
                voucher.replace_entries(validated);
            }
            None => reject_problems(problems)?,
        }

        save_update(&self.ctx, self.repo.as_ref(), voucher, version, patch.attachments, actor).await
    }

    /// Loads an active voucher.
    pub async fn get(&self, id: VoucherId) -> Result<JournalVoucher, VoucherError> {
        fetch(self.repo.as_ref(), id).await
    }

    /// Lists vouchers, newest first.
    pub async fn list(
        &self,
        filter: &VoucherFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<JournalVoucher>, VoucherError> {
        list(self.repo.as_ref(), filter, page).await
    }

    /// Soft-deletes a voucher.
    pub async fn delete(&self, id: VoucherId, actor: UserId) -> Result<JournalVoucher, VoucherError> {
        soft_delete(&self.ctx, self.repo.as_ref(), id, actor).await
    }

    /// Approves a voucher.
    pub async fn approve(&self, id: VoucherId, actor: UserId) -> Result<JournalVoucher, VoucherError> {
        transition(self.repo.as_ref(), id, TransitionRequest::new(VoucherAction::Approve, actor)).await
    }

    /// Rejects a voucher.
    pub async fn reject(
        &self,
        id: VoucherId,
        actor: UserId,
        reason: Option<String>,
    ) -> Result<JournalVoucher, VoucherError> {
        transition(
            self.repo.as_ref(),
            id,
            TransitionRequest::new(VoucherAction::Reject, actor).with_reason(reason),
        )
        .await
    }

    /// Posts a voucher (terminal).
    ///
    /// The stored entries are re-checked first, so a voucher written by an
    /// older rule set cannot be posted unbalanced.
    pub async fn post(&self, id: VoucherId, actor: UserId) -> Result<JournalVoucher, VoucherError> {
        let voucher = fetch(self.repo.as_ref(), id).await?;
        if voucher.journal_kind.rules().require_balance {
            check_balance(voucher.total_debit, voucher.total_credit, self.ctx.tolerance)?;
        }
        transition(self.repo.as_ref(), id, TransitionRequest::new(VoucherAction::Complete, actor)).await
    }

    /// Cancels a voucher.
    pub async fn cancel(
        &self,
        id: VoucherId,
        actor: UserId,
        reason: Option<String>,
    ) -> Result<JournalVoucher, VoucherError> {
        transition(
            self.repo.as_ref(),
            id,
            TransitionRequest::new(VoucherAction::Cancel, actor).with_reason(reason),
        )
        .await
    }

    /// Validates entries and resolves every referenced account.
    ///
    /// Header problems collected by the caller are reported together with
    /// entry problems.
    async fn validate(
        &self,
        entries: &[EntryInput],
        journal_kind: JournalKind,
        mut problems: Vec<FieldError>,
    ) -> Result<ValidatedEntries, VoucherError> {
        let mut validated = match validate_entries(entries, journal_kind.rules(), self.ctx.tolerance) {
            Ok(validated) => {
                reject_problems(problems)?;
                validated
            }
            Err(e) => {
                problems.extend(e.field_errors());
                return Err(VoucherError::Validation(problems));
            }
        };

        for entry in &mut validated.entries {
            let account = self.ctx.account(entry.account).await?;
            if entry.account_name.is_empty() {
                entry.account_name = account.name;
            }
        }
        Ok(validated)
    }
}
