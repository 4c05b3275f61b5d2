//! Bank reconciliation vouchers.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tallybook_shared::error::FieldError;
use tallybook_shared::types::{BankAccountId, PageRequest, PageResponse, UserId, VoucherId};
use tracing::info;

use super::context::{
    AttachmentChanges, Backend, VoucherContext, VoucherOutcome, ensure_editable, fetch, list,
    reject_problems, save_update, soft_delete, transition,
};
use crate::reconciliation::{
    Adjustments, ReconciliationEngine, ReconciliationEntry, ReconciliationResult,
    ReconciliationState, summarize_entries,
};
use crate::repository::{VoucherFilter, VoucherRepository};
use crate::storage::AttachmentUpload;
use crate::voucher::{
    Attachment, HeaderInput, HeaderPatch, ReconciliationVoucher, Voucher, VoucherError,
};
use crate::workflow::{ReconcileStatus, Stamp, TransitionRequest, VoucherAction};

/// Input for a new reconciliation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconciliationInput {
    /// Shared header fields.
    #[serde(default)]
    pub header: HeaderInput,
    /// Reconciled account.
    pub bank_account: BankAccountId,
    /// Statement date.
    pub statement_date: NaiveDate,
    /// Statement opening balance.
    pub opening_balance: Decimal,
    /// Statement closing balance.
    pub closing_balance: Decimal,
    /// Balance according to the books.
    pub book_balance: Decimal,
    /// Balance to reconcile against; the closing balance when absent.
    #[serde(default)]
    pub statement_balance: Option<Decimal>,
    /// Statement lines.
    #[serde(default)]
    pub entries: Vec<ReconciliationEntry>,
    /// Outstanding items; summarized from the entries when absent.
    #[serde(default)]
    pub adjustments: Option<Adjustments>,
    /// Already stored attachments.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Files to store.
    #[serde(skip)]
    pub uploads: Vec<AttachmentUpload>,
}

/// Changes to a reconciliation.
///
/// Changing any figure clears the last computed result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconciliationPatch {
    /// Header changes.
    pub header: HeaderPatch,
    /// New statement date.
    pub statement_date: Option<NaiveDate>,
    /// New opening balance.
    pub opening_balance: Option<Decimal>,
    /// New closing balance.
    pub closing_balance: Option<Decimal>,
    /// New book balance.
    pub book_balance: Option<Decimal>,
    /// New statement balance.
    pub statement_balance: Option<Decimal>,
    /// Replacement statement lines.
    pub entries: Option<Vec<ReconciliationEntry>>,
    /// Replacement outstanding items.
    pub adjustments: Option<Adjustments>,
    /// Attachment changes.
    #[serde(skip)]
    pub attachments: AttachmentChanges,
}

impl ReconciliationPatch {
    fn changes_figures(&self) -> bool {
        self.opening_balance.is_some()
            || self.closing_balance.is_some()
            || self.book_balance.is_some()
            || self.statement_balance.is_some()
            || self.entries.is_some()
            || self.adjustments.is_some()
    }
}

/// Operations on bank reconciliation vouchers.
pub struct ReconciliationService<B: Backend> {
    ctx: VoucherContext<B>,
    repo: Arc<B::Reconciliations>,
    engine: ReconciliationEngine,
}

impl<B: Backend> Clone for ReconciliationService<B> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            repo: Arc::clone(&self.repo),
            engine: self.engine,
        }
    }
}

impl<B: Backend> ReconciliationService<B> {
    /// Creates the service; the engine uses the context's tolerance.
    #[must_use]
    pub fn new(ctx: VoucherContext<B>, repo: Arc<B::Reconciliations>) -> Self {
        let engine = ReconciliationEngine::new(ctx.tolerance);
        Self { ctx, repo, engine }
    }

    /// Creates a reconciliation in `draft`.
    ///
    /// The voucher number is scoped to the bank account and embeds its code.
    pub async fn create(
        &self,
        input: ReconciliationInput,
        actor: UserId,
    ) -> Result<VoucherOutcome<ReconciliationVoucher>, VoucherError> {
        let mut problems = Vec::new();
        let mut header = input
            .header
            .build(actor, &self.ctx.default_currency, &mut problems);
        check_entries(&input.entries, &mut problems);
        if let Some(adjustments) = &input.adjustments {
            check_adjustments(adjustments, &mut problems);
        }
        reject_problems(problems)?;

        let account = self.ctx.bank_account(input.bank_account).await?;
        if input.header.currency.is_none() {
            header.currency = account.currency.clone();
        }

        let adjustments = input
            .adjustments
            .unwrap_or_else(|| summarize_entries(&input.entries));
        let mut voucher = ReconciliationVoucher {
            header,
            status: ReconcileStatus::Draft,
            bank_account: input.bank_account,
            statement_date: input.statement_date,
            opening_balance: input.opening_balance,
            closing_balance: input.closing_balance,
            book_balance: input.book_balance,
            statement_balance: input.statement_balance.unwrap_or(input.closing_balance),
            entries: input.entries,
            adjustments,
            adjusted_balance: None,
            difference: None,
            reconciliation_status: ReconciliationState::Pending,
            reconciled: None,
        };

        self.ctx
            .assign_identity(
                self.repo.as_ref(),
                &mut voucher,
                Some((account.id, account.code.as_str())),
                input.header.transaction_id(),
            )
            .await?;

        let mut attachments = input.attachments;
        attachments.extend(self.ctx.upload_attachments(voucher.kind(), input.uploads).await);
        voucher.header.attachments = attachments;

        let voucher = self.repo.insert(voucher).await?;
        info!(
            voucher_number = %voucher.header.voucher_number,
            bank_account = %account.code,
            statement_date = %voucher.statement_date,
            "Reconciliation voucher created"
        );
        Ok(VoucherOutcome::plain(voucher))
    }

    /// Updates a reconciliation that is not yet terminal.
    pub async fn update(
        &self,
        id: VoucherId,
        patch: ReconciliationPatch,
        actor: UserId,
    ) -> Result<ReconciliationVoucher, VoucherError> {
        let mut voucher = fetch(self.repo.as_ref(), id).await?;
        ensure_editable(&voucher)?;
        let version = voucher.header.version;

        let mut problems = Vec::new();
        patch.header.apply(&mut voucher.header, &mut problems);
        if let Some(entries) = &patch.entries {
            check_entries(entries, &mut problems);
        }
        if let Some(adjustments) = &patch.adjustments {
            check_adjustments(adjustments, &mut problems);
        }
        reject_problems(problems)?;

        let figures_changed = patch.changes_figures();
        if let Some(date) = patch.statement_date {
            voucher.statement_date = date;
        }
        if let Some(opening) = patch.opening_balance {
            voucher.opening_balance = opening;
        }
        if let Some(closing) = patch.closing_balance {
            voucher.closing_balance = closing;
        }
        if let Some(book) = patch.book_balance {
            voucher.book_balance = book;
        }
        if let Some(statement) = patch.statement_balance {
            voucher.statement_balance = statement;
        }
        if let Some(entries) = patch.entries {
            if patch.adjustments.is_none() {
                voucher.adjustments = summarize_entries(&entries);
            }
            voucher.entries = entries;
        }
        if let Some(adjustments) = patch.adjustments {
            voucher.adjustments = adjustments;
        }
        if figures_changed {
            voucher.adjusted_balance = None;
            voucher.difference = None;
            voucher.reconciliation_status = ReconciliationState::Pending;
        }

        save_update(&self.ctx, self.repo.as_ref(), voucher, version, patch.attachments, actor).await
    }

    /// Loads an active reconciliation.
    pub async fn get(&self, id: VoucherId) -> Result<ReconciliationVoucher, VoucherError> {
        fetch(self.repo.as_ref(), id).await
    }

    /// Lists reconciliations, newest first.
    pub async fn list(
        &self,
        filter: &VoucherFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<ReconciliationVoucher>, VoucherError> {
        list(self.repo.as_ref(), filter, page).await
    }

    /// Soft-deletes a reconciliation.
    pub async fn delete(
        &self,
        id: VoucherId,
        actor: UserId,
    ) -> Result<ReconciliationVoucher, VoucherError> {
        soft_delete(&self.ctx, self.repo.as_ref(), id, actor).await
    }

    /// Reconciles the statement against the books.
    ///
    /// A difference below the tolerance completes the voucher; otherwise it
    /// is marked as a discrepancy and left for manual handling. The actor
    /// and time are stamped either way.
    pub async fn reconcile(
        &self,
        id: VoucherId,
        actor: UserId,
    ) -> Result<(ReconciliationVoucher, ReconciliationResult), VoucherError> {
        let stamp = Stamp::now(actor);
        let engine = self.engine;
        let mut result = None;
        let voucher = self
            .repo
            .update_with(id, |voucher: &mut ReconciliationVoucher| {
                if !voucher.header.is_active {
                    return Err(VoucherError::not_found("voucher", id));
                }
                result = Some(engine.apply(voucher, stamp)?);
                Ok(())
            })
            .await?;
        let result = result.ok_or_else(|| VoucherError::Internal("reconciliation not applied".into()))?;

        info!(
            voucher_number = %voucher.header.voucher_number,
            reconciliation_status = ?result.state,
            adjusted_balance = %result.adjusted_balance,
            difference = %result.difference,
            actor = %actor,
            "Bank statement reconciled"
        );
        Ok((voucher, result))
    }

    /// Approves a reconciliation.
    pub async fn approve(&self, id: VoucherId, actor: UserId) -> Result<ReconciliationVoucher, VoucherError> {
        transition(self.repo.as_ref(), id, TransitionRequest::new(VoucherAction::Approve, actor)).await
    }

    /// Rejects a reconciliation.
    pub async fn reject(
        &self,
        id: VoucherId,
        actor: UserId,
        reason: Option<String>,
    ) -> Result<ReconciliationVoucher, VoucherError> {
        transition(
            self.repo.as_ref(),
            id,
            TransitionRequest::new(VoucherAction::Reject, actor).with_reason(reason),
        )
        .await
    }

    /// Completes a reconciliation manually, e.g. after a reviewed discrepancy.
    pub async fn complete(&self, id: VoucherId, actor: UserId) -> Result<ReconciliationVoucher, VoucherError> {
        transition(self.repo.as_ref(), id, TransitionRequest::new(VoucherAction::Complete, actor)).await
    }

    /// Cancels a reconciliation.
    pub async fn cancel(
        &self,
        id: VoucherId,
        actor: UserId,
        reason: Option<String>,
    ) -> Result<ReconciliationVoucher, VoucherError> {
        transition(
            self.repo.as_ref(),
            id,
            TransitionRequest::new(VoucherAction::Cancel, actor).with_reason(reason),
        )
        .await
    }
}

fn check_entries(entries: &[ReconciliationEntry], problems: &mut Vec<FieldError>) {
    for (index, entry) in entries.iter().enumerate() {
        if entry.statement_amount < Decimal::ZERO {
            problems.push(FieldError::new(
                format!("entries[{index}].statement_amount"),
                "must not be negative",
            ));
        }
    }
}

fn check_adjustments(adjustments: &Adjustments, problems: &mut Vec<FieldError>) {
    let fields = [
        ("outstanding_deposits", adjustments.outstanding_deposits),
        ("outstanding_withdrawals", adjustments.outstanding_withdrawals),
        ("outstanding_checks", adjustments.outstanding_checks),
        ("bank_charges", adjustments.bank_charges),
        ("interest_earned", adjustments.interest_earned),
    ];
    for (field, value) in fields {
        if value < Decimal::ZERO {
            problems.push(FieldError::new(
                format!("adjustments.{field}"),
                "must not be negative",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_check_adjustments_allows_negative_errors() {
        let mut problems = Vec::new();
        let adjustments = Adjustments {
            bank_charges: dec!(-1),
            errors: dec!(-3),
            ..Adjustments::default()
        };
        check_adjustments(&adjustments, &mut problems);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].field, "adjustments.bank_charges");
    }

    #[test]
    fn test_patch_figure_detection() {
        assert!(!ReconciliationPatch::default().changes_figures());
        let patch = ReconciliationPatch {
            statement_balance: Some(dec!(1145)),
            ..ReconciliationPatch::default()
        };
        assert!(patch.changes_figures());
    }
}
