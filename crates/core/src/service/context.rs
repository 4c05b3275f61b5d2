//! Shared plumbing for the voucher services.
//!
//! `VoucherContext` bundles the collaborators every variant needs and the
//! steps every variant runs the same way: entity resolution, identity
//! assignment, attachment handling, workflow transitions and soft delete.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use tallybook_shared::config::AppConfig;
use tallybook_shared::error::FieldError;
use tallybook_shared::types::{BankAccountId, CurrencyCode, PageRequest, PageResponse, UserId, VoucherId};
use tracing::{info, warn};

use crate::directory::{AccountDirectory, AccountInfo, BankAccountInfo, DocumentRef, DocumentRegistry};
use crate::numbering::{CounterStore, IdentifierGenerator};
use crate::repository::{VoucherFilter, VoucherRepository};
use crate::settlement::{DerivedRecord, SettlementError, SettlementLedger};
use crate::storage::{AttachmentStore, AttachmentUpload};
use crate::voucher::{
    AccountRef, Attachment, BankTransferVoucher, JournalVoucher, PaymentVoucher,
    ReconciliationVoucher, Voucher, VoucherError, VoucherIdentity, VoucherKind,
};
use crate::workflow::{Stamp, TransitionRequest, VoucherAction, WorkflowService};

/// The storage and collaborator implementations a deployment plugs in.
pub trait Backend: Send + Sync + 'static {
    /// Atomic counters.
    type Counters: CounterStore + 'static;
    /// Account directory and related-document registry.
    type Directory: AccountDirectory + DocumentRegistry + 'static;
    /// Attachment store.
    type Attachments: AttachmentStore + 'static;
    /// Where derived payments and journey entries are written.
    type Ledger: SettlementLedger + 'static;
    /// Bank transfer vouchers.
    type Transfers: VoucherRepository<BankTransferVoucher> + 'static;
    /// Cash and bank payment vouchers.
    type Payments: VoucherRepository<PaymentVoucher> + 'static;
    /// Journal and opening balance vouchers.
    type Journals: VoucherRepository<JournalVoucher> + 'static;
    /// Bank reconciliation vouchers.
    type Reconciliations: VoucherRepository<ReconciliationVoucher> + 'static;

    /// Returns the counter store.
    fn counters(&self) -> Arc<Self::Counters>;
    /// Returns the directory.
    fn directory(&self) -> Arc<Self::Directory>;
    /// Returns the attachment store.
    fn attachments(&self) -> Arc<Self::Attachments>;
    /// Returns the settlement ledger.
    fn ledger(&self) -> Arc<Self::Ledger>;
    /// Returns the bank transfer repository.
    fn transfers(&self) -> Arc<Self::Transfers>;
    /// Returns the payment repository.
    fn payments(&self) -> Arc<Self::Payments>;
    /// Returns the journal repository.
    fn journals(&self) -> Arc<Self::Journals>;
    /// Returns the reconciliation repository.
    fn reconciliations(&self) -> Arc<Self::Reconciliations>;
}

/// Result of a voucher write.
///
/// `transaction_error` reports a failed derived-transaction synthesis. The
/// voucher itself was written regardless.
#[derive(Debug, Clone)]
pub struct VoucherOutcome<V> {
    /// The stored voucher.
    pub voucher: V,
    /// Record synthesized by this call, if any.
    pub derived: Option<DerivedRecord>,
    /// Non-fatal synthesis failure.
    pub transaction_error: Option<SettlementError>,
}

impl<V> VoucherOutcome<V> {
    /// Outcome of a write without side effects.
    #[must_use]
    pub fn plain(voucher: V) -> Self {
        Self {
            voucher,
            derived: None,
            transaction_error: None,
        }
    }
}

/// Collaborators shared by the voucher services.
pub struct VoucherContext<B: Backend> {
    pub(crate) ids: IdentifierGenerator<B::Counters>,
    pub(crate) directory: Arc<B::Directory>,
    pub(crate) attachments: Arc<B::Attachments>,
    pub(crate) tolerance: Decimal,
    pub(crate) default_currency: CurrencyCode,
}

impl<B: Backend> Clone for VoucherContext<B> {
    fn clone(&self) -> Self {
        Self {
            ids: self.ids.clone(),
            directory: Arc::clone(&self.directory),
            attachments: Arc::clone(&self.attachments),
            tolerance: self.tolerance,
            default_currency: self.default_currency.clone(),
        }
    }
}

impl<B: Backend> VoucherContext<B> {
    /// Builds the context from a backend and the application configuration.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the default currency is not an ISO code.
    pub fn new(backend: &B, config: &AppConfig) -> Result<Self, VoucherError> {
        let default_currency = CurrencyCode::parse(&config.ledger.default_currency)
            .map_err(|e| VoucherError::Configuration(format!("ledger.default_currency: {e}")))?;
        Ok(Self {
            ids: IdentifierGenerator::from_config(backend.counters(), &config.numbering),
            directory: backend.directory(),
            attachments: backend.attachments(),
            tolerance: config.ledger.balance_tolerance,
            default_currency,
        })
    }

    /// Returns the identifier generator.
    #[must_use]
    pub fn ids(&self) -> &IdentifierGenerator<B::Counters> {
        &self.ids
    }

    /// Resolves an active bank account.
    pub(crate) async fn bank_account(
        &self,
        id: BankAccountId,
    ) -> Result<BankAccountInfo, VoucherError> {
        let account = self
            .directory
            .bank_account(id)
            .await?
            .ok_or_else(|| VoucherError::not_found("bank account", id))?;
        if !account.is_active {
            return Err(VoucherError::invalid(
                "bank_account",
                format!("bank account {} is inactive", account.code),
            ));
        }
        Ok(account)
    }

    /// Resolves a polymorphic account reference.
    pub(crate) async fn account(&self, account: AccountRef) -> Result<AccountInfo, VoucherError> {
        self.directory
            .resolve(account)
            .await?
            .ok_or_else(|| VoucherError::not_found("account", account))
    }

    /// Checks that a related document exists.
    pub(crate) async fn document(&self, document: DocumentRef) -> Result<(), VoucherError> {
        if self.directory.exists(document).await? {
            Ok(())
        } else {
            Err(VoucherError::not_found(document.entity(), document))
        }
    }

    /// Assigns serial, voucher number, refer code and transaction id.
    ///
    /// The daily sequence never goes below the number of vouchers of the
    /// same kind already dated that day; `scope` narrows it to one bank
    /// account.
    pub(crate) async fn assign_identity<V, R>(
        &self,
        repo: &R,
        voucher: &mut V,
        scope: Option<(BankAccountId, &str)>,
        transaction_id: Option<String>,
    ) -> Result<(), VoucherError>
    where
        V: Voucher,
        R: VoucherRepository<V>,
    {
        let kind = voucher.kind();
        let entity = kind.entity();
        let date = voucher.header().voucher_date.date_naive();
        let (start, end) = day_bounds(voucher.header().voucher_date);
        let existing = repo
            .count_dated_between(kind, start, end, scope.map(|(account, _)| account))
            .await?;

        let serial = self.ids.next_serial(entity).await?;
        let voucher_number = self
            .ids
            .next_voucher_number(entity, date, scope.map(|(_, code)| code), existing)
            .await?;
        let refer_code = self.ids.next_refer_code(entity).await?;
        let transaction_id = match transaction_id {
            Some(id) => id,
            None => self.ids.transaction_id(entity, date, serial)?,
        };

        voucher.header_mut().assign(VoucherIdentity {
            serial,
            voucher_number,
            refer_code,
            transaction_id,
        });
        Ok(())
    }

    /// Stores uploads, skipping the ones that fail.
    pub(crate) async fn upload_attachments(
        &self,
        kind: VoucherKind,
        uploads: Vec<AttachmentUpload>,
    ) -> Vec<Attachment> {
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let name = upload.name.clone();
            match self.attachments.store(kind, upload).await {
                Ok(attachment) => stored.push(attachment),
                Err(e) => {
                    warn!(voucher_kind = %kind, file = %name, error = %e, "Attachment upload failed");
                }
            }
        }
        stored
    }

    /// Deletes stored attachments, logging failures.
    pub(crate) async fn remove_attachments(&self, urls: &[String]) {
        for url in urls {
            if let Err(e) = self.attachments.remove(url).await {
                warn!(url = %url, error = %e, "Attachment delete failed");
            }
        }
    }
}

/// Returns `[startOfDay, endOfDay)` of the UTC calendar day of `at`.
#[must_use]
pub fn day_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = at.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + TimeDelta::days(1))
}

/// Fails with a `Validation` error if any problem was collected.
pub(crate) fn reject_problems(problems: Vec<FieldError>) -> Result<(), VoucherError> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(VoucherError::Validation(problems))
    }
}

/// Loads an active voucher.
pub(crate) async fn fetch<V, R>(repo: &R, id: VoucherId) -> Result<V, VoucherError>
where
    V: Voucher,
    R: VoucherRepository<V>,
{
    repo.get(id)
        .await?
        .filter(|voucher| voucher.header().is_active)
        .ok_or_else(|| VoucherError::not_found("voucher", id))
}

/// Lists vouchers.
pub(crate) async fn list<V, R>(
    repo: &R,
    filter: &VoucherFilter,
    page: &PageRequest,
) -> Result<PageResponse<V>, VoucherError>
where
    V: Voucher,
    R: VoucherRepository<V>,
{
    repo.list(filter, page).await
}

/// Applies a workflow transition atomically.
///
/// The table check runs against the stored status; nothing is written if
/// the transition is illegal.
pub(crate) async fn transition<V, R>(
    repo: &R,
    id: VoucherId,
    request: TransitionRequest,
) -> Result<V, VoucherError>
where
    V: Voucher,
    R: VoucherRepository<V>,
{
    let action = request.action;
    let actor = request.actor;
    let voucher = repo
        .update_with(id, move |voucher: &mut V| {
            if !voucher.header().is_active {
                return Err(VoucherError::not_found("voucher", id));
            }
            let event = WorkflowService::transition(voucher.status(), request)?;
            voucher.apply(&event);
            Ok(())
        })
        .await?;

    info!(
        voucher_number = %voucher.header().voucher_number,
        voucher_kind = %voucher.kind(),
        action = %action,
        status = %voucher.status(),
        actor = %actor,
        "Voucher transitioned"
    );
    Ok(voucher)
}

/// Soft-deletes a voucher and removes its stored attachments.
pub(crate) async fn soft_delete<B, V, R>(
    ctx: &VoucherContext<B>,
    repo: &R,
    id: VoucherId,
    actor: UserId,
) -> Result<V, VoucherError>
where
    B: Backend,
    V: Voucher,
    R: VoucherRepository<V>,
{
    let stamp = Stamp::now(actor);
    let voucher = repo
        .update_with(id, move |voucher: &mut V| {
            if !voucher.header().is_active {
                return Err(VoucherError::not_found("voucher", id));
            }
            WorkflowService::ensure_mutable(voucher.status(), VoucherAction::Delete)?;
            let header = voucher.header_mut();
            header.is_active = false;
            header.touch(stamp.at);
            Ok(())
        })
        .await?;

    let urls: Vec<String> = voucher
        .header()
        .attachments
        .iter()
        .map(|attachment| attachment.url.clone())
        .collect();
    ctx.remove_attachments(&urls).await;

    info!(
        voucher_number = %voucher.header().voucher_number,
        voucher_kind = %voucher.kind(),
        actor = %actor,
        "Voucher deleted"
    );
    Ok(voucher)
}

/// Checks that a loaded voucher may still be edited.
pub(crate) fn ensure_editable<V: Voucher>(voucher: &V) -> Result<(), VoucherError> {
    WorkflowService::ensure_mutable(voucher.status(), VoucherAction::Update)?;
    Ok(())
}

/// Applies the status a voucher is created in.
///
/// `draft` is the starting point. Any other initial status must be reachable
/// from it by `complete` or `approve`, and is reached through the table so
/// the audit trail is recorded.
pub(crate) fn apply_initial_status<V: Voucher>(
    voucher: &mut V,
    initial: V::Status,
    stamp: Stamp,
) -> Result<(), VoucherError> {
    let start = voucher.status();
    if initial == start {
        return Ok(());
    }
    let event = [
        WorkflowService::complete(start, stamp),
        WorkflowService::approve(start, stamp),
    ]
    .into_iter()
    .flatten()
    .find(|event| event.new_status() == initial)
    .ok_or_else(|| {
        VoucherError::invalid("status", format!("cannot create a voucher in status '{initial}'"))
    })?;
    voucher.apply(&event);
    Ok(())
}

/// Attachment changes requested by an update.
#[derive(Debug, Clone, Default)]
pub struct AttachmentChanges {
    /// New files to store and append.
    pub add: Vec<AttachmentUpload>,
    /// Urls of stored attachments to drop.
    pub remove: Vec<String>,
}

impl AttachmentChanges {
    /// Returns true if nothing changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Applies attachment changes to `voucher` and writes it with a version check.
///
/// Removed files are deleted only after the write succeeded.
pub(crate) async fn save_update<B, V, R>(
    ctx: &VoucherContext<B>,
    repo: &R,
    mut voucher: V,
    expected_version: u64,
    attachments: AttachmentChanges,
    actor: UserId,
) -> Result<V, VoucherError>
where
    B: Backend,
    V: Voucher,
    R: VoucherRepository<V>,
{
    let kind = voucher.kind();
    let removed: Vec<String> = voucher
        .header()
        .attachments
        .iter()
        .filter(|a| attachments.remove.contains(&a.url))
        .map(|a| a.url.clone())
        .collect();

    let added = ctx.upload_attachments(kind, attachments.add).await;
    let header = voucher.header_mut();
    header.attachments.retain(|a| !removed.contains(&a.url));
    header.attachments.extend(added);
    header.touch(Utc::now());

    let stored = repo.update(voucher, expected_version).await?;
    ctx.remove_attachments(&removed).await;

    info!(
        voucher_number = %stored.header().voucher_number,
        voucher_kind = %kind,
        actor = %actor,
        "Voucher updated"
    );
    Ok(stored)
}
