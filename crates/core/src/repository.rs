//! Persistence abstraction for vouchers.
//!
//! One repository per voucher variant. Implementations live outside the
//! core; the in-memory store is the reference implementation.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tallybook_shared::types::{BankAccountId, PageRequest, PageResponse, VoucherId};

use crate::voucher::{Voucher, VoucherError, VoucherKind};

/// List filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoucherFilter {
    /// Only vouchers in this status (lowercase name).
    pub status: Option<String>,
    /// Voucher date lower bound (inclusive).
    pub from: Option<DateTime<Utc>>,
    /// Voucher date upper bound (exclusive).
    pub to: Option<DateTime<Utc>>,
    /// Include soft-deleted vouchers.
    pub include_inactive: bool,
    /// Only vouchers filed under this bank account.
    pub bank_account: Option<BankAccountId>,
}

impl VoucherFilter {
    /// Returns true if `voucher` passes the filter.
    pub fn matches<V: Voucher>(&self, voucher: &V) -> bool {
        let header = voucher.header();
        if !self.include_inactive && !header.is_active {
            return false;
        }
        if let Some(status) = &self.status
            && !voucher.status().to_string().eq_ignore_ascii_case(status)
        {
            return false;
        }
        if self.from.is_some_and(|from| header.voucher_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| header.voucher_date >= to) {
            return false;
        }
        if let Some(account) = self.bank_account
            && voucher.bank_account() != Some(account)
        {
            return false;
        }
        true
    }
}

/// Storage for one voucher variant.
///
/// `voucher_number`, `transaction_id` and `refer_code` are unique within a
/// repository. Every successful write bumps `header.version`.
pub trait VoucherRepository<V: Voucher>: Send + Sync {
    /// Inserts a new voucher.
    ///
    /// Fails with `Conflict` naming the first colliding unique field.
    fn insert(&self, voucher: V) -> impl Future<Output = Result<V, VoucherError>> + Send;

    /// Loads a voucher by id, including soft-deleted ones.
    fn get(&self, id: VoucherId) -> impl Future<Output = Result<Option<V>, VoucherError>> + Send;

    /// Replaces a voucher if its stored version equals `expected_version`.
    ///
    /// Fails with `ConcurrentModification` otherwise.
    fn update(
        &self,
        voucher: V,
        expected_version: u64,
    ) -> impl Future<Output = Result<V, VoucherError>> + Send;

    /// Applies `mutate` to the stored voucher atomically.
    ///
    /// Nothing is written if `mutate` fails.
    fn update_with<F>(
        &self,
        id: VoucherId,
        mutate: F,
    ) -> impl Future<Output = Result<V, VoucherError>> + Send
    where
        F: FnOnce(&mut V) -> Result<(), VoucherError> + Send;

    /// Lists vouchers matching `filter`, newest voucher date first.
    fn list(
        &self,
        filter: &VoucherFilter,
        page: &PageRequest,
    ) -> impl Future<Output = Result<PageResponse<V>, VoucherError>> + Send;

    /// Counts vouchers of `kind` dated within `[start, end)`, optionally for
    /// one bank account.
    fn count_dated_between(
        &self,
        kind: VoucherKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        bank_account: Option<BankAccountId>,
    ) -> impl Future<Output = Result<u64, VoucherError>> + Send;
}
