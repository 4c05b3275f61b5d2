//! Voucher collections, one per variant.
//!
//! Records are indexed by id and by the three unique identifiers
//! (`voucher_number`, `transaction_id`, `refer_code`). All writes go
//! through one lock so the unique checks and the write are atomic.

use std::collections::HashMap;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use tallybook_core::repository::{VoucherFilter, VoucherRepository};
use tallybook_core::voucher::{Voucher, VoucherError, VoucherHeader, VoucherKind};
use tallybook_shared::types::{BankAccountId, PageRequest, PageResponse, VoucherId};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;

#[derive(Debug)]
struct Table<V> {
    rows: HashMap<VoucherId, V>,
    voucher_numbers: HashMap<String, VoucherId>,
    transaction_ids: HashMap<String, VoucherId>,
    refer_codes: HashMap<String, VoucherId>,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            voucher_numbers: HashMap::new(),
            transaction_ids: HashMap::new(),
            refer_codes: HashMap::new(),
        }
    }
}

impl<V: Voucher> Table<V> {
    fn check_unique(&self, header: &VoucherHeader) -> Result<(), StoreError> {
        let indexes = [
            ("voucher_number", &self.voucher_numbers, &header.voucher_number),
            ("transaction_id", &self.transaction_ids, &header.transaction_id),
            ("refer_code", &self.refer_codes, &header.refer_code),
        ];
        for (field, index, value) in indexes {
            if index.get(value).is_some_and(|owner| *owner != header.id) {
                return Err(StoreError::Duplicate {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    fn index(&mut self, header: &VoucherHeader) {
        self.voucher_numbers.insert(header.voucher_number.clone(), header.id);
        self.transaction_ids.insert(header.transaction_id.clone(), header.id);
        self.refer_codes.insert(header.refer_code.clone(), header.id);
    }

    /// Replaces a stored row, keeping the identifiers fixed.
    fn replace(&mut self, mut voucher: V) -> Result<V, StoreError> {
        let id = voucher.id();
        let stored = self.rows.get(&id).ok_or(StoreError::NotFound(id))?;
        let (old, new) = (stored.header(), voucher.header());
        if old.voucher_number != new.voucher_number {
            return Err(StoreError::ImmutableField("voucher_number"));
        }
        if old.transaction_id != new.transaction_id {
            return Err(StoreError::ImmutableField("transaction_id"));
        }
        if old.refer_code != new.refer_code {
            return Err(StoreError::ImmutableField("refer_code"));
        }

        voucher.header_mut().version = old.version + 1;
        self.rows.insert(id, voucher.clone());
        Ok(voucher)
    }
}

/// In-memory voucher collection.
#[derive(Debug)]
pub struct InMemoryVoucherRepository<V> {
    table: RwLock<Table<V>>,
    _voucher: PhantomData<fn() -> V>,
}

impl<V> Default for InMemoryVoucherRepository<V> {
    fn default() -> Self {
        Self {
            table: RwLock::new(Table::default()),
            _voucher: PhantomData,
        }
    }
}

impl<V: Voucher> InMemoryVoucherRepository<V> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored vouchers, soft-deleted ones included.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V: Voucher> VoucherRepository<V> for InMemoryVoucherRepository<V> {
    async fn insert(&self, mut voucher: V) -> Result<V, VoucherError> {
        let mut table = self.table.write().await;
        let id = voucher.id();
        if table.rows.contains_key(&id) {
            return Err(StoreError::Duplicate {
                field: "id",
                value: id.to_string(),
            }
            .into());
        }
        table.check_unique(voucher.header())?;

        voucher.header_mut().version = 1;
        table.index(voucher.header());
        table.rows.insert(id, voucher.clone());
        debug!(voucher_id = %id, voucher_number = %voucher.header().voucher_number, "Voucher inserted");
        Ok(voucher)
    }

    async fn get(&self, id: VoucherId) -> Result<Option<V>, VoucherError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn update(&self, voucher: V, expected_version: u64) -> Result<V, VoucherError> {
        let mut table = self.table.write().await;
        let id = voucher.id();
        let actual = table
            .rows
            .get(&id)
            .map(|stored| stored.header().version)
            .ok_or(StoreError::NotFound(id))?;
        if actual != expected_version {
            return Err(StoreError::VersionMismatch {
                id,
                expected: expected_version,
                actual,
            }
            .into());
        }
        Ok(table.replace(voucher)?)
    }

    async fn update_with<F>(&self, id: VoucherId, mutate: F) -> Result<V, VoucherError>
    where
        F: FnOnce(&mut V) -> Result<(), VoucherError> + Send,
    {
        let mut table = self.table.write().await;
        let mut voucher = table.rows.get(&id).cloned().ok_or(StoreError::NotFound(id))?;
        mutate(&mut voucher)?;
        Ok(table.replace(voucher)?)
    }

    async fn list(
        &self,
        filter: &VoucherFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<V>, VoucherError> {
        let table = self.table.read().await;
        let mut items: Vec<V> = table
            .rows
            .values()
            .filter(|voucher| filter.matches(*voucher))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.header()
                .voucher_date
                .cmp(&a.header().voucher_date)
                .then_with(|| b.header().serial.cmp(&a.header().serial))
        });
        Ok(PageResponse::paginate(items, page))
    }

    async fn count_dated_between(
        &self,
        kind: VoucherKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        bank_account: Option<BankAccountId>,
    ) -> Result<u64, VoucherError> {
        let table = self.table.read().await;
        let count = table
            .rows
            .values()
            .filter(|voucher| {
                let date = voucher.header().voucher_date;
                voucher.kind() == kind
                    && date >= start
                    && date < end
                    && bank_account.is_none_or(|account| voucher.bank_account() == Some(account))
            })
            .count();
        Ok(count as u64)
    }
}
