//! Per-voucher mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use tallybook_shared::types::VoucherId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Keyed async mutex, one lock per voucher.
///
/// Entries are created on first use and kept; the map grows with the
/// number of distinct vouchers settled by this process.
#[derive(Debug, Clone, Default)]
pub struct VoucherLocks {
    locks: Arc<DashMap<VoucherId, Arc<Mutex<()>>>>,
}

impl VoucherLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and returns the lock of `id`.
    pub async fn lock(&self, id: VoucherId) -> OwnedMutexGuard<()> {
        let mutex = Arc::clone(self.locks.entry(id).or_default().value());
        mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_voucher_is_serialized() {
        let locks = VoucherLocks::new();
        let id = VoucherId::new();
        let guard = locks.lock(id).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move { locks.lock(id).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        assert!(contender.await.is_ok());
    }

    #[tokio::test]
    async fn test_different_vouchers_do_not_block() {
        let locks = VoucherLocks::new();
        let _a = locks.lock(VoucherId::new()).await;
        let _b = locks.lock(VoucherId::new()).await;
    }
}
