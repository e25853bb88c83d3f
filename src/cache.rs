//! Bulk-entity cache.
//!
//! Memoizes the full result of expensive "list all" calls so dependent read
//! operations (membership expansion, per-mailbox auto-reply lookup) do not
//! re-trigger a full directory listing. Filled and cleared explicitly; no
//! TTL. The fill step holds the collection's mutex across check-and-fetch so
//! two concurrent callers cannot both run the listing.

use std::future::Future;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ConnectorResult;
use crate::record::Record;
use crate::types::CachedEntityType;

/// The memoized result of one bulk listing.
#[derive(Debug, Clone, Default)]
pub struct CachedCollection<T> {
    items: Vec<T>,
    filled: bool,
}

impl<T> CachedCollection<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            filled: false,
        }
    }
}

/// Process-wide cache of bulk-fetchable entity collections.
pub struct EntityCache {
    mailboxes: Mutex<CachedCollection<Record>>,
    groups: Mutex<CachedCollection<Record>>,
}

impl EntityCache {
    /// Create an empty, unfilled cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mailboxes: Mutex::new(CachedCollection::empty()),
            groups: Mutex::new(CachedCollection::empty()),
        }
    }

    fn slot(&self, ty: CachedEntityType) -> &Mutex<CachedCollection<Record>> {
        match ty {
            CachedEntityType::Mailboxes => &self.mailboxes,
            CachedEntityType::DistributionGroups => &self.groups,
        }
    }

    /// Whether the collection has been filled by a successful fetch.
    pub async fn is_filled(&self, ty: CachedEntityType) -> bool {
        self.slot(ty).lock().await.filled
    }

    /// Fill the collection via `fetcher` unless it is already filled.
    ///
    /// A failed fetch leaves the collection unfilled so the next caller
    /// retries instead of reading a partial result. A successful fetch of
    /// zero entities is a valid fill.
    pub async fn fill<F, Fut>(&self, ty: CachedEntityType, fetcher: F) -> ConnectorResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ConnectorResult<Vec<Record>>>,
    {
        let mut slot = self.slot(ty).lock().await;
        if slot.filled {
            debug!(collection = %ty, "cache already filled");
            return Ok(());
        }
        let items = fetcher().await?;
        debug!(collection = %ty, count = items.len(), "cache filled");
        slot.items = items;
        slot.filled = true;
        Ok(())
    }

    /// Copy of the collection's items. Empty when unfilled.
    pub async fn snapshot(&self, ty: CachedEntityType) -> Vec<Record> {
        self.slot(ty).lock().await.items.clone()
    }

    /// Drop the collection's contents and mark it unfilled.
    pub async fn clear(&self, ty: CachedEntityType) {
        let mut slot = self.slot(ty).lock().await;
        slot.items.clear();
        slot.filled = false;
        debug!(collection = %ty, "cache cleared");
    }

    /// Clear every collection. Used at connector unload.
    pub async fn clear_all(&self) {
        self.clear(CachedEntityType::Mailboxes).await;
        self.clear(CachedEntityType::DistributionGroups).await;
    }
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new()
    }
}
